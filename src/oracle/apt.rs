//! Debian/APT version grammar.
//!
//! A subset of `dpkg --compare-versions`: `[epoch:]upstream[-revision]`, compared
//! by splitting each component into alternating non-digit/digit runs and comparing
//! run-by-run (digit runs numerically, non-digit runs lexicographically, with `~`
//! sorting before everything else including the empty string). Specifiers are a
//! single relational clause: `>>`, `<<`, `>=`, `<=`, or `=`.

use super::{Grammar, Specifier};
use std::cmp::Ordering;

pub(super) struct AptGrammar;

impl Grammar for AptGrammar {
    fn parse_specifier(&self, specifier: &str) -> Option<Box<dyn Specifier>> {
        let specifier = specifier.trim();
        let (op, rest) = split_operator(specifier)?;
        let version = rest.trim();
        if version.is_empty() {
            return None;
        }
        Some(Box::new(AptSpecifier {
            op,
            version: version.to_string(),
        }))
    }

    fn parse_version(&self, version: &str) -> Option<String> {
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }
}

struct AptSpecifier {
    op: Operator,
    version: String,
}

impl Specifier for AptSpecifier {
    fn contains(&self, version: &str) -> bool {
        let ord = compare_debian(version, &self.version);
        self.op.admits(ord)
    }
}

#[derive(Clone, Copy)]
enum Operator {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl Operator {
    fn admits(self, ord: Ordering) -> bool {
        match self {
            Self::Gt => ord == Ordering::Greater,
            Self::Lt => ord == Ordering::Less,
            Self::Ge => ord != Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Eq => ord == Ordering::Equal,
        }
    }
}

fn split_operator(clause: &str) -> Option<(Operator, &str)> {
    for (prefix, op) in [
        (">>", Operator::Gt),
        ("<<", Operator::Lt),
        (">=", Operator::Ge),
        ("<=", Operator::Le),
        ("=", Operator::Eq),
    ] {
        if let Some(rest) = clause.strip_prefix(prefix) {
            return Some((op, rest));
        }
    }
    None
}

/// Compare two Debian-style version strings: `[epoch:]upstream[-revision]`.
fn compare_debian(a: &str, b: &str) -> Ordering {
    let (a_epoch, a_rest) = split_epoch(a);
    let (b_epoch, b_rest) = split_epoch(b);
    match a_epoch.cmp(&b_epoch) {
        Ordering::Equal => {}
        ord => return ord,
    }

    let (a_upstream, a_rev) = split_revision(a_rest);
    let (b_upstream, b_rev) = split_revision(b_rest);
    match compare_component(a_upstream, b_upstream) {
        Ordering::Equal => {}
        ord => return ord,
    }
    compare_component(a_rev, b_rev)
}

fn split_epoch(version: &str) -> (u64, &str) {
    match version.split_once(':') {
        Some((epoch, rest)) => (epoch.parse().unwrap_or(0), rest),
        None => (0, version),
    }
}

fn split_revision(version: &str) -> (&str, &str) {
    match version.rsplit_once('-') {
        Some((upstream, revision)) => (upstream, revision),
        None => (version, ""),
    }
}

/// Compare one upstream or revision component by alternating digit/non-digit runs.
fn compare_component(a: &str, b: &str) -> Ordering {
    let a_runs = split_runs(a);
    let b_runs = split_runs(b);
    let len = a_runs.len().max(b_runs.len());
    for idx in 0..len {
        let a_run = a_runs.get(idx).copied().unwrap_or("");
        let b_run = b_runs.get(idx).copied().unwrap_or("");
        let ord = if idx % 2 == 0 {
            compare_non_digit_run(a_run, b_run)
        } else {
            compare_digit_run(a_run, b_run)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Split into runs that strictly alternate non-digit, digit, non-digit, ...
/// starting with a non-digit run — dpkg's `verrevcmp` always begins this
/// way, so a string starting with a digit (e.g. `"10"`) gets a leading empty
/// non-digit run, keeping every even index a lexical run and every odd index
/// a numeric one regardless of what the string actually starts with.
fn split_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut chars = s.char_indices().peekable();
    let mut start = 0;
    let mut in_digits = false;
    if s.starts_with(|ch: char| ch.is_ascii_digit()) {
        runs.push("");
        in_digits = true;
    }
    while let Some((idx, ch)) = chars.next() {
        let is_digit = ch.is_ascii_digit();
        if is_digit != in_digits {
            runs.push(&s[start..idx]);
            start = idx;
            in_digits = is_digit;
        }
    }
    if !s.is_empty() {
        runs.push(&s[start..]);
    }
    runs
}

fn compare_digit_run(a: &str, b: &str) -> Ordering {
    let a_num: u64 = a.parse().unwrap_or(0);
    let b_num: u64 = b.parse().unwrap_or(0);
    a_num.cmp(&b_num)
}

/// Compare non-digit runs with Debian's `~` ordering: `~` sorts before the empty
/// string, which in turn sorts before everything else.
fn compare_non_digit_run(a: &str, b: &str) -> Ordering {
    let mut a_chars = a.chars();
    let mut b_chars = b.chars();
    loop {
        let a_ch = a_chars.next();
        let b_ch = b_chars.next();
        match (a_ch, b_ch) {
            (None, None) => return Ordering::Equal,
            (Some('~'), Some('~')) => {}
            (Some('~'), _) => return Ordering::Less,
            (_, Some('~')) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a_ch), Some(b_ch)) => match a_ch.cmp(&b_ch) {
                Ordering::Equal => {}
                ord => return ord,
            },
        }
    }
}
