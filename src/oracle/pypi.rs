//! PyPI (PEP 440-subset) version grammar.
//!
//! Supports numeric dotted release segments only — no pre-release, post-release,
//! or local version segments. Specifiers are a comma-separated AND-conjunction of
//! clauses, each an operator (`==`, `>=`, `<=`, `>`, `<`, `~=`) followed by a
//! dotted numeric version.

use super::{Grammar, Specifier};
use std::cmp::Ordering;

pub(super) struct PyPiGrammar;

impl Grammar for PyPiGrammar {
    fn parse_specifier(&self, specifier: &str) -> Option<Box<dyn Specifier>> {
        let mut clauses = Vec::new();
        for raw_clause in specifier.split(',') {
            let raw_clause = raw_clause.trim();
            if raw_clause.is_empty() {
                continue;
            }
            let (op, rest) = split_operator(raw_clause)?;
            let version = parse_release(rest.trim())?;
            clauses.push((op, version));
        }
        if clauses.is_empty() {
            return None;
        }
        Some(Box::new(PyPiSpecifier { clauses }))
    }

    fn parse_version(&self, version: &str) -> Option<String> {
        parse_release(version).map(|_| version.to_string())
    }
}

struct PyPiSpecifier {
    clauses: Vec<(Operator, Vec<u64>)>,
}

impl Specifier for PyPiSpecifier {
    fn contains(&self, version: &str) -> bool {
        let Some(parsed) = parse_release(version) else {
            return false;
        };
        self.clauses.iter().all(|(op, bound)| match op {
            Operator::Compatible => {
                // Equal up to but excluding the last release segment, and >= overall.
                let prefix_len = bound.len().saturating_sub(1);
                parsed.get(..prefix_len) == bound.get(..prefix_len)
                    && compare_release(&parsed, bound) != Ordering::Less
            }
            _ => op.admits(compare_release(&parsed, bound)),
        })
    }
}

#[derive(Clone, Copy)]
enum Operator {
    Eq,
    Ge,
    Le,
    Gt,
    Lt,
    /// `~=` — compatible release: equal up to but excluding the last release
    /// segment, and greater-or-equal overall.
    Compatible,
}

impl Operator {
    fn admits(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => ord == Ordering::Equal,
            Self::Ge => ord != Ordering::Less,
            Self::Le => ord != Ordering::Greater,
            Self::Gt => ord == Ordering::Greater,
            Self::Lt => ord == Ordering::Less,
            Self::Compatible => unreachable!("compatible release handled in `contains`"),
        }
    }
}

fn split_operator(clause: &str) -> Option<(Operator, &str)> {
    for (prefix, op) in [
        ("~=", Operator::Compatible),
        (">=", Operator::Ge),
        ("<=", Operator::Le),
        ("==", Operator::Eq),
        (">", Operator::Gt),
        ("<", Operator::Lt),
    ] {
        if let Some(rest) = clause.strip_prefix(prefix) {
            return Some((op, rest));
        }
    }
    None
}

fn parse_release(version: &str) -> Option<Vec<u64>> {
    let segments: Vec<u64> = version
        .split('.')
        .map(str::parse::<u64>)
        .collect::<Result<_, _>>()
        .ok()?;
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for idx in 0..len {
        let a_seg = a.get(idx).copied().unwrap_or(0);
        let b_seg = b.get(idx).copied().unwrap_or(0);
        match a_seg.cmp(&b_seg) {
            Ordering::Equal => {}
            ord => return ord,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(specifier: &str, version: &str) -> bool {
        let grammar = PyPiGrammar;
        let Some(spec) = grammar.parse_specifier(specifier) else {
            return false;
        };
        let Some(parsed) = grammar.parse_version(version) else {
            return false;
        };
        spec.contains(&parsed)
    }

    #[test]
    fn ge_clause() {
        assert!(matches(">=1.23.0", "1.23.5"));
        assert!(!matches(">=1.23.0", "1.22.5"));
    }

    #[test]
    fn and_conjunction() {
        assert!(matches(">=1.23.0,<2.0.0", "1.99.0"));
        assert!(!matches(">=1.23.0,<2.0.0", "2.0.0"));
    }

    #[test]
    fn compatible_release() {
        assert!(matches("~=1.4.2", "1.4.5"));
        assert!(!matches("~=1.4.2", "1.3.9"));
        // `~=1.4.2` pins the `1.4` prefix; a `1.5.0` release is not compatible.
        assert!(!matches("~=1.4.2", "1.5.0"));
    }

    #[test]
    fn malformed_specifier_parses_to_none() {
        let grammar = PyPiGrammar;
        assert!(grammar.parse_specifier(">=not-a-version").is_none());
        assert!(grammar.parse_specifier("").is_none());
    }
}
