//! DockerHub tag grammar.
//!
//! Tags such as `3.11-slim` carry no relational structure worth parsing — a
//! specifier matches iff it is exactly equal to the concrete tag string.

use super::{Grammar, Specifier};

pub(super) struct DockerHubGrammar;

impl Grammar for DockerHubGrammar {
    fn parse_specifier(&self, specifier: &str) -> Option<Box<dyn Specifier>> {
        if specifier.is_empty() {
            return None;
        }
        Some(Box::new(ExactTag(specifier.to_string())))
    }

    fn parse_version(&self, version: &str) -> Option<String> {
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }
}

struct ExactTag(String);

impl Specifier for ExactTag {
    fn contains(&self, version: &str) -> bool {
        self.0 == version
    }
}
