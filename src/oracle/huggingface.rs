//! Hugging Face revision grammar.
//!
//! A HuggingFace specifier is a git ref or `main`; it matches iff it is exactly
//! equal to the concrete revision string — the same opaque-equality shape as
//! DockerHub tags, but kept as a distinct ecosystem module since HF revisions and
//! Docker tags are unrelated namespaces that happen to share a comparison rule.

use super::{Grammar, Specifier};

pub(super) struct HuggingFaceGrammar;

impl Grammar for HuggingFaceGrammar {
    fn parse_specifier(&self, specifier: &str) -> Option<Box<dyn Specifier>> {
        if specifier.is_empty() {
            return None;
        }
        Some(Box::new(ExactRevision(specifier.to_string())))
    }

    fn parse_version(&self, version: &str) -> Option<String> {
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }
}

struct ExactRevision(String);

impl Specifier for ExactRevision {
    fn contains(&self, version: &str) -> bool {
        self.0 == version
    }
}
