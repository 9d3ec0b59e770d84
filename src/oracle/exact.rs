//! Exact-equality grammar shared by the `Prefab`, `Closure`, and `k8s` ecosystems.
//!
//! None of these three carry range-constrained versions in the source system: a
//! prefab or closure identity is matched by name already, and a `k8s` image tag is
//! compared as-is. One grammar module covers all three registry entries.

use super::{Grammar, Specifier};

pub(super) struct ExactGrammar;

impl Grammar for ExactGrammar {
    fn parse_specifier(&self, specifier: &str) -> Option<Box<dyn Specifier>> {
        if specifier.is_empty() {
            return None;
        }
        Some(Box::new(ExactValue(specifier.to_string())))
    }

    fn parse_version(&self, version: &str) -> Option<String> {
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }
}

struct ExactValue(String);

impl Specifier for ExactValue {
    fn contains(&self, version: &str) -> bool {
        self.0 == version
    }
}
