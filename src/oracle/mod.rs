//! Version-match oracle (component A).
//!
//! `version_match` decides whether a concrete version satisfies a specifier under
//! an ecosystem-specific grammar. Each ecosystem is a self-registering module
//! exposing a [`Grammar`]; the oracle itself only does the table lookup and never
//! branches on ecosystem tags directly, so adding a new ecosystem never touches
//! this file.

mod apt;
mod dockerhub;
mod exact;
mod huggingface;
mod pypi;

use std::collections::HashMap;
use std::sync::OnceLock;

/// Ecosystem tag selecting which specifier grammar applies.
///
/// Unknown tags parse to `None` via [`Ecosystem::parse`] rather than a dedicated
/// variant, so `version_match` can report "unknown ecosystem" uniformly without a
/// catch-all match arm scattered through every grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    /// Python Package Index, PEP 440-subset specifiers.
    PyPi,
    /// Docker Hub image tags, compared as opaque strings.
    DockerHub,
    /// Debian/APT package versions and relational constraints.
    Apt,
    /// Hugging Face model/dataset revisions, compared as opaque strings.
    HuggingFace,
    /// A repository-native prefab identity, compared as opaque strings.
    Prefab,
    /// A workload's root dependency, compared as opaque strings.
    Closure,
    /// A Kubernetes-native image tag, compared as opaque strings.
    K8s,
}

impl Ecosystem {
    /// Parse the wire-level `spectype` string into an [`Ecosystem`].
    ///
    /// Case-sensitive, matching the dependency descriptor's field-name contract
    /// on the wire. Returns `None` for any tag outside the closed set.
    #[must_use]
    pub fn parse(spectype: &str) -> Option<Self> {
        match spectype {
            "PyPI" => Some(Self::PyPi),
            "DockerHub" => Some(Self::DockerHub),
            "Apt" => Some(Self::Apt),
            "HuggingFace" => Some(Self::HuggingFace),
            "Prefab" => Some(Self::Prefab),
            "Closure" => Some(Self::Closure),
            "k8s" => Some(Self::K8s),
            _ => None,
        }
    }
}

/// A parsed specifier able to test whether a parsed concrete version satisfies it.
///
/// `name` is logging-only context: the admission decision depends only on
/// (ecosystem, specifier, concrete version), never on the artifact's name.
trait Grammar: Send + Sync {
    /// Parse a specifier string, or `None` if it is malformed under this grammar.
    fn parse_specifier(&self, specifier: &str) -> Option<Box<dyn Specifier>>;
    /// Parse a concrete version string, or `None` if it is malformed under this
    /// grammar.
    fn parse_version(&self, version: &str) -> Option<String>;
}

/// A parsed specifier; `contains` is the admission predicate.
trait Specifier {
    /// Does this specifier admit the given parsed concrete version?
    fn contains(&self, version: &str) -> bool;
}

fn registry() -> &'static HashMap<Ecosystem, Box<dyn Grammar>> {
    static REGISTRY: OnceLock<HashMap<Ecosystem, Box<dyn Grammar>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<Ecosystem, Box<dyn Grammar>> = HashMap::new();
        map.insert(Ecosystem::PyPi, Box::new(pypi::PyPiGrammar));
        map.insert(Ecosystem::DockerHub, Box::new(dockerhub::DockerHubGrammar));
        map.insert(Ecosystem::Apt, Box::new(apt::AptGrammar));
        map.insert(
            Ecosystem::HuggingFace,
            Box::new(huggingface::HuggingFaceGrammar),
        );
        map.insert(Ecosystem::Prefab, Box::new(exact::ExactGrammar));
        map.insert(Ecosystem::Closure, Box::new(exact::ExactGrammar));
        map.insert(Ecosystem::K8s, Box::new(exact::ExactGrammar));
        map
    })
}

/// Decide whether `concrete_version` satisfies `specifier` under `ecosystem`'s
/// grammar.
///
/// `name` is accepted for logging parity with the original `VersionMatch(specType,
/// name, specifier, version)` contract but does not affect the result. Any parse
/// failure, or an ecosystem tag that isn't in the closed set, returns `false` —
/// this function never panics and never returns an error, so callers can treat a
/// malformed catalog entry as "no match" rather than aborting scoring.
#[must_use]
pub fn version_match(spectype: &str, name: &str, specifier: &str, concrete_version: &str) -> bool {
    let Some(ecosystem) = Ecosystem::parse(spectype) else {
        tracing::debug!(spectype, name, "unknown ecosystem tag");
        return false;
    };
    let Some(grammar) = registry().get(&ecosystem) else {
        return false;
    };
    let Some(parsed_specifier) = grammar.parse_specifier(specifier) else {
        tracing::debug!(spectype, name, specifier, "failed to parse specifier");
        return false;
    };
    let Some(parsed_version) = grammar.parse_version(concrete_version) else {
        tracing::debug!(
            spectype,
            name,
            version = concrete_version,
            "failed to parse version"
        );
        return false;
    };
    parsed_specifier.contains(&parsed_version)
}
