//! Closure blueprint types and the upstream collaborator that fetches them.
//!
//! A blueprint is the registry's declaration of what a closure (a tagged
//! container reference) pulls in: one or more dependency groups, each a list of
//! prefab requirements. Fetching one is an out-of-process call (typically HTTP
//! against a blueprint registry), so it's abstracted behind [`BlueprintSource`]
//! the same way `sources/news/fetch.rs` abstracts its feed fetch behind a plain
//! async function — here a trait, since bundle-mode tests need a fixture that
//! never touches the network.

use serde::Deserialize;

/// One prefab requirement inside a dependency group.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Prefab {
    /// Ecosystem tag selecting the version grammar.
    pub spectype: String,
    /// Prefab name.
    pub name: String,
    /// Version specifier.
    pub specifier: String,
}

/// A group of prefab requirements, as returned by the blueprint registry.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct DependencyGroup {
    /// The prefabs in this group.
    #[serde(default)]
    pub prefabs: Vec<Prefab>,
}

/// The full blueprint for a closure: all of its dependency groups.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct ClosureBlueprint {
    /// Dependency groups, in registry order.
    #[serde(default)]
    pub depend: Vec<DependencyGroup>,
}

/// Fetches closure blueprints from wherever they actually live.
///
/// Implemented by an HTTP-backed collaborator in production and by an in-memory
/// fixture in tests (see `resolver::tests`).
#[async_trait::async_trait]
pub trait BlueprintSource: Send + Sync {
    /// Request the blueprint for `name:tag`. Returns `Err` with a human-readable
    /// reason on any failure (network, parse, not-found); callers treat every
    /// error the same way — skip this closure's dependencies.
    async fn request_closure_blueprint(
        &self,
        name: &str,
        tag: &str,
    ) -> Result<ClosureBlueprint, String>;
}

/// An [`BlueprintSource`] backed by an HTTP registry, reusing the shared client
/// the rest of the crate uses for outbound requests.
pub struct HttpBlueprintSource {
    base_url: String,
}

impl HttpBlueprintSource {
    /// Build a source that queries `base_url` for blueprints, e.g.
    /// `https://registry.example.com/blueprints`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl BlueprintSource for HttpBlueprintSource {
    async fn request_closure_blueprint(
        &self,
        name: &str,
        tag: &str,
    ) -> Result<ClosureBlueprint, String> {
        let url = format!("{}/{name}/{tag}", self.base_url);
        let response = crate::net::HTTP_CLIENT
            .get(&url)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        if !response.status().is_success() {
            return Err(format!("blueprint registry returned {}", response.status()));
        }
        response
            .json::<ClosureBlueprint>()
            .await
            .map_err(|err| err.to_string())
    }
}
