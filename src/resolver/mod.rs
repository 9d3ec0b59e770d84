//! Dependency resolver (component B).
//!
//! Expands a container reference into the list of artifacts a workload needs,
//! either as a bundle dependency list (flattened closure blueprint) or a layer
//! dependency list (one closure-tagged placeholder the daemon expands against its
//! own manifest store). Both modes share [`DependencyDescriptor`] as their output
//! shape, mirroring `GetContainerBundles`/`GetContainerLayers` in
//! `layerlocality/upstream.go` and `bundlelocality/upstream.go`.

mod blueprint;

pub use blueprint::{BlueprintSource, ClosureBlueprint, DependencyGroup, Prefab};

use serde::{Deserialize, Serialize};

/// A single artifact requirement: ecosystem tag, name, version specifier, and an
/// advisory size in MiB.
///
/// In layer mode the `name` field carries a content digest and `specifier` a tag,
/// by convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DependencyDescriptor {
    /// Ecosystem tag selecting the version grammar (`spectype` on the wire).
    pub spectype: String,
    /// Artifact name, or a layer digest in layer mode.
    pub name: String,
    /// Version specifier, or a tag in layer mode.
    pub specifier: String,
    /// Advisory size; the field name says MiB but the daemon treats every
    /// byte total on the wire as bytes, never converting.
    pub size: f64,
}

/// Placeholder size (in the advisory `size` field) used when a concrete byte
/// count isn't known at resolve time. Never zero, so presence alone still
/// contributes positively once the daemon later resolves a real size.
const PLACEHOLDER_SIZE_MIB: f64 = 1.0;

/// Normalize a container reference to `name:tag` form.
///
/// Appends `:latest` whenever the reference's last `:` does not appear after its
/// last `/` — i.e., whenever any trailing `:` belongs to a registry port rather
/// than a tag. Ported from `normalizedImageName` in `layerlocality.go` /
/// `normalizedBundleName` in `bundlelocality.go`, which both implement the same
/// rule.
#[must_use]
pub fn normalize_reference(reference: &str) -> String {
    let last_colon = reference.rfind(':');
    let last_slash = reference.rfind('/');
    let has_tag = match (last_colon, last_slash) {
        (Some(colon), Some(slash)) => colon > slash,
        (Some(_), None) => true,
        _ => false,
    };
    if has_tag {
        reference.to_string()
    } else {
        format!("{reference}:latest")
    }
}

/// Split a normalized `name:tag` reference into its name and tag halves.
///
/// Mirrors `splitNormalizedBundleNameAndTag` / `splitNormalizedLayerNameAndTag`:
/// if there is no `:` at all, the whole string is the name and the tag defaults
/// to `latest`.
fn split_name_tag(normalized: &str) -> (String, String) {
    match normalized.rfind(':') {
        Some(idx) => (normalized[..idx].to_string(), normalized[idx + 1..].to_string()),
        None => (normalized.to_string(), "latest".to_string()),
    }
}

/// Resolve a container reference into its bundle dependency list (bundle mode).
///
/// Normalizes the reference, requests the closure blueprint for `(name, tag)`
/// from `source`, and flattens its dependency groups into a single list. The
/// first element of the returned list is, by convention, the closure descriptor
/// itself — callers that forward to the live-mode daemon endpoint strip it.
/// If the upstream call fails, returns an empty list: this is a recoverable
/// failure, never an error.
pub async fn get_container_bundles(
    reference: &str,
    source: &dyn BlueprintSource,
) -> Vec<DependencyDescriptor> {
    let normalized = normalize_reference(reference);
    let (name, tag) = split_name_tag(&normalized);

    let blueprint = match source.request_closure_blueprint(&name, &tag).await {
        Ok(bp) => bp,
        Err(err) => {
            tracing::warn!(name, tag, error = %err, "blueprint request failed");
            return Vec::new();
        }
    };

    let mut descriptors = Vec::with_capacity(blueprint.depend.len() + 1);
    descriptors.push(DependencyDescriptor {
        spectype: "Closure".to_string(),
        name: name.clone(),
        specifier: tag.clone(),
        size: PLACEHOLDER_SIZE_MIB,
    });
    for group in &blueprint.depend {
        for prefab in &group.prefabs {
            descriptors.push(DependencyDescriptor {
                spectype: prefab.spectype.clone(),
                name: prefab.name.clone(),
                specifier: prefab.specifier.clone(),
                size: PLACEHOLDER_SIZE_MIB,
            });
        }
    }
    descriptors
}

/// Resolve a container reference into its layer dependency list (layer mode).
///
/// Returns a one-element list carrying the image name (without tag) as `name`
/// and the tag as `specifier`, ecosystem tag `Closure`. The daemon interprets
/// this as "look up this image name in my manifest store and sum its layer bytes
/// against the node's pulled images".
#[must_use]
pub fn get_container_layers(reference: &str) -> Vec<DependencyDescriptor> {
    let normalized = normalize_reference(reference);
    let (name, tag) = split_name_tag(&normalized);
    vec![DependencyDescriptor {
        spectype: "Closure".to_string(),
        name,
        specifier: tag,
        size: 0.0,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint::Prefab;
    use std::sync::Arc;

    #[test]
    fn normalize_adds_latest_when_no_tag() {
        assert_eq!(normalize_reference("redis"), "redis:latest");
    }

    #[test]
    fn normalize_keeps_explicit_tag() {
        assert_eq!(normalize_reference("redis:7.2"), "redis:7.2");
    }

    #[test]
    fn normalize_treats_registry_port_as_no_tag() {
        assert_eq!(
            normalize_reference("myregistry.example.com:5000/redis"),
            "myregistry.example.com:5000/redis:latest"
        );
    }

    #[test]
    fn normalize_respects_tag_after_port() {
        assert_eq!(
            normalize_reference("myregistry.example.com:5000/redis:7.2"),
            "myregistry.example.com:5000/redis:7.2"
        );
    }

    #[test]
    fn layer_mode_returns_single_closure_entry() {
        let deps = get_container_layers("11.0.1.37:9988/goharbor/testimg1");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].spectype, "Closure");
        assert_eq!(deps[0].name, "11.0.1.37:9988/goharbor/testimg1");
        assert_eq!(deps[0].specifier, "latest");
    }

    struct FixtureSource {
        groups: Vec<DependencyGroup>,
    }

    #[async_trait::async_trait]
    impl BlueprintSource for FixtureSource {
        async fn request_closure_blueprint(
            &self,
            _name: &str,
            _tag: &str,
        ) -> Result<ClosureBlueprint, String> {
            Ok(ClosureBlueprint {
                depend: self.groups.clone(),
            })
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl BlueprintSource for FailingSource {
        async fn request_closure_blueprint(
            &self,
            _name: &str,
            _tag: &str,
        ) -> Result<ClosureBlueprint, String> {
            Err("upstream unreachable".to_string())
        }
    }

    #[tokio::test]
    async fn bundle_mode_prepends_closure_then_flattens_groups() {
        let source = FixtureSource {
            groups: vec![DependencyGroup {
                prefabs: vec![Prefab {
                    spectype: "PyPI".to_string(),
                    name: "numpy".to_string(),
                    specifier: ">=1.23.0".to_string(),
                }],
            }],
        };
        let deps = get_container_bundles("myimage:v1", &source).await;
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].spectype, "Closure");
        assert_eq!(deps[0].name, "myimage");
        assert_eq!(deps[0].specifier, "v1");
        assert_eq!(deps[1].name, "numpy");
    }

    #[tokio::test]
    async fn bundle_mode_returns_empty_on_upstream_failure() {
        let deps = get_container_bundles("myimage:v1", &FailingSource).await;
        assert!(deps.is_empty());
    }

    #[tokio::test]
    async fn bundle_mode_works_through_arc_dyn_source() {
        let source: Arc<dyn BlueprintSource> = Arc::new(FixtureSource { groups: vec![] });
        let deps = get_container_bundles("bare-name", source.as_ref()).await;
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].specifier, "latest");
    }
}
