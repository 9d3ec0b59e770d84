//! Layer-mode scoring: sum the bytes of layers the node already holds for a
//! target image, deduplicated by bare digest.
//!
//! Ported from `layerHandlerInner` in the original daemon.

use super::manifest::{strip_digest_prefix, ManifestStore};
use super::runtime_images::get_pulled_image_names;
use crate::resolver::DependencyDescriptor;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Strip any registry/path prefix before the last `/`, leaving the bare image
/// name used to key the manifest store.
fn bare_image_name(full_name: &str) -> &str {
    full_name.rsplit_once('/').map_or(full_name, |(_, rest)| rest)
}

/// Compute matching layer bytes for the target image named by `remote[0]`.
///
/// Returns 0 if `remote` is empty, if the image has no manifest-store entry,
/// or if the node has pulled no images covering any of the target's layers. A
/// layer contributes at most once even if multiple pulled images reference
/// it.
#[must_use]
pub fn layer_handler_inner(
    remote: &[DependencyDescriptor],
    manifest_store: &ManifestStore,
    runtime_cli: &str,
    crictl_fallback: &Path,
) -> f64 {
    let Some(first) = remote.first() else {
        return 0.0;
    };

    let name = bare_image_name(&first.name);
    let Some(manifest) = manifest_store.get(name) else {
        tracing::info!(image = name, "no manifest entry, returning 0");
        return 0.0;
    };

    let mut layer_sizes: HashMap<String, u64> = HashMap::new();
    for layer in &manifest.layers_data {
        layer_sizes.insert(strip_digest_prefix(&layer.digest).to_string(), layer.size);
    }

    let mut counted: HashSet<String> = HashSet::new();
    let pulled = get_pulled_image_names(runtime_cli, crictl_fallback);

    let mut total: u64 = 0;
    for pulled_name in pulled.keys() {
        let Some(pulled_manifest) = manifest_store.get(pulled_name) else {
            continue;
        };
        for layer_ref in &pulled_manifest.layers {
            let digest = strip_digest_prefix(layer_ref).to_string();
            if counted.contains(&digest) {
                continue;
            }
            if let Some(size) = layer_sizes.get(&digest) {
                counted.insert(digest);
                total += size;
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    total
}
