//! Bundle-mode scoring: fixed-manifest lookup and live-inventory matching.
//!
//! Ported from `CompareAndCalculateJSON`, `CompareAndCalculate`, and
//! `ListLocalBundles` in the original daemon.

use super::catalog::AppEntries;
use crate::oracle::version_match;
use crate::resolver::DependencyDescriptor;
use std::collections::HashMap;

/// A node-local bundle record, as enumerated from the bundle manager.
#[derive(Debug, Clone)]
pub struct LocalBundleInfo {
    /// Opaque bundle ID, used to key the upstream size probe.
    pub id: String,
    /// Canonical bundle name.
    pub name: String,
    /// Concrete installed version.
    pub version: String,
    /// Size in bytes, resolved via the upstream probe (or its fallback).
    pub size: u64,
}

/// Enumerates installed bundles on this node.
///
/// The real bundle manager lives outside this crate as an external
/// collaborator; this trait is the seam a production deployment wires a real
/// implementation into. `list_names` returns entries in the bundle manager's
/// native `"name (version)"` display form.
pub trait BundleManager: Send + Sync {
    /// List all installed bundles as `"name (version)"` strings.
    fn list_names(&self) -> Vec<String>;
    /// Resolve a bundle's opaque ID given its name and version, if installed.
    fn bundle_id(&self, name: &str, version: &str) -> Option<String>;
}

/// A [`BundleManager`] with no installed bundles — the safe default when no
/// real bundle manager is wired in (every workload falls through to a zero
/// live-mode score, never a panic).
pub struct EmptyBundleManager;

impl BundleManager for EmptyBundleManager {
    fn list_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn bundle_id(&self, _name: &str, _version: &str) -> Option<String> {
        None
    }
}

/// Split a bundle manager's `"name (version)"` display string into its parts.
///
/// Returns `None` for malformed entries; the caller skips those bundles and
/// continues rather than aborting enumeration.
fn split_name_version(entry: &str) -> Option<(String, String)> {
    let last_open = entry.rfind('(')?;
    let last_close = entry.rfind(')')?;
    if last_close < last_open {
        return None;
    }
    let name = entry[..last_open].trim();
    let version = entry[last_open + 1..last_close].trim();
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name.to_string(), version.to_string()))
}

/// Enumerate this node's installed bundles, grouped by name, with sizes
/// resolved through the upstream file-size probe.
pub async fn list_local_bundles(
    manager: &dyn BundleManager,
    upstream_base_url: &str,
) -> HashMap<String, Vec<LocalBundleInfo>> {
    let mut by_name: HashMap<String, Vec<LocalBundleInfo>> = HashMap::new();

    for entry in manager.list_names() {
        let Some((name, version)) = split_name_version(&entry) else {
            tracing::warn!(entry, "malformed bundle manager entry, skipping");
            continue;
        };

        let Some(id) = manager.bundle_id(&name, &version) else {
            continue;
        };

        let size = super::upstream::size_or_fallback(upstream_base_url, &id).await;
        by_name.entry(name.clone()).or_default().push(LocalBundleInfo {
            id,
            name,
            version,
            size,
        });
    }

    by_name
}

/// Live-mode accounting: for each remote descriptor, find matching local
/// bundles by name and take the maximum matching size.
///
/// `remote` must already have the closure (first) descriptor stripped by the
/// caller.
#[must_use]
pub fn compare_and_calculate(
    local: &HashMap<String, Vec<LocalBundleInfo>>,
    remote: &[DependencyDescriptor],
) -> f64 {
    if remote.is_empty() {
        tracing::warn!("no remote prefabs found, returning 0");
        return 0.0;
    }

    let mut total = 0.0_f64;
    for descriptor in remote {
        let Some(candidates) = local.get(&descriptor.name) else {
            continue;
        };

        let mut best = 0.0_f64;
        for candidate in candidates {
            if version_match(
                &descriptor.spectype,
                &candidate.name,
                &descriptor.specifier,
                &candidate.version,
            ) {
                #[allow(clippy::cast_precision_loss)]
                let size = candidate.size as f64;
                best = best.max(size);
            }
        }
        total += best;
    }
    total
}

/// Fixed-mode accounting: sum each prefab's own `prefab_size` for every
/// prefab in `app` that the filesize catalog also has an entry for, skipping
/// prefabs the catalog doesn't know about. The catalog is consulted only as
/// a presence gate; the size summed is the app entry's own
/// `prefab_size`, never the catalog's. The taskc (root) entry is ignored;
/// the prefab list is counted in full — no closure skip, unlike live mode.
/// This asymmetry is intentional: fixed manifests declare their own closure
/// inline rather than via a stripped first element.
#[must_use]
pub fn compare_and_calculate_fixed(
    app: &AppEntries,
    filesize_catalog: &super::catalog::FilesizeCatalog,
) -> f64 {
    let mut total_bytes: u64 = 0;
    for prefab in &app.prefabs {
        if prefab.prefab_id.is_empty() {
            continue;
        }
        if filesize_catalog.size_of(&prefab.prefab_id).is_some() {
            total_bytes += prefab.prefab_size;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let total = total_bytes as f64;
    total
}
