//! Mini image manifest store, loaded from `payload.json`.
//!
//! Maps an image name to its layer data (digest + size, authoritative) and its
//! plain layer reference list (used when cross-referencing against a pulled
//! image's layers). Mirrors `MiniImageManifest`/`virtManifestStore` from the
//! original daemon.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// One layer's digest and byte size.
#[derive(Debug, Clone, Deserialize)]
pub struct LayerData {
    /// Content digest, still carrying its `sha256:` prefix as stored.
    #[serde(rename = "Digest")]
    pub digest: String,
    /// Size in bytes.
    #[serde(rename = "Size")]
    pub size: u64,
}

/// An image's manifest: authoritative layer data plus a parallel reference
/// list used when walking a *different* image's pulled layers.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MiniImageManifest {
    /// Per-layer digest and size, for the image this manifest describes.
    #[serde(rename = "LayersData", default)]
    pub layers_data: Vec<LayerData>,
    /// Bare layer references (digest strings only), as pulled.
    #[serde(rename = "Layers", default)]
    pub layers: Vec<String>,
}

/// Strip a `sha256:`-style hash-algorithm prefix from a digest. Digests are
/// always compared with any hash-algorithm prefix stripped.
#[must_use]
pub fn strip_digest_prefix(digest: &str) -> &str {
    digest.split_once(':').map_or(digest, |(_, rest)| rest)
}

/// Load `payload.json` from `path`. Returns an empty store (and logs) on any
/// failure, matching `ReloadPayloadJSON`'s silent best-effort behavior in the
/// original daemon: a missing payload file just means every layer query
/// misses.
pub fn load_manifest_store(path: &Path) -> HashMap<String, MiniImageManifest> {
    match std::fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(store) => store,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to parse payload.json");
                HashMap::new()
            }
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read payload.json");
            HashMap::new()
        }
    }
}

/// Reloadable wrapper around the manifest store.
pub struct ManifestStore {
    path: std::path::PathBuf,
    inner: RwLock<HashMap<String, MiniImageManifest>>,
}

impl ManifestStore {
    /// Load the store once at construction time.
    #[must_use]
    pub fn load(path: std::path::PathBuf) -> Self {
        let inner = load_manifest_store(&path);
        Self {
            path,
            inner: RwLock::new(inner),
        }
    }

    /// Re-read the store from disk, swapping it in atomically.
    pub fn reload(&self) {
        let fresh = load_manifest_store(&self.path);
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = fresh;
    }

    /// Look up an image's manifest by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<MiniImageManifest> {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_algorithm_prefix() {
        assert_eq!(strip_digest_prefix("sha256:abcd"), "abcd");
    }

    #[test]
    fn leaves_bare_digest_untouched() {
        assert_eq!(strip_digest_prefix("abcd"), "abcd");
    }

    #[test]
    fn missing_payload_file_yields_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = load_manifest_store(&dir.path().join("payload.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn manifest_store_loads_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("payload.json");
        std::fs::write(
            &path,
            r#"{"X": {"LayersData": [{"Digest": "sha256:a", "Size": 100}], "Layers": ["sha256:a"]}}"#,
        )
        .expect("write fixture");
        let store = ManifestStore::load(path.clone());
        assert!(store.get("X").is_some());
        assert!(store.get("Y").is_none());

        std::fs::write(
            &path,
            r#"{"X": {"LayersData": [{"Digest": "sha256:a", "Size": 100}], "Layers": ["sha256:a"]},
                "Y": {"LayersData": [], "Layers": []}}"#,
        )
        .expect("overwrite fixture");
        store.reload();
        assert!(store.get("Y").is_some());
    }
}
