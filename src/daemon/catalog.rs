//! Fixed-manifest app catalog and the filesize catalog it depends on.
//!
//! Two on-disk JSON files back this module: `apps.json` (loaded once at
//! startup) and `PrefabService/File.json` (reloaded before every fixed-mode
//! scoring call, per `ReloadFileJSON` in the original daemon). Both are stored
//! behind a [`std::sync::RwLock`] so a reload swap is atomic to concurrent
//! readers.

use crate::error::CatalogError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// One prefab entry inside an [`AppEntries`] record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entry {
    /// Opaque prefab identifier; keys the filesize catalog.
    #[serde(rename = "prefabID")]
    pub prefab_id: String,
    /// Blueprint identifier; carried through but unused in size accounting.
    #[serde(rename = "blueprintID", default)]
    pub blueprint_id: String,
    /// Size in bytes, already — not MiB, despite the field's unit-free name.
    #[serde(rename = "prefabSize")]
    pub prefab_size: u64,
}

/// A fixed-manifest workload description: the root (taskc) entry plus its
/// ordered prefab list.
#[derive(Debug, Clone, Deserialize)]
pub struct AppEntries {
    // NOTE: derives Clone so the daemon can release its catalog read-lock
    // before doing async size accounting work.
    /// The workload's root descriptor. Ignored during size accounting: only
    /// the `prefabs` list is counted (see `compare_and_calculate_fixed`).
    #[serde(default)]
    pub taskc: Option<Entry>,
    /// The workload's prefab list, counted in full (no closure skip in fixed
    /// mode, unlike live mode — a deliberate asymmetry).
    #[serde(default)]
    pub prefabs: Vec<Entry>,
}

/// One row of the filesize catalog (`PrefabService/File.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct PakInfo {
    /// Original filename, kept for diagnostics.
    #[serde(default)]
    pub filename: String,
    /// Original file type, kept for diagnostics.
    #[serde(default)]
    pub filetype: String,
    /// Size in bytes.
    pub filesize: u64,
}

/// Load `apps.json` from `work_dir`. Returns an empty map (and logs) on any
/// read or parse failure — a missing app catalog means every workload falls
/// through to live mode, not a daemon that refuses to start.
pub fn load_apps_catalog(work_dir: &Path) -> HashMap<String, AppEntries> {
    let path = work_dir.join("apps.json");
    match std::fs::read(&path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(apps) => apps,
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to parse apps.json");
                HashMap::new()
            }
        },
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "failed to read apps.json");
            HashMap::new()
        }
    }
}

/// Load the filesize catalog (`PrefabService/File.json` under `work_dir`).
///
/// Unlike `load_apps_catalog`, failure here is surfaced: callers reloading
/// this catalog on a live request need to know the reload didn't happen so
/// they can keep serving the previous snapshot instead of a half-updated one.
pub fn load_filesize_catalog(work_dir: &Path) -> Result<HashMap<String, PakInfo>, CatalogError> {
    let path = work_dir.join("PrefabService").join("File.json");
    let bytes = std::fs::read(&path).map_err(|source| CatalogError::Open {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| CatalogError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Reloadable wrapper around the filesize catalog.
pub struct FilesizeCatalog {
    work_dir: std::path::PathBuf,
    inner: RwLock<HashMap<String, PakInfo>>,
}

impl FilesizeCatalog {
    /// Load the catalog once at construction time. An initial load failure
    /// leaves the catalog empty; the first successful reload populates it.
    #[must_use]
    pub fn load(work_dir: std::path::PathBuf) -> Self {
        let inner = match load_filesize_catalog(&work_dir) {
            Ok(map) => map,
            Err(err) => {
                tracing::error!(error = %err, "initial filesize catalog load failed");
                HashMap::new()
            }
        };
        Self {
            work_dir,
            inner: RwLock::new(inner),
        }
    }

    /// Re-read the catalog from disk, swapping it in atomically on success.
    /// On failure, logs and leaves the previous snapshot in place.
    pub fn reload(&self) -> Result<(), CatalogError> {
        let fresh = load_filesize_catalog(&self.work_dir)?;
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = fresh;
        Ok(())
    }

    /// Look up the byte size for a prefab ID. Absence is not an error: the
    /// caller treats it as a zero contribution.
    #[must_use]
    pub fn size_of(&self, prefab_id: &str) -> Option<u64> {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.get(prefab_id).map(|info| info.filesize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        let mut file = std::fs::File::create(&path).expect("create fixture file");
        file.write_all(contents.as_bytes())
            .expect("write fixture file");
    }

    #[test]
    fn apps_catalog_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let apps = load_apps_catalog(dir.path());
        assert!(apps.is_empty());
    }

    #[test]
    fn apps_catalog_parses_prefab_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "apps.json",
            r#"{"sam2": {"taskc": {"prefabID": "root", "blueprintID": "b", "prefabSize": 0},
                         "prefabs": [{"prefabID": "p1", "blueprintID": "b1", "prefabSize": 1000},
                                     {"prefabID": "p2", "blueprintID": "b2", "prefabSize": 500}]}}"#,
        );
        let apps = load_apps_catalog(dir.path());
        let sam2 = apps.get("sam2").expect("sam2 entry present");
        assert_eq!(sam2.prefabs.len(), 2);
        assert_eq!(sam2.prefabs[0].prefab_size, 1000);
    }

    #[test]
    fn filesize_catalog_reload_replaces_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "PrefabService/File.json",
            r#"{"p1": {"filename": "a", "filetype": "t", "filesize": 1000}}"#,
        );
        let catalog = FilesizeCatalog::load(dir.path().to_path_buf());
        assert_eq!(catalog.size_of("p1"), Some(1000));
        assert_eq!(catalog.size_of("p3"), None);

        write_file(
            dir.path(),
            "PrefabService/File.json",
            r#"{"p1": {"filename": "a", "filetype": "t", "filesize": 1000},
                "p3": {"filename": "c", "filetype": "t", "filesize": 2000}}"#,
        );
        catalog.reload().expect("reload succeeds");
        assert_eq!(catalog.size_of("p3"), Some(2000));
    }

    #[test]
    fn filesize_catalog_reload_failure_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(
            dir.path(),
            "PrefabService/File.json",
            r#"{"p1": {"filename": "a", "filetype": "t", "filesize": 1000}}"#,
        );
        let catalog = FilesizeCatalog::load(dir.path().to_path_buf());
        std::fs::remove_file(dir.path().join("PrefabService/File.json"))
            .expect("remove fixture file");
        assert!(catalog.reload().is_err());
        assert_eq!(catalog.size_of("p1"), Some(1000));
    }
}
