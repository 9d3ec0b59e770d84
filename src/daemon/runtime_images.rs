//! Pulled-image enumeration via the container runtime CLI.
//!
//! Shells out to the runtime's image-listing command (`crictl images --output
//! json` for CRI-O) and falls back to a canned JSON snapshot file when the
//! exec fails. Ported from `GetPulledImageNames`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Deserialize)]
struct CrictlImage {
    #[serde(rename = "repoTags", default)]
    repo_tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CrictlImagesResponse {
    #[serde(default)]
    images: Vec<CrictlImage>,
}

/// Enumerate images pulled on this node, keyed by bare image name (path and
/// registry stripped) to the set of tags pulled for that name.
///
/// Tries `{runtime_cli} images --output json` first; on any exec or parse
/// failure, falls back to reading `fallback_path` (same JSON shape). If both
/// fail, returns an empty map — the node is treated as having no pulled
/// images.
pub fn get_pulled_image_names(runtime_cli: &str, fallback_path: &Path) -> HashMap<String, Vec<String>> {
    let output = Command::new(runtime_cli)
        .args(["images", "--output", "json"])
        .output();

    let bytes = match output {
        Ok(out) if out.status.success() => out.stdout,
        Ok(out) => {
            tracing::warn!(
                runtime_cli,
                status = %out.status,
                "runtime CLI exited non-zero, falling back to canned snapshot"
            );
            match std::fs::read(fallback_path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(path = %fallback_path.display(), error = %err, "fallback snapshot unreadable");
                    return HashMap::new();
                }
            }
        }
        Err(err) => {
            tracing::warn!(runtime_cli, error = %err, "failed to exec runtime CLI, falling back to canned snapshot");
            match std::fs::read(fallback_path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(path = %fallback_path.display(), error = %err, "fallback snapshot unreadable");
                    return HashMap::new();
                }
            }
        }
    };

    let response: CrictlImagesResponse = match serde_json::from_slice(&bytes) {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "failed to parse runtime image listing");
            return HashMap::new();
        }
    };

    let mut image_map: HashMap<String, Vec<String>> = HashMap::new();
    for image in response.images {
        for repo_tag in image.repo_tags {
            let Some((full_name, tag)) = repo_tag.rsplit_once(':') else {
                continue;
            };
            let name = full_name
                .rsplit_once('/')
                .map_or(full_name, |(_, rest)| rest);
            image_map.entry(name.to_string()).or_default().push(tag.to_string());
        }
    }
    image_map
}
