//! Node inspection daemon (component C).
//!
//! Answers "how many bytes of this dependency list does this node already
//! have?" over HTTP, consulting either a fixed-manifest catalog or a live
//! bundle inventory (bundle mode) or the local manifest store (layer mode).
//! Ported from `blobdaemon.go`'s handler pair.

pub mod bundles;
pub mod catalog;
pub mod layers;
pub mod manifest;
pub mod runtime_images;
pub mod upstream;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use bundles::BundleManager;
use catalog::{AppEntries, FilesizeCatalog};
use manifest::ManifestStore;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::resolver::DependencyDescriptor;

/// Daemon configuration and shared catalogs, held behind an [`Arc`] and handed
/// to every handler via axum's `State` extractor.
pub struct AppState {
    /// Work directory backing `apps.json` and the filesize catalog.
    pub work_dir: PathBuf,
    /// Container runtime CLI to invoke for pulled-image enumeration.
    pub runtime_cli: String,
    /// Fallback JSON snapshot path if the runtime CLI exec fails.
    pub crictl_fallback: PathBuf,
    /// Base URL of the upstream file-size service.
    pub upstream_base_url: String,
    /// Fixed-manifest app catalog, loaded once at startup.
    pub apps: RwLock<HashMap<String, AppEntries>>,
    /// Filesize catalog, reloaded before every fixed-mode request.
    pub filesize_catalog: FilesizeCatalog,
    /// Image-name-to-layers manifest store, loaded once at startup.
    pub manifest_store: ManifestStore,
    /// Local bundle enumeration collaborator (live mode).
    pub bundle_manager: Box<dyn BundleManager>,
}

impl AppState {
    /// Build the daemon state, loading all catalogs from `work_dir` and
    /// `payload_path`.
    #[must_use]
    pub fn new(
        work_dir: PathBuf,
        payload_path: PathBuf,
        runtime_cli: String,
        crictl_fallback: PathBuf,
        upstream_base_url: String,
        bundle_manager: Box<dyn BundleManager>,
    ) -> Self {
        let apps = catalog::load_apps_catalog(&work_dir);
        let filesize_catalog = FilesizeCatalog::load(work_dir.clone());
        let manifest_store = ManifestStore::load(payload_path);
        Self {
            work_dir,
            runtime_cli,
            crictl_fallback,
            upstream_base_url,
            apps: RwLock::new(apps),
            filesize_catalog,
            manifest_store,
            bundle_manager,
        }
    }
}

/// Build the daemon's axum [`Router`], wiring `/bundles/{nodeId}`,
/// `/layers/{nodeId}`, and `/healthz`.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/bundles/{node_id}", post(bundle_handler))
        .route("/layers/{node_id}", post(layer_handler))
        .route("/healthz", get(healthz))
        .with_state(state)
}

#[derive(Serialize)]
struct SizesResponse {
    sizes: f64,
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn bundle_handler(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<String>,
    body: Result<Json<Vec<DependencyDescriptor>>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Json(remote) = match body {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(node_id, error = %err, "malformed bundle request body");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    let Some(first) = remote.first() else {
        tracing::warn!(node_id, "empty dependency list");
        return respond(&node_id, 0.0);
    };

    let apps = state
        .apps
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let fixed = apps.get(&first.name).cloned();
    drop(apps);

    tracing::info!(node_id, workload = %first.name, fixed = fixed.is_some(), "bundle request");

    let sizes = if let Some(app) = fixed {
        if let Err(err) = state.filesize_catalog.reload() {
            tracing::error!(node_id, error = %err, "failed to reload filesize catalog");
            0.0
        } else {
            bundles::compare_and_calculate_fixed(&app, &state.filesize_catalog)
        }
    } else {
        let local =
            bundles::list_local_bundles(state.bundle_manager.as_ref(), &state.upstream_base_url)
                .await;
        bundles::compare_and_calculate(&local, &remote[1..])
    };

    respond(&node_id, sizes)
}

async fn layer_handler(
    State(state): State<Arc<AppState>>,
    Path(node_id): Path<String>,
    body: Result<Json<Vec<DependencyDescriptor>>, axum::extract::rejection::JsonRejection>,
) -> Response {
    let Json(remote) = match body {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(node_id, error = %err, "malformed layer request body");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    tracing::info!(node_id, "layer request");
    let sizes = layers::layer_handler_inner(
        &remote,
        &state.manifest_store,
        &state.runtime_cli,
        &state.crictl_fallback,
    );
    respond(&node_id, sizes)
}

fn respond(node_id: &str, sizes: f64) -> Response {
    tracing::info!(node_id, sizes, "request complete");
    (StatusCode::OK, Json(SizesResponse { sizes })).into_response()
}
