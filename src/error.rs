//! Shared error types for the locality scoring pipeline.
//!
//! The daemon and resolver use [`thiserror`]-derived enums at their seams.
//! Leaf-level plumbing that never needs to be matched on by a caller uses a
//! boxed `dyn Error` alias instead.

use thiserror::Error;

/// Convenient `Result` alias for leaf-level network/parsing operations.
pub type BoxResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Errors raised while resolving a workload's dependency list (component B).
///
/// Resolver failures are recoverable: callers log this and fall back to an
/// empty dependency list rather than propagating it.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The upstream blueprint service could not be reached or returned an error.
    #[error("blueprint request failed for {name}:{tag}: {reason}")]
    BlueprintUnavailable {
        /// Image name the blueprint was requested for.
        name: String,
        /// Tag the blueprint was requested for.
        tag: String,
        /// Human-readable cause, e.g. a transport or decode error message.
        reason: String,
    },
}

/// Errors raised while loading or reloading a daemon catalog (component C).
///
/// A reload failure keeps serving the previously loaded catalog; the caller
/// logs this at `warn` and continues.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The catalog file could not be parsed as JSON.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying JSON decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by the scoring plugin (component D).
///
/// Unlike [`ResolverError`] or [`CatalogError`], these are structural: they
/// come from the orchestrator's own snapshot machinery, not from the nodes
/// being scored, so the plugin cannot recover from them by substituting a
/// default and must fail the scoring extension point entirely.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The cluster snapshot could not be listed.
    #[error("failed to list node snapshot: {0}")]
    SnapshotUnavailable(String),
    /// The candidate node named by the scheduler framework has no record in
    /// the snapshot just listed.
    #[error("candidate node {0} not present in snapshot")]
    CandidateNodeMissing(String),
}
