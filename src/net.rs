//! Shared outbound HTTP client.
//!
//! One [`reqwest::Client`] is built once and reused everywhere an outbound
//! request is needed (blueprint lookups, bundle size probes, the scoring
//! plugin's calls into the daemon). Built lazily so constructing it never runs
//! before an async runtime exists to back its connection pool, mirroring the
//! `HTTP_CLIENT` pattern in `sources/news/fetch.rs`.

use std::sync::LazyLock;
use std::time::Duration;

/// Timeout applied to every request issued through [`HTTP_CLIENT`].
///
/// Matches the 500ms budget the scoring plugin allows for a `QueryNodeLayers`
/// round-trip (`layerlocality.go`); other callers (bundle size probes,
/// blueprint lookups) reuse the same budget rather than inventing their own.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(500);

/// The process-wide HTTP client.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
});
