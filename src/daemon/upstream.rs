//! Upstream file-size probe: `GetPakSizeHTTP` from the original daemon.
//!
//! Sizes a local bundle by issuing a HEAD request to the upstream file
//! service keyed by the bundle's opaque ID, reading `Content-Length`. Callers
//! never see the failure: a failed probe defaults to size 1 and scoring
//! continues.

/// Default fallback size (bytes) when the upstream HEAD probe fails or the
/// response carries no usable `Content-Length` — never zero, so presence
/// still contributes positively.
pub const PROBE_FALLBACK_SIZE: u64 = 1;

/// HEAD `{base_url}/file?id={id}` and return its `Content-Length` in bytes.
///
/// Returns `Err` (never panics) on any transport failure, non-200 status, or
/// missing/unparseable length header; callers substitute
/// [`PROBE_FALLBACK_SIZE`] in that case.
pub async fn get_pak_size_http(base_url: &str, id: &str) -> Result<u64, String> {
    let url = format!("{base_url}/file?id={id}");
    let response = crate::net::HTTP_CLIENT
        .head(&url)
        .send()
        .await
        .map_err(|err| err.to_string())?;

    if !response.status().is_success() {
        return Err(format!("status code {}", response.status()));
    }

    let length = response
        .headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .ok_or_else(|| "Content-Length not found".to_string())?;
    let length = length.to_str().map_err(|err| err.to_string())?;
    length.parse::<u64>().map_err(|err| err.to_string())
}

/// Size a bundle, falling back to [`PROBE_FALLBACK_SIZE`] on any failure.
pub async fn size_or_fallback(base_url: &str, id: &str) -> u64 {
    match get_pak_size_http(base_url, id).await {
        Ok(size) => size,
        Err(err) => {
            tracing::warn!(id, error = %err, "upstream file-size probe failed, using fallback");
            PROBE_FALLBACK_SIZE
        }
    }
}
