//! Asset page fetching.
//!
//! One GET per scan, bounded by a timeout that drops the in-flight request.
//! Failures are reported, never retried: the caller re-triggers the scan.

use std::time::Duration;

use log::{debug, warn};

use crate::config::{MAX_ERROR_MESSAGE_LENGTH, MAX_RESPONSE_BODY_SIZE};
use crate::error_handling::{categorize_reqwest_error, FetchErrorKind, ReconcileError};
use crate::utils::sanitize_and_truncate;

/// Browser-like content negotiation headers.
///
/// No `Accept-Encoding`: the client is built without decompression support.
fn apply_request_headers(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    builder
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .header(reqwest::header::CACHE_CONTROL, "max-age=0")
}

fn fetch_failure(url: &str, kind: FetchErrorKind, message: &str) -> ReconcileError {
    let message = sanitize_and_truncate(message, MAX_ERROR_MESSAGE_LENGTH);
    warn!("Fetch of {url} failed ({kind}): {message}");
    ReconcileError::FetchFailure {
        url: url.to_string(),
        kind,
        message,
    }
}

fn from_reqwest(url: &str, error: &reqwest::Error) -> ReconcileError {
    fetch_failure(url, categorize_reqwest_error(error), &error.to_string())
}

fn too_large(url: &str, size: u64) -> ReconcileError {
    fetch_failure(
        url,
        FetchErrorKind::TooLarge,
        &format!("body of {size} bytes exceeds limit of {MAX_RESPONSE_BODY_SIZE} bytes"),
    )
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String, ReconcileError> {
    let response = apply_request_headers(client.get(url))
        .send()
        .await
        .map_err(|e| from_reqwest(url, &e))?
        .error_for_status()
        .map_err(|e| from_reqwest(url, &e))?;

    if let Some(length) = response.content_length() {
        if length > MAX_RESPONSE_BODY_SIZE as u64 {
            return Err(too_large(url, length));
        }
    }

    let body = response.text().await.map_err(|e| from_reqwest(url, &e))?;
    if body.len() > MAX_RESPONSE_BODY_SIZE {
        return Err(too_large(url, body.len() as u64));
    }
    Ok(body)
}

/// Fetches `url` and returns the response body as text.
///
/// Non-2xx responses, network errors, oversized bodies and requests that
/// outlive `timeout` all become `ReconcileError::FetchFailure`.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, ReconcileError> {
    debug!("Fetching {url} (timeout {}ms)", timeout.as_millis());
    match tokio::time::timeout(timeout, fetch_body(client, url)).await {
        Ok(result) => result,
        Err(_) => Err(fetch_failure(
            url,
            FetchErrorKind::Timeout,
            &format!("no complete response within {}ms", timeout.as_millis()),
        )),
    }
}
