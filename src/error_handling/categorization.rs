//! Fetch error categorization.
//!
//! Maps `reqwest::Error` values onto a small, stable set of kinds so that a
//! failed scan can report *why* the asset page could not be fetched.

use strum_macros::EnumIter;

/// Why an asset page fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The request exceeded the configured fetch timeout
    Timeout,
    /// TCP/TLS connection could not be established
    Connect,
    /// Redirect loop or too many redirects
    Redirect,
    /// 403 Forbidden, typically bot protection in front of the asset
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 429 Too Many Requests
    TooManyRequests,
    /// Any other 4xx status
    ClientStatus,
    /// Any 5xx status
    ServerStatus,
    /// Body could not be read or decoded
    Body,
    /// Body exceeded the maximum accepted size
    TooLarge,
    /// Request could not be built (malformed URL)
    InvalidUrl,
    /// Anything else
    Other,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::Timeout => "request timed out",
            FetchErrorKind::Connect => "connection failed",
            FetchErrorKind::Redirect => "redirect error",
            FetchErrorKind::Forbidden => "forbidden (403)",
            FetchErrorKind::NotFound => "not found (404)",
            FetchErrorKind::TooManyRequests => "too many requests (429)",
            FetchErrorKind::ClientStatus => "client error status",
            FetchErrorKind::ServerStatus => "server error status",
            FetchErrorKind::Body => "body read error",
            FetchErrorKind::TooLarge => "response too large",
            FetchErrorKind::InvalidUrl => "invalid URL",
            FetchErrorKind::Other => "fetch error",
        }
    }
}

/// Categorizes a `reqwest::Error` into a [`FetchErrorKind`].
///
/// HTTP status codes are checked first (they are only present for errors
/// produced by `error_for_status`), then the reqwest error class.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FetchErrorKind {
    if let Some(status) = error.status() {
        match status.as_u16() {
            403 => return FetchErrorKind::Forbidden,
            404 => return FetchErrorKind::NotFound,
            429 => return FetchErrorKind::TooManyRequests,
            _ if status.is_client_error() => return FetchErrorKind::ClientStatus,
            _ if status.is_server_error() => return FetchErrorKind::ServerStatus,
            _ => {}
        }
    }

    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_builder() {
        FetchErrorKind::InvalidUrl
    } else if error.is_redirect() {
        FetchErrorKind::Redirect
    } else if error.is_connect() {
        FetchErrorKind::Connect
    } else if error.is_body() || error.is_decode() {
        FetchErrorKind::Body
    } else {
        FetchErrorKind::Other
    }
}
