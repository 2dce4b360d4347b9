//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including timeouts, confidence scores and default paths.

/// Default SQLite database path.
pub const DB_PATH: &str = "./deal_reconciler.db";

/// Environment variable that overrides [`DB_PATH`].
pub const DB_PATH_ENV: &str = "DEAL_RECONCILER_DB_PATH";

// Network operation timeouts
/// Default page fetch timeout in seconds.
/// The whole request (connect, headers, body) must finish within this bound.
pub const FETCH_TIMEOUT_SECS: u64 = 15;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default scheme used to build an asset's scan URL (`{scheme}://{domain}`).
pub const DEFAULT_ASSET_SCHEME: &str = "https";

/// Default User-Agent string for page fetches.
///
/// Uses a generic Chrome-like string; some asset hosts serve a stripped page
/// to unknown clients. Override with `--user-agent`.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Response and body size limits
/// Maximum response body size in bytes (2MB)
/// Pages larger than this are rejected as a fetch failure
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

// Classification confidence scores
/// Link matched an active deal and agrees with the recorded affiliate link.
pub const CONFIDENCE_VERIFIED: f64 = 1.0;
/// Link matched an active deal but its domain drifted and no brand matched.
pub const CONFIDENCE_DEAL_DRIFT: f64 = 0.8;
/// Link domain matched a registered brand domain.
pub const CONFIDENCE_BRAND_MATCH: f64 = 0.7;

/// Geo recorded on deals created from a scan when the caller gives none.
pub const DEFAULT_GEO: &str = "GLOBAL";

/// Actor recorded in the audit log when the caller does not name one.
pub const SYSTEM_ACTOR: &str = "system";

// Stored text limits
/// Maximum anchor text kept per scan item, in characters
pub const MAX_ANCHOR_TEXT_CHARS: usize = 500;
/// Maximum error message length in characters (2000 chars)
/// Fetch error messages longer than this are truncated with a note about the original length
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;
