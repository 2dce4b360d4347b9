//! Configuration types.
//!
//! This module defines enums and structs shared by the library configuration
//! and the command-line parser.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DB_PATH, DEFAULT_ASSET_SCHEME, DEFAULT_USER_AGENT, FETCH_TIMEOUT_SECS,
};

/// Logging level for the binary. Noisy dependencies stay capped regardless.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use deal_reconciler::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./deals.db"),
///     fetch_timeout_seconds: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Page fetch timeout in seconds
    pub fetch_timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Scheme used to build an asset's scan URL
    pub asset_scheme: String,
}

impl Config {
    /// Page fetch timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    /// URL fetched when scanning an asset with the given domain.
    ///
    /// A stored domain may carry its own scheme or trailing slashes; both are
    /// dropped so only the host (with any `www.`) follows `asset_scheme`.
    pub fn asset_url(&self, domain: &str) -> String {
        let mut host = domain.trim();
        for scheme in ["https://", "http://"] {
            if let Some(prefix) = host.get(..scheme.len()) {
                if prefix.eq_ignore_ascii_case(scheme) {
                    host = &host[scheme.len()..];
                    break;
                }
            }
        }
        format!("{}://{}", self.asset_scheme, host.trim_end_matches('/'))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            fetch_timeout_seconds: FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            asset_scheme: DEFAULT_ASSET_SCHEME.to_string(),
        }
    }
}
