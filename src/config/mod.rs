//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, confidence scores, defaults)
//! - Library configuration (`Config`)
//! - CLI option types and parsing (`Opt`, `Command`)

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Command, DecisionArg, Opt};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
