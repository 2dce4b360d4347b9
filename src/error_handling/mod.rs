//! Error handling.
//!
//! This module provides:
//! - The `ReconcileError` taxonomy surfaced by scans, confirmations and deal mutations
//! - Storage and initialization error types
//! - Categorization of page fetch failures
//!
//! Errors on individual malformed links never reach this layer: the extractor
//! drops such links and the scan continues.

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, FetchErrorKind};
pub use types::{DatabaseError, Entity, ErrorBody, InitializationError, ReconcileError};
