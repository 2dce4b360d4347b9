//! Utility functions.
//!
//! This module provides:
//! - Text sanitization for anchor text and error messages

mod sanitize;

pub use sanitize::sanitize_and_truncate;
