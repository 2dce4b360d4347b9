//! HTML link extraction and affiliate link classification.
//!
//! - `extract_links()` pulls the distinct outbound anchors out of a page
//! - `is_likely_affiliate_link()` filters them down to probable tracking links
//!
//! Parsing is done using CSS selectors via the `scraper` crate; the classifier
//! is an ordered list of `regex` heuristics.

mod affiliate;
mod links;

// Re-export public API
pub use affiliate::{affiliate_signal, is_likely_affiliate_link};
pub use links::{extract_links, ExtractedLink};
