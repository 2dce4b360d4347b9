//! Brand and deal matching.
//!
//! Given one extracted link, decide which known brand (by registered domain)
//! and which occupying deal (by tracking domain or URL shape) it belongs to.
//! No match is a normal outcome, never an error.

mod brand;
mod deal;

pub use brand::{match_brand, BrandMatch};
pub use deal::{match_deal, DealMatch, DealMatchKind};
