//! Brand matching by registered domain.

use crate::config::CONFIDENCE_BRAND_MATCH;
use crate::domain::domain_matches;
use crate::parse::ExtractedLink;
use crate::storage::models::{BrandInfo, BrandStatus};

/// A brand recognized from a link's domain.
#[derive(Debug, Clone)]
pub struct BrandMatch<'a> {
    pub brand: &'a BrandInfo,
    pub confidence: f64,
}

/// Finds the brand whose registered domain the link belongs to.
///
/// Only active brands with a non-empty domain are considered. Every match
/// scores [`CONFIDENCE_BRAND_MATCH`]; on ties the first brand found wins.
pub fn match_brand<'a>(link: &ExtractedLink, brands: &'a [BrandInfo]) -> Option<BrandMatch<'a>> {
    let mut best: Option<BrandMatch<'a>> = None;

    for brand in brands {
        if brand.status != BrandStatus::Active {
            continue;
        }
        let Some(domain) = brand.domain.as_deref() else {
            continue;
        };
        if !domain_matches(&link.domain, domain) {
            continue;
        }
        let confidence = CONFIDENCE_BRAND_MATCH;
        if best.as_ref().map_or(true, |b| confidence > b.confidence) {
            best = Some(BrandMatch { brand, confidence });
        }
    }

    best
}
