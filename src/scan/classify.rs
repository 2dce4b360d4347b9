//! Classification of candidate links against brands and occupying deals.
//!
//! Pure: the same links, brands and deals always give the same items in the
//! same order (links first, then missing deals by id).

use std::collections::HashSet;

use log::debug;

use crate::config::{CONFIDENCE_DEAL_DRIFT, CONFIDENCE_VERIFIED};
use crate::domain::link_domain;
use crate::matching::{match_brand, match_deal};
use crate::parse::ExtractedLink;
use crate::storage::models::{BrandInfo, DealInfo, ScanItemType};
use crate::storage::NewScanItem;

fn found(link: &ExtractedLink, item_type: ScanItemType) -> NewScanItem {
    NewScanItem {
        item_type,
        found_url: Some(link.url.clone()),
        found_anchor: Some(link.anchor.clone()),
        matched_deal_id: None,
        matched_brand_id: None,
        confidence: None,
        notes: String::new(),
    }
}

/// Classifies each candidate link, then reports every occupying deal no link
/// accounted for as missing.
pub fn classify_links(
    candidates: &[ExtractedLink],
    brands: &[BrandInfo],
    deals: &[DealInfo],
) -> Vec<NewScanItem> {
    let mut matched_deal_ids = HashSet::new();
    let mut items = Vec::with_capacity(candidates.len() + deals.len());

    for link in candidates {
        let brand_match = match_brand(link, brands);

        let item = if let Some(deal_match) = match_deal(link, deals) {
            let deal = deal_match.deal;
            matched_deal_ids.insert(deal.id);
            let recorded_domain = link_domain(&deal.affiliate_link);

            if link.domain != recorded_domain {
                NewScanItem {
                    matched_deal_id: Some(deal.id),
                    matched_brand_id: Some(brand_match.as_ref().map_or(deal.brand_id, |b| b.brand.id)),
                    confidence: Some(
                        brand_match
                            .as_ref()
                            .map_or(CONFIDENCE_DEAL_DRIFT, |b| b.confidence),
                    ),
                    notes: format!(
                        "matched deal {} by {}, but link domain {} differs from recorded {}",
                        deal.id, deal_match.kind, link.domain, recorded_domain
                    ),
                    ..found(link, ScanItemType::Replacement)
                }
            } else {
                NewScanItem {
                    matched_deal_id: Some(deal.id),
                    matched_brand_id: Some(deal.brand_id),
                    confidence: Some(CONFIDENCE_VERIFIED),
                    notes: format!("matched deal {} by {}", deal.id, deal_match.kind),
                    ..found(link, ScanItemType::Verified)
                }
            }
        } else if let Some(brand_match) = brand_match {
            let brand = brand_match.brand;
            match deals.iter().find(|d| d.brand_id == brand.id) {
                Some(existing) => {
                    matched_deal_ids.insert(existing.id);
                    NewScanItem {
                        matched_deal_id: Some(existing.id),
                        matched_brand_id: Some(brand.id),
                        confidence: Some(brand_match.confidence),
                        notes: format!(
                            "brand {} recognized, but link does not match deal {} ({})",
                            brand.name, existing.id, existing.affiliate_link
                        ),
                        ..found(link, ScanItemType::Replacement)
                    }
                }
                None => NewScanItem {
                    matched_brand_id: Some(brand.id),
                    confidence: Some(brand_match.confidence),
                    notes: format!("brand {} recognized, no active deal on this asset", brand.name),
                    ..found(link, ScanItemType::NewUnmatched)
                },
            }
        } else {
            NewScanItem {
                notes: "no matching brand or deal".to_string(),
                ..found(link, ScanItemType::NewUnmatched)
            }
        };

        debug!("Classified {} as {}", link.url, item.item_type);
        items.push(item);
    }

    for deal in deals {
        if matched_deal_ids.contains(&deal.id) {
            continue;
        }
        items.push(NewScanItem {
            item_type: ScanItemType::Missing,
            found_url: None,
            found_anchor: None,
            matched_deal_id: Some(deal.id),
            matched_brand_id: Some(deal.brand_id),
            confidence: None,
            notes: format!("expected link {} not found on page", deal.affiliate_link),
        });
    }

    items
}
