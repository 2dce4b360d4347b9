//! Deal matching by tracking domain or affiliate URL shape.

use serde::Serialize;
use strum_macros::Display;
use url::Url;

use crate::domain::domain_matches;
use crate::parse::ExtractedLink;
use crate::storage::models::DealInfo;

/// Which rule tied a link to a deal, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DealMatchKind {
    /// Link host is the deal's tracking domain (or a subdomain of it)
    TrackingDomain,
    /// Link URL equals the affiliate link byte for byte
    ExactUrl,
    /// Equal ignoring case and trailing slashes
    NormalizedUrl,
    /// Same host and path, query string ignored
    HostAndPath,
}

/// An occupying deal recognized from a link.
#[derive(Debug, Clone)]
pub struct DealMatch<'a> {
    pub deal: &'a DealInfo,
    pub kind: DealMatchKind,
}

/// Finds the occupying deal a link belongs to.
///
/// Tracking domains are checked across all deals first, so a tracking-domain
/// hit always wins over a URL-shape match on another deal. Otherwise each deal
/// is tried in order against exact URL, normalized URL, then host and path.
pub fn match_deal<'a>(link: &ExtractedLink, deals: &'a [DealInfo]) -> Option<DealMatch<'a>> {
    for deal in deals {
        let Some(tracking_domain) = deal.tracking_domain.as_deref() else {
            continue;
        };
        if domain_matches(&link.domain, tracking_domain) {
            return Some(DealMatch {
                deal,
                kind: DealMatchKind::TrackingDomain,
            });
        }
    }

    let link_url = link.url.trim();
    let link_normalized = strip_for_compare(link_url);
    let link_parsed = Url::parse(link_url).ok();

    for deal in deals {
        let affiliate_link = deal.affiliate_link.trim();
        let kind = if link_url == affiliate_link {
            DealMatchKind::ExactUrl
        } else if link_normalized == strip_for_compare(affiliate_link) {
            DealMatchKind::NormalizedUrl
        } else if link_parsed
            .as_ref()
            .is_some_and(|parsed| same_host_and_path(parsed, affiliate_link))
        {
            DealMatchKind::HostAndPath
        } else {
            continue;
        };
        return Some(DealMatch { deal, kind });
    }

    None
}

fn strip_for_compare(url: &str) -> String {
    url.trim_end_matches('/').to_lowercase()
}

fn same_host_and_path(link: &Url, affiliate_link: &str) -> bool {
    let Ok(recorded) = Url::parse(affiliate_link) else {
        return false;
    };
    match (link.host_str(), recorded.host_str()) {
        (Some(a), Some(b)) => a == b && link.path() == recorded.path(),
        _ => false,
    }
}
