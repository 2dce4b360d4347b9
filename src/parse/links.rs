//! Outbound link extraction.
//!
//! Only absolute `http(s)://` and protocol-relative hrefs are kept: relative
//! paths, fragments, `mailto:` and `javascript:` links can never point at a
//! partner. Links back to the asset itself are dropped as navigation.

use std::collections::HashSet;
use std::sync::LazyLock;

use log::debug;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::config::MAX_ANCHOR_TEXT_CHARS;
use crate::domain::{domain_matches, normalize_domain};
use crate::utils::sanitize_and_truncate;

// Literal selector; a parse failure is a programming error.
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").unwrap_or_else(|e| panic!("invalid anchor selector: {e}"))
});

/// An outbound link found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedLink {
    /// Absolute URL (protocol-relative hrefs resolved to `https:`)
    pub url: String,
    /// Visible anchor text with nested markup stripped
    pub anchor: String,
    /// Normalized host of `url`
    pub domain: String,
}

/// Extracts the distinct outbound links of an HTML document.
///
/// Links are deduplicated by absolute URL, keeping the first occurrence and
/// document order. Hrefs that fail to parse are dropped silently; a single bad
/// link never fails the extraction.
///
/// # Arguments
///
/// * `html` - Raw page HTML
/// * `asset_domain` - Domain of the scanned asset; links on it or its subdomains are excluded
pub fn extract_links(html: &str, asset_domain: &str) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);
    let asset_domain = normalize_domain(asset_domain);
    let mut seen_urls = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = absolute_href(href) else {
            continue;
        };
        let parsed = match url::Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Dropping malformed href {:?}: {}", href, e);
                continue;
            }
        };
        let Some(host) = parsed.host_str() else {
            continue;
        };
        let domain = normalize_domain(host);
        if domain_matches(&domain, &asset_domain) {
            continue;
        }
        if !seen_urls.insert(url.clone()) {
            continue;
        }

        links.push(ExtractedLink {
            url,
            anchor: anchor_text(&element),
            domain,
        });
    }

    links
}

/// Resolves an href to an absolute URL, or `None` when it is not an external link.
fn absolute_href(href: &str) -> Option<String> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(href.to_string())
    } else if href.starts_with("//") {
        Some(format!("https:{href}"))
    } else {
        None
    }
}

/// Visible text of an anchor: nested markup stripped, whitespace collapsed.
fn anchor_text(element: &ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    sanitize_and_truncate(&collapsed, MAX_ANCHOR_TEXT_CHARS)
}
