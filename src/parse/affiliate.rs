//! Affiliate link heuristics.
//!
//! A cheap filter in front of the brand and deal matchers. It only looks at the
//! URL string. A missed affiliate link surfaces later as a missing deal; a false
//! positive becomes an unmatched item a reviewer dismisses.

use regex::Regex;
use std::sync::LazyLock;

/// Ordered `(name, pattern)` heuristics. Evaluated top to bottom; the first match wins.
const AFFILIATE_PATTERNS: &[(&str, &str)] = &[
    // Tracking subdomains
    (
        "tracking subdomain",
        r"^https?://(?:www\.)?(?:track|tracking|trk|click|clicks|clk|go|aff|affiliate|affiliates|partner|partners|record|refer|redirect)\.",
    ),
    // Query parameters
    ("btag parameter", r"[?&]btag="),
    (
        "click id parameter",
        r"[?&](?:clickid|click_id|cid|subid|sub_id|s1|s2)=",
    ),
    ("utm parameter", r"[?&]utm_[a-z]+="),
    (
        "affiliate id parameter",
        r"[?&](?:aff|affid|aff_id|affiliate|affiliate_id|a_aid|tag)=",
    ),
    ("ref parameter", r"[?&](?:ref|refid|ref_id|referrer)="),
    ("pid parameter", r"[?&](?:pid|partner_id|tracking_id)="),
    // Path keywords
    (
        "offer path",
        r"^https?://[^/?#]+/(?:[^?#]*/)?(?:offers?|promos?|promotions?|affiliates?)(?:[/?#._-]|$)",
    ),
];

fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

static COMPILED_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    AFFILIATE_PATTERNS
        .iter()
        .map(|(name, pattern)| (*name, compile_regex_unsafe(pattern, name)))
        .collect()
});

/// Name of the first heuristic the URL triggers, if any.
pub fn affiliate_signal(url: &str) -> Option<&'static str> {
    let url = url.trim();
    COMPILED_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(url))
        .map(|(name, _)| *name)
}

/// Returns `true` when the URL looks like an affiliate or tracking link.
pub fn is_likely_affiliate_link(url: &str) -> bool {
    affiliate_signal(url).is_some()
}
