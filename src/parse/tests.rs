// Parse module tests.

use super::*;

fn urls(links: &[ExtractedLink]) -> Vec<&str> {
    links.iter().map(|l| l.url.as_str()).collect()
}

#[test]
fn test_extract_links_excludes_asset_domain() {
    let html = r#"<html><body>
        <a href="https://assetdomain.com/page">Home</a>
        <a href="https://blog.assetdomain.com/post">Blog</a>
        <a href="https://www.assetdomain.com/">Root</a>
        <a href="https://tracker.example.com/go?btag=1">Bonus</a>
    </body></html>"#;
    let links = extract_links(html, "assetdomain.com");
    assert_eq!(urls(&links), vec!["https://tracker.example.com/go?btag=1"]);
    assert_eq!(links[0].domain, "tracker.example.com");
    assert_eq!(links[0].anchor, "Bonus");
}

#[test]
fn test_extract_links_keeps_lookalike_domains() {
    // Only the domain itself or a dot-suffixed subdomain counts as the asset.
    let html = r#"<html><body>
        <a href="https://assetdomain.com/page">Home</a>
        <a href="https://partner-assetdomain.com/page">Partner</a>
        <a href="https://tracker.example.com/go?btag=1">Bonus</a>
    </body></html>"#;
    let links = extract_links(html, "assetdomain.com");
    assert_eq!(
        urls(&links),
        vec![
            "https://partner-assetdomain.com/page",
            "https://tracker.example.com/go?btag=1"
        ]
    );
}

#[test]
fn test_extract_links_skips_non_navigational_hrefs() {
    let html = r##"<html><body>
        <a href="mailto:team@site.com">Mail</a>
        <a href="javascript:void(0)">JS</a>
        <a href="#top">Top</a>
        <a href="/reviews/acme">Relative</a>
        <a href="reviews/acme">Relative too</a>
        <a href="tel:+123">Call</a>
        <a>No href</a>
    </body></html>"##;
    assert!(extract_links(html, "site.com").is_empty());
}

#[test]
fn test_extract_links_resolves_protocol_relative() {
    let html = r#"<a href="//cdn.partner.com/offer?ref=2">Offer</a>"#;
    let links = extract_links(html, "site.com");
    assert_eq!(urls(&links), vec!["https://cdn.partner.com/offer?ref=2"]);
    assert_eq!(links[0].domain, "cdn.partner.com");
}

#[test]
fn test_extract_links_drops_malformed_hrefs() {
    let html = r#"
        <a href="https://exa mple.com/x">Broken</a>
        <a href="http://">Empty host</a>
        <a href="https://ok.partner.com/go">Fine</a>
    "#;
    let links = extract_links(html, "site.com");
    assert_eq!(urls(&links), vec!["https://ok.partner.com/go"]);
}

#[test]
fn test_extract_links_dedupes_keeping_first_anchor() {
    let html = r#"
        <a href="https://aff.acme.com/go?btag=5">Play</a>
        <a href="https://other.com/">Other</a>
        <a href="https://aff.acme.com/go?btag=5">Play again</a>
    "#;
    let links = extract_links(html, "site.com");
    assert_eq!(
        urls(&links),
        vec!["https://aff.acme.com/go?btag=5", "https://other.com/"]
    );
    assert_eq!(links[0].anchor, "Play");
}

#[test]
fn test_extract_links_strips_nested_markup_from_anchor() {
    let html = r#"<a href="https://aff.acme.com/go">
        <img src="logo.png"><span>Claim</span>   <b>100%</b>
        bonus
    </a>"#;
    let links = extract_links(html, "site.com");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].anchor, "Claim 100% bonus");
}

#[test]
fn test_extract_links_uppercase_scheme_is_accepted() {
    let html = r#"<a href="HTTPS://Partner.com/Go">Go</a>"#;
    let links = extract_links(html, "site.com");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].domain, "partner.com");
}

#[test]
fn test_is_likely_affiliate_link_fixtures() {
    assert!(is_likely_affiliate_link("https://track.brandx.com/go?btag=123"));
    assert!(!is_likely_affiliate_link("https://assetdomain.com/about"));
}

#[test]
fn test_affiliate_heuristics_each_trigger() {
    let cases = [
        ("https://click.casino.com/landing", "tracking subdomain"),
        ("https://AFF.acme.com/", "tracking subdomain"),
        ("https://partners.book.io/x", "tracking subdomain"),
        ("https://acme.com/landing?btag=a_1", "btag parameter"),
        ("https://acme.com/landing?x=1&clickid=abc", "click id parameter"),
        ("https://acme.com/?utm_source=site", "utm parameter"),
        ("https://acme.com/?ref=9", "ref parameter"),
        ("https://acme.com/signup?pid=42", "pid parameter"),
        ("https://acme.com/offer", "offer path"),
        ("https://acme.com/en/promo/welcome", "offer path"),
        ("https://acme.com/Affiliate?x", "offer path"),
    ];
    for (url, expected) in cases {
        assert_eq!(affiliate_signal(url), Some(expected), "url: {url}");
    }
}

#[test]
fn test_affiliate_heuristics_order_prefers_subdomain() {
    // Matches both the subdomain and the btag heuristic; the first one listed wins.
    assert_eq!(
        affiliate_signal("https://track.brandx.com/go?btag=123"),
        Some("tracking subdomain")
    );
}

#[test]
fn test_affiliate_heuristics_ignore_plain_links() {
    for url in [
        "https://example.com/",
        "https://news.example.com/article/offering-details",
        "https://example.com/?q=search",
        "https://example.com/preference?theme=dark",
        "https://goodreads.com/book",
    ] {
        assert!(!is_likely_affiliate_link(url), "url: {url}");
    }
}
