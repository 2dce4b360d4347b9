//! Domain normalization utilities.
//!
//! Every comparison between a link, a brand domain, a tracking domain and an
//! asset domain goes through [`normalize_domain`], so that `https://www.Acme.com/`
//! and `acme.com` compare equal.
//!
//! Key functions:
//! - `normalize_domain()` - Canonical, comparable form of a domain or URL prefix
//! - `domain_matches()` - Same-site test (equality or dot-suffix)
//! - `url_domain()` - Normalized host of an absolute URL

/// Normalizes a domain (or a URL prefix) into a comparable form.
///
/// Trims whitespace, lowercases, strips a leading `http://`/`https://`, a leading
/// `www.` and trailing slashes. Never fails: malformed input normalizes to itself
/// minus the stripped parts. The stripping is repeated until nothing changes, so
/// `normalize_domain(normalize_domain(x)) == normalize_domain(x)`.
pub fn normalize_domain(input: &str) -> String {
    let mut current = input.trim().to_lowercase();
    loop {
        let mut next = current.as_str().trim();
        for scheme in ["https://", "http://"] {
            if let Some(rest) = next.strip_prefix(scheme) {
                next = rest;
            }
        }
        if let Some(rest) = next.strip_prefix("www.") {
            next = rest;
        }
        let next = next.trim_end_matches('/').trim();
        if next == current {
            return current;
        }
        current = next.to_string();
    }
}

/// Returns `true` when `candidate` belongs to the site `registered`.
///
/// Both arguments are normalized first. A match is either equality or
/// `candidate` being a dot-suffix of `registered` (`aff.acme.com` matches
/// `acme.com`, `notacme.com` does not). An empty `registered` never matches.
pub fn domain_matches(candidate: &str, registered: &str) -> bool {
    let candidate = normalize_domain(candidate);
    let registered = normalize_domain(registered);
    if registered.is_empty() || candidate.is_empty() {
        return false;
    }
    candidate == registered
        || candidate
            .strip_suffix(registered.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Normalized host of an absolute URL, or `None` when it cannot be parsed.
pub fn url_domain(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    parsed.host_str().map(normalize_domain)
}

/// Domain recorded for a deal's affiliate link.
///
/// Falls back to normalizing the raw string when the link is not a parseable URL,
/// so a malformed stored link still yields something comparable.
pub fn link_domain(link: &str) -> String {
    url_domain(link).unwrap_or_else(|| {
        let normalized = normalize_domain(link);
        normalized
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default()
            .to_string()
    })
}
