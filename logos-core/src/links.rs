//! URL helpers for link discovery and id routing.

use url::Url;

use crate::error::{CoreError, Result};

/// Resolve `href` against `base`, keeping only http(s) results.
#[must_use]
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let url = base.join(href.trim()).ok()?;
    is_web_url(&url).then_some(url)
}

/// Parse an absolute http(s) URL.
#[must_use]
pub fn parse_web_url(value: &str) -> Option<Url> {
    let url = Url::parse(value.trim()).ok()?;
    is_web_url(&url).then_some(url)
}

/// Parse a provider's configured site root.
///
/// # Errors
///
/// Returns [`CoreError::ConfigInvalid`] unless `value` is an absolute http(s) URL.
pub fn site_base_url(provider: &str, value: &str) -> Result<Url> {
    parse_web_url(value).ok_or_else(|| CoreError::ConfigInvalid {
        message: format!("providers.{provider}.base_url is not an http(s) URL: {value}"),
    })
}

fn is_web_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}

/// Whether `url`'s host is `domain` or one of its subdomains.
#[must_use]
pub fn host_matches(url: &Url, domain: &str) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    let domain = domain.to_ascii_lowercase();
    host == domain
        || host
            .strip_suffix(&domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Cheap, I/O-free check that `id` is a URL on `domain` (or a subdomain).
#[must_use]
pub fn id_on_domain(id: &str, domain: &str) -> bool {
    Url::parse(id.trim()).is_ok_and(|url| host_matches(&url, domain))
}

/// Decode the destination embedded in a search engine redirect link
/// (e.g. `https://duckduckgo.com/l/?kh=1&uddg=<percent-encoded URL>`).
///
/// Best effort: any link carrying `param` qualifies, and the decoded value is
/// kept only if it is itself an absolute http(s) URL.
#[must_use]
pub fn unwrap_redirect(url: &Url, param: &str) -> Option<Url> {
    url.query_pairs()
        .find(|(key, _)| key == param)
        .and_then(|(_, value)| parse_web_url(&value))
}

/// Percent-decoded path segments with one trailing empty segment (the trailing
/// slash) removed. `None` if any other segment is empty (e.g. `//`).
#[must_use]
pub fn path_segments(url: &Url) -> Option<Vec<String>> {
    let mut segments: Vec<&str> = url.path_segments()?.collect();
    if segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(
        segments
            .into_iter()
            .map(|s| {
                urlencoding::decode(s).map_or_else(|_| s.to_string(), std::borrow::Cow::into_owned)
            })
            .collect(),
    )
}

/// Strip `suffix` from the end of `value`, ignoring ASCII case.
#[must_use]
pub fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}
