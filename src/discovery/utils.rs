//! Shared helpers for discovery services: static regexes, host matching and
//! light sanitizing of untrusted text.

use regex::Regex;
use url::Url;

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Normalizes a host string: trim, strip trailing '.', lowercase.
#[must_use]
pub fn canonical_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// True if `host` is `domain` itself or any subdomain of it.
///
/// `old.reddit.com` matches `reddit.com`; `notreddit.com` does not.
#[must_use]
pub fn host_matches_domain(host: &str, domain: &str) -> bool {
    let host = canonical_host(host);
    let domain = canonical_host(domain);
    host == domain
        || host
            .strip_suffix(domain.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// `scheme://host[:port]` of `url`; the port only when it is not the
/// scheme's default. `None` for URLs without a host.
#[must_use]
pub fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

/// The `scheme` of a `scheme:rest` string (RFC 3986 scheme characters).
///
/// `host:port` input such as `localhost:8080/feed` is not a scheme: a digit
/// right after the colon reads as a port.
#[must_use]
pub fn leading_scheme(value: &str) -> Option<&str> {
    let (scheme, rest) = value.split_once(':')?;
    let mut chars = scheme.chars();
    let is_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let is_port = rest.starts_with(|c: char| c.is_ascii_digit());
    (is_scheme && !is_port).then_some(scheme)
}

/// Decodes the handful of HTML entities that show up inside attribute values
/// and JSON-embedded URLs (`&amp;`, `&quot;`, `&#39;`, `&lt;`, `&gt;`).
#[must_use]
pub fn decode_html_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Removes control characters (including newlines) and trims whitespace.
///
/// Feed titles and descriptions are attacker controlled; callers typically
/// print them to a terminal or embed them in another document.
#[must_use]
pub fn sanitize_text(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
