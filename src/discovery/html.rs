//! `<link>` tag scanning for feed autodiscovery.
//!
//! This is a regex scan, not an HTML parse: one regex finds `<link ...>`
//! tags, a second pulls the `href` out of tags whose `type` names a feed
//! format. Tags split by comments or script bodies are not understood; tags
//! spanning several lines are.

use std::sync::LazyLock;

use regex::Regex;

use super::utils::{compile_static_regex, decode_html_entities, leading_scheme};

static LINK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<link\b[^>]*>"));

static FEED_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"(?i)\stype\s*=\s*["']?\s*application/(?:rss\+xml|atom\+xml|feed\+json)\b"#,
    )
});

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?i)\shref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
});

/// Returns the feed URLs advertised by `<link type="application/...">` tags
/// in `html`, resolved against `base_url` (`scheme://host[:port]`), in
/// document order and without repeats.
///
/// Resolution: `http(s)://` hrefs pass through, `//host/path` takes the
/// scheme of `base_url`, `/path` is prefixed with `base_url`, and anything
/// else is taken relative to the host root. Hrefs with other schemes
/// (`javascript:`, `mailto:`, `feed:` ...) are dropped.
#[must_use]
pub fn extract_feed_links(html: &str, base_url: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for tag in LINK_TAG_RE.find_iter(html) {
        let tag = tag.as_str();
        if !FEED_TYPE_RE.is_match(tag) {
            continue;
        }
        let Some(href) = extract_href(tag) else {
            continue;
        };
        if let Some(resolved) = resolve_href(&href, base_url)
            && !links.contains(&resolved)
        {
            links.push(resolved);
        }
    }
    links
}

fn extract_href(tag: &str) -> Option<String> {
    let caps = HREF_RE.captures(tag)?;
    let raw = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    let href = decode_html_entities(raw.as_str().trim());
    (!href.is_empty()).then_some(href)
}

fn resolve_href(href: &str, base_url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    let lower = href.to_ascii_lowercase();

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(href.to_string());
    }
    if href.starts_with("//") {
        let scheme = base.split("://").next().unwrap_or("https");
        return Some(format!("{scheme}:{href}"));
    }
    if href.starts_with('/') {
        return Some(format!("{base}{href}"));
    }
    if leading_scheme(href).is_some() {
        return None;
    }
    Some(format!("{base}/{}", href.trim_start_matches("./")))
}
