//! The one rule for "is this the same feed URL?".
//!
//! Normalization, applied by the validation memo and the registry's final
//! dedup:
//! - scheme and host are lower-cased, default ports are dropped and dot
//!   segments are resolved (all via the `url` parser);
//! - the fragment is dropped;
//! - a trailing `/` on the path is dropped (the root path becomes empty);
//! - the query string is kept verbatim, except that an empty `?` is dropped.
//!   Feeds such as `/?feed=rss2` or `feeds/videos.xml?channel_id=...` are
//!   only distinguishable by their query;
//! - `http` and `https` stay distinct, as do `www.` and bare hosts.
//!
//! Input that does not parse as an absolute URL is returned trimmed.

use url::Url;

/// Returns the normalized form of `raw` used as the dedup key.
#[must_use]
pub fn normalize_feed_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    let Some(host) = url.host_str() else {
        return trimmed.to_string();
    };

    let mut normalized = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }
    normalized.push_str(url.path().trim_end_matches('/'));
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        normalized.push('?');
        normalized.push_str(query);
    }
    normalized
}
