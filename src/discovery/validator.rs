//! Candidate validation: fetch a URL and confirm it parses as a feed.

use std::time::Duration;

use async_trait::async_trait;
use feed_rs::model::FeedType as ParsedFeedType;
use tracing::debug;
use url::Url;

use super::http_client::{FEED_ACCEPT, HttpFetcher};
use super::utils::sanitize_text;
use super::{DiscoveredFeed, DiscoveryError, FeedType};

const UNTITLED_FEED: &str = "Untitled Feed";

/// Confirms whether a candidate URL serves a feed.
///
/// Implementations are best-effort probes: any failure is `None`, never an
/// error. [`DiscoveryContext`](super::DiscoveryContext) memoizes results per
/// normalized URL, so an implementation sees each URL at most once per
/// discovery call.
#[async_trait]
pub trait FeedValidator: Send + Sync {
    async fn validate(&self, url: &str) -> Option<DiscoveredFeed>;
}

/// Validator that fetches over HTTP and parses with `feed-rs`.
#[derive(Debug, Clone)]
pub struct HttpFeedValidator {
    fetcher: HttpFetcher,
    timeout: Duration,
}

impl HttpFeedValidator {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }
}

#[async_trait]
impl FeedValidator for HttpFeedValidator {
    #[tracing::instrument(skip(self), fields(timeout_ms = self.timeout.as_millis()))]
    async fn validate(&self, url: &str) -> Option<DiscoveredFeed> {
        let body = match self.fetcher.fetch(url, self.timeout, FEED_ACCEPT).await {
            Ok(body) => body,
            Err(error) => {
                debug!(error = %error, "Candidate fetch failed");
                return None;
            }
        };

        if body.final_url != url {
            debug!(final_url = %body.final_url, "Candidate redirected");
        }
        match parse_feed_bytes(&body.bytes, url) {
            Ok(feed) => {
                debug!(feed_type = %feed.feed_type, title = %feed.title, "Candidate is a feed");
                Some(feed)
            }
            Err(error) => {
                debug!(
                    error = %error,
                    content_type = body.content_type.as_deref().unwrap_or("none"),
                    "Candidate is not a feed"
                );
                None
            }
        }
    }
}

/// Parses `bytes` as RSS, Atom, RDF or JSON Feed and extracts metadata.
///
/// The returned feed's `url` is `feed_url` as given (the candidate, not the
/// post-redirect URL), so memo keys and results agree.
///
/// # Errors
///
/// Returns [`DiscoveryError::NotAFeed`] when the body is not a recognized feed.
pub fn parse_feed_bytes(bytes: &[u8], feed_url: &str) -> Result<DiscoveredFeed, DiscoveryError> {
    let parsed = feed_rs::parser::parse(bytes)
        .map_err(|e| DiscoveryError::not_a_feed(feed_url, e.to_string()))?;

    let feed_type = match parsed.feed_type {
        ParsedFeedType::Atom => FeedType::Atom,
        ParsedFeedType::JSON => FeedType::Json,
        ParsedFeedType::RSS0 | ParsedFeedType::RSS1 | ParsedFeedType::RSS2 => FeedType::Rss,
    };

    let title = parsed
        .title
        .map(|t| sanitize_text(&t.content))
        .filter(|t| !t.is_empty())
        .or_else(|| {
            Url::parse(feed_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
        })
        .unwrap_or_else(|| UNTITLED_FEED.to_string());

    let description = parsed
        .description
        .map(|d| sanitize_text(&d.content))
        .filter(|d| !d.is_empty());

    Ok(DiscoveredFeed {
        url: feed_url.to_string(),
        title,
        description,
        feed_type,
        icon_url: None,
    })
}
