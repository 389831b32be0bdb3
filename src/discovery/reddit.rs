//! Reddit service: subreddit and user feeds with community icons.
//!
//! Reddit serves an Atom feed for every listing at `<listing>/.rss`, so the
//! candidate is built, not guessed. The host of the input is preserved
//! (`old.reddit.com` stays `old.reddit.com`). The icon comes from the
//! listing's `about.json` and is best-effort: a slow or failing lookup only
//! loses the icon, never the feed.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::http_client::HttpFetcher;
use super::utils::{compile_static_regex, decode_html_entities, host_matches_domain, origin_of};
use super::{DiscoveredFeed, DiscoveryContext, DiscoveryError, DiscoveryService, ServicePriority};

const REDDIT_DOMAIN: &str = "reddit.com";

static SUBREDDIT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^/r/([A-Za-z0-9_-]{3,21})(?:/|$)"));

static USER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^/(?:u|user)/([A-Za-z0-9_-]{3,20})(?:/|$)"));

/// The listing a Reddit URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RedditTarget {
    Subreddit(String),
    User(String),
}

impl RedditTarget {
    /// Extracts the listing from a URL path such as `/r/rust/comments/...`.
    pub(crate) fn from_path(path: &str) -> Option<Self> {
        if let Some(caps) = SUBREDDIT_RE.captures(path) {
            return Some(Self::Subreddit(caps[1].to_string()));
        }
        USER_RE
            .captures(path)
            .map(|caps| Self::User(caps[1].to_string()))
    }

    fn listing_path(&self) -> String {
        match self {
            Self::Subreddit(name) => format!("/r/{name}"),
            Self::User(name) => format!("/user/{name}"),
        }
    }

    fn feed_path(&self) -> String {
        format!("{}/.rss", self.listing_path())
    }

    fn about_path(&self) -> String {
        format!("{}/about.json", self.listing_path())
    }
}

#[derive(Debug, Default, Deserialize)]
struct AboutResponse {
    #[serde(default)]
    data: AboutData,
}

#[derive(Debug, Default, Deserialize)]
struct AboutData {
    #[serde(default)]
    community_icon: Option<String>,
    #[serde(default)]
    icon_img: Option<String>,
}

impl AboutData {
    fn icon_url(self) -> Option<String> {
        [self.community_icon, self.icon_img]
            .into_iter()
            .flatten()
            .map(|icon| decode_html_entities(icon.trim()))
            .find(|icon| icon.starts_with("http"))
    }
}

/// Specialized service for `reddit.com` and its subdomains.
#[derive(Debug, Clone)]
pub struct RedditService {
    fetcher: HttpFetcher,
    metadata_timeout: Duration,
    api_base_url: Option<String>,
}

impl RedditService {
    /// Creates the service; `metadata_timeout` bounds the icon lookup.
    #[must_use]
    pub fn new(fetcher: HttpFetcher, metadata_timeout: Duration) -> Self {
        Self {
            fetcher,
            metadata_timeout,
            api_base_url: None,
        }
    }

    /// Sends `about.json` lookups to `base_url` instead of the input's host.
    #[must_use]
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    async fn fetch_icon(&self, about_url: &str) -> Option<String> {
        match self
            .fetcher
            .fetch_json::<AboutResponse>(about_url, self.metadata_timeout)
            .await
        {
            Ok(about) => about.data.icon_url(),
            Err(error) => {
                debug!(error = %error, "Reddit icon lookup failed; continuing without icon");
                None
            }
        }
    }
}

#[async_trait]
impl DiscoveryService for RedditService {
    fn name(&self) -> &'static str {
        "reddit"
    }

    fn priority(&self) -> ServicePriority {
        ServicePriority::Specialized
    }

    fn can_handle(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|host| host_matches_domain(host, REDDIT_DOMAIN)))
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self, ctx), fields(service = "reddit"))]
    async fn discover(
        &self,
        url: &str,
        ctx: &DiscoveryContext,
    ) -> Result<Vec<DiscoveredFeed>, DiscoveryError> {
        let parsed = Url::parse(url).map_err(|e| DiscoveryError::invalid_url(url, e.to_string()))?;
        let Some(target) = RedditTarget::from_path(parsed.path()) else {
            debug!("No subreddit or user in path");
            return Ok(Vec::new());
        };
        let base_url = origin_of(&parsed)
            .ok_or_else(|| DiscoveryError::invalid_url(url, "URL has no host"))?;

        let feed_url = format!("{base_url}{}", target.feed_path());
        let about_url = format!(
            "{}{}",
            self.api_base_url.as_deref().unwrap_or(&base_url),
            target.about_path()
        );
        debug!(feed_url = %feed_url, target = ?target, "Built Reddit feed candidate");

        let (feed, icon) = tokio::join!(ctx.validate_feed(&feed_url), self.fetch_icon(&about_url));
        Ok(feed
            .map(|feed| feed.with_icon_url(icon))
            .into_iter()
            .collect())
    }
}
