//! YouTube service: channel and playlist feeds.
//!
//! YouTube publishes an Atom feed per channel and per playlist under
//! `/feeds/videos.xml`. Channel URLs carry the `UC...` id directly; handle,
//! `/c/` and `/user/` URLs need one page fetch to find it.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;
use url::Url;

use super::http_client::HttpFetcher;
use super::utils::{compile_static_regex, host_matches_domain};
use super::{DiscoveredFeed, DiscoveryContext, DiscoveryError, DiscoveryService, ServicePriority};

const YOUTUBE_DOMAIN: &str = "youtube.com";
const FEED_BASE_URL: &str = "https://www.youtube.com/feeds/videos.xml";

static CHANNEL_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^/channel/(UC[\w-]{22})(?:/|$)"));

static NAMED_CHANNEL_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^/(?:@[\w.-]+|c/[\w.-]+|user/[\w.-]+)(?:/|$)"));

static PLAYLIST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^[\w-]{10,64}$"));

static PAGE_CHANNEL_ID_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile_static_regex(
            r#"(?i)<link\s+rel=["']canonical["']\s+href=["']https?://(?:www\.)?youtube\.com/channel/(UC[\w-]{22})["']"#,
        ),
        compile_static_regex(r#"itemprop=["']channelId["']\s+content=["'](UC[\w-]{22})["']"#),
        compile_static_regex(r#""(?:channelId|externalId)":"(UC[\w-]{22})""#),
    ]
});

/// What a YouTube URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum YouTubeTarget {
    Channel(String),
    Playlist(String),
    /// Handle, `/c/` or `/user/` URL whose channel id lives in the page.
    NamedChannel,
}

impl YouTubeTarget {
    pub(crate) fn from_url(url: &Url) -> Option<Self> {
        let path = url.path();
        if let Some(caps) = CHANNEL_PATH_RE.captures(path) {
            return Some(Self::Channel(caps[1].to_string()));
        }
        if let Some((_, list)) = url.query_pairs().find(|(key, _)| key == "list")
            && PLAYLIST_ID_RE.is_match(&list)
        {
            return Some(Self::Playlist(list.into_owned()));
        }
        NAMED_CHANNEL_PATH_RE
            .is_match(path)
            .then_some(Self::NamedChannel)
    }
}

/// Builds the channel feed URL.
#[must_use]
pub(crate) fn channel_feed_url(channel_id: &str) -> String {
    format!("{FEED_BASE_URL}?channel_id={channel_id}")
}

/// Builds the playlist feed URL.
#[must_use]
pub(crate) fn playlist_feed_url(playlist_id: &str) -> String {
    format!("{FEED_BASE_URL}?playlist_id={playlist_id}")
}

/// Finds the channel id in a channel page.
pub(crate) fn extract_channel_id_from_html(html: &str) -> Option<String> {
    PAGE_CHANNEL_ID_RES
        .iter()
        .find_map(|re| re.captures(html).map(|caps| caps[1].to_string()))
}

/// Specialized service for `youtube.com` channel and playlist URLs.
#[derive(Debug, Clone)]
pub struct YouTubeService {
    fetcher: HttpFetcher,
    html_timeout: Duration,
}

impl YouTubeService {
    /// Creates the service; `html_timeout` bounds the channel page fetch.
    #[must_use]
    pub fn new(fetcher: HttpFetcher, html_timeout: Duration) -> Self {
        Self {
            fetcher,
            html_timeout,
        }
    }

    async fn resolve_named_channel(&self, url: &str) -> Option<String> {
        match self.fetcher.fetch_html(url, self.html_timeout).await {
            Ok(page) => extract_channel_id_from_html(&page.text()),
            Err(error) => {
                debug!(error = %error, "YouTube channel page fetch failed");
                None
            }
        }
    }
}

#[async_trait]
impl DiscoveryService for YouTubeService {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn priority(&self) -> ServicePriority {
        ServicePriority::Specialized
    }

    fn can_handle(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|host| host_matches_domain(host, YOUTUBE_DOMAIN)))
            .unwrap_or(false)
    }

    #[tracing::instrument(skip(self, ctx), fields(service = "youtube"))]
    async fn discover(
        &self,
        url: &str,
        ctx: &DiscoveryContext,
    ) -> Result<Vec<DiscoveredFeed>, DiscoveryError> {
        let parsed = Url::parse(url).map_err(|e| DiscoveryError::invalid_url(url, e.to_string()))?;
        let feed_url = match YouTubeTarget::from_url(&parsed) {
            Some(YouTubeTarget::Channel(id)) => channel_feed_url(&id),
            Some(YouTubeTarget::Playlist(id)) => playlist_feed_url(&id),
            Some(YouTubeTarget::NamedChannel) => match self.resolve_named_channel(url).await {
                Some(id) => channel_feed_url(&id),
                None => return Ok(Vec::new()),
            },
            None => {
                debug!("No channel or playlist in URL");
                return Ok(Vec::new());
            }
        };

        debug!(feed_url = %feed_url, "Built YouTube feed candidate");
        Ok(ctx.validate_feed(&feed_url).await.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;

    const CHANNEL_ID: &str = "UC_x5XG1OV2P6uZZ5FSM9Ttw";

    fn target(url: &str) -> Option<YouTubeTarget> {
        YouTubeTarget::from_url(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_youtube_can_handle() {
        let service = YouTubeService::new(
            HttpFetcher::new(&DiscoveryConfig::default()).unwrap(),
            Duration::from_secs(1),
        );
        assert_eq!(service.name(), "youtube");
        assert!(service.can_handle("https://www.youtube.com/@GoogleDevelopers"));
        assert!(service.can_handle("https://m.youtube.com/channel/x"));
        assert!(!service.can_handle("https://youtu.be.example.com/x"));
        assert!(!service.can_handle("https://example.com/channel/UC"));
    }

    #[test]
    fn test_target_channel_url() {
        assert_eq!(
            target(&format!("https://www.youtube.com/channel/{CHANNEL_ID}/videos")),
            Some(YouTubeTarget::Channel(CHANNEL_ID.into()))
        );
    }

    #[test]
    fn test_target_playlist_url() {
        assert_eq!(
            target("https://www.youtube.com/playlist?list=PL590L5WQmH8fJ54F369BLDSqIwcs-TCfs"),
            Some(YouTubeTarget::Playlist(
                "PL590L5WQmH8fJ54F369BLDSqIwcs-TCfs".into()
            ))
        );
    }

    #[test]
    fn test_target_named_channels_and_unknown() {
        assert_eq!(
            target("https://www.youtube.com/@GoogleDevelopers"),
            Some(YouTubeTarget::NamedChannel)
        );
        assert_eq!(
            target("https://www.youtube.com/c/GoogleDevelopers/videos"),
            Some(YouTubeTarget::NamedChannel)
        );
        assert_eq!(target("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(target("https://www.youtube.com/"), None);
    }

    #[test]
    fn test_feed_urls() {
        assert_eq!(
            channel_feed_url(CHANNEL_ID),
            format!("https://www.youtube.com/feeds/videos.xml?channel_id={CHANNEL_ID}")
        );
        assert_eq!(
            playlist_feed_url("PLabcdefghij"),
            "https://www.youtube.com/feeds/videos.xml?playlist_id=PLabcdefghij"
        );
    }

    #[test]
    fn test_extract_channel_id_from_canonical_link_and_json() {
        let canonical = format!(
            r#"<head><link rel="canonical" href="https://www.youtube.com/channel/{CHANNEL_ID}"></head>"#
        );
        assert_eq!(
            extract_channel_id_from_html(&canonical).as_deref(),
            Some(CHANNEL_ID)
        );

        let embedded = format!(r#"var ytInitialData = {{"externalId":"{CHANNEL_ID}"}};"#);
        assert_eq!(
            extract_channel_id_from_html(&embedded).as_deref(),
            Some(CHANNEL_ID)
        );

        assert_eq!(extract_channel_id_from_html("<html></html>"), None);
    }
}
