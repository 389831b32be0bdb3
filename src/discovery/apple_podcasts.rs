//! Apple Podcasts service for routing show pages to their RSS feeds.
//!
//! Show pages (`podcasts.apple.com/<cc>/podcast/<slug>/id<digits>`) do not
//! link the feed. The public iTunes lookup API maps the numeric id to the
//! show's `feedUrl` and artwork, which becomes the icon.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::http_client::HttpFetcher;
use super::utils::{compile_static_regex, host_matches_domain};
use super::{DiscoveredFeed, DiscoveryContext, DiscoveryError, DiscoveryService, ServicePriority};

const DEFAULT_LOOKUP_BASE_URL: &str = "https://itunes.apple.com";
const DIRECTORY_HOSTS: [&str; 2] = ["podcasts.apple.com", "itunes.apple.com"];

static PODCAST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?:^|/)id(\d{1,15})(?:/|$)"));

#[derive(Debug, Default, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResult {
    #[serde(default)]
    feed_url: Option<String>,
    #[serde(default)]
    artwork_url600: Option<String>,
    #[serde(default)]
    artwork_url100: Option<String>,
}

/// Specialized service for Apple Podcasts show pages.
#[derive(Debug, Clone)]
pub struct ApplePodcastsService {
    fetcher: HttpFetcher,
    metadata_timeout: Duration,
    lookup_base_url: String,
}

impl ApplePodcastsService {
    /// Creates the service against the public lookup API.
    #[must_use]
    pub fn new(fetcher: HttpFetcher, metadata_timeout: Duration) -> Self {
        Self::with_lookup_base_url(fetcher, metadata_timeout, DEFAULT_LOOKUP_BASE_URL)
    }

    /// Creates the service with a custom lookup endpoint for tests.
    #[must_use]
    pub fn with_lookup_base_url(
        fetcher: HttpFetcher,
        metadata_timeout: Duration,
        lookup_base_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            metadata_timeout,
            lookup_base_url: lookup_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Extracts the numeric show id from a directory URL path.
pub(crate) fn extract_podcast_id(path: &str) -> Option<String> {
    PODCAST_ID_RE
        .captures(path)
        .map(|caps| caps[1].to_string())
}

#[async_trait]
impl DiscoveryService for ApplePodcastsService {
    fn name(&self) -> &'static str {
        "apple-podcasts"
    }

    fn priority(&self) -> ServicePriority {
        ServicePriority::Specialized
    }

    fn can_handle(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        parsed.host_str().is_some_and(|host| {
            DIRECTORY_HOSTS
                .iter()
                .any(|domain| host_matches_domain(host, domain))
        })
    }

    #[tracing::instrument(skip(self, ctx), fields(service = "apple-podcasts"))]
    async fn discover(
        &self,
        url: &str,
        ctx: &DiscoveryContext,
    ) -> Result<Vec<DiscoveredFeed>, DiscoveryError> {
        let parsed = Url::parse(url).map_err(|e| DiscoveryError::invalid_url(url, e.to_string()))?;
        let Some(podcast_id) = extract_podcast_id(parsed.path()) else {
            debug!("No podcast id in path");
            return Ok(Vec::new());
        };

        let lookup_url = format!("{}/lookup?id={podcast_id}&entity=podcast", self.lookup_base_url);
        let lookup = match self
            .fetcher
            .fetch_json::<LookupResponse>(&lookup_url, self.metadata_timeout)
            .await
        {
            Ok(lookup) => lookup,
            Err(error) => {
                debug!(error = %error, "Podcast lookup failed");
                return Ok(Vec::new());
            }
        };

        let Some(show) = lookup.results.into_iter().find(|r| r.feed_url.is_some()) else {
            debug!(podcast_id = %podcast_id, "Lookup returned no feed URL");
            return Ok(Vec::new());
        };
        let icon_url = show.artwork_url600.or(show.artwork_url100);
        let Some(feed_url) = show.feed_url else {
            return Ok(Vec::new());
        };

        debug!(feed_url = %feed_url, "Podcast directory resolved feed");
        Ok(ctx
            .validate_feed(&feed_url)
            .await
            .map(|feed| feed.with_icon_url(icon_url))
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;

    fn service() -> ApplePodcastsService {
        ApplePodcastsService::new(
            HttpFetcher::new(&DiscoveryConfig::default()).unwrap(),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn test_apple_podcasts_name_and_priority() {
        let service = service();
        assert_eq!(service.name(), "apple-podcasts");
        assert_eq!(service.priority(), ServicePriority::Specialized);
    }

    #[test]
    fn test_apple_podcasts_can_handle_directory_hosts() {
        let service = service();
        assert!(service.can_handle("https://podcasts.apple.com/us/podcast/the-daily/id1200361736"));
        assert!(service.can_handle("https://itunes.apple.com/us/podcast/id1200361736?mt=2"));
        assert!(!service.can_handle("https://apple.com/podcasts"));
        assert!(!service.can_handle("https://example.com/id1200361736"));
    }

    #[test]
    fn test_extract_podcast_id() {
        assert_eq!(
            extract_podcast_id("/us/podcast/the-daily/id1200361736").as_deref(),
            Some("1200361736")
        );
        assert_eq!(extract_podcast_id("/podcast/id42/").as_deref(), Some("42"));
        assert_eq!(extract_podcast_id("/us/podcast/the-daily"), None);
        assert_eq!(extract_podcast_id("/us/podcast/idea-show"), None);
    }

    #[test]
    fn test_lookup_result_deserializes_camel_case() {
        let json = r#"{"resultCount":1,"results":[{"feedUrl":"https://feeds.example.com/show.xml","artworkUrl600":"https://img.example.com/600.jpg","collectionName":"Show"}]}"#;
        let lookup: LookupResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            lookup.results[0].feed_url.as_deref(),
            Some("https://feeds.example.com/show.xml")
        );
        assert_eq!(
            lookup.results[0].artwork_url600.as_deref(),
            Some("https://img.example.com/600.jpg")
        );
    }
}
