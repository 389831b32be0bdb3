//! Feed discovery pipeline: from an arbitrary URL to validated feeds.
//!
//! This module provides an extensible service system that proposes candidate
//! feed URLs for an input URL, validates them, and returns the confirmed feeds
//! through a priority-ordered registry with early exit.
//!
//! # Architecture
//!
//! - [`DiscoveryService`] - Async trait that individual strategies implement
//! - [`DiscoveryRegistry`] - Priority-ordered collection of services with the discovery loop
//! - [`DiscoveryContext`] - Per-call validation memo shared by all services
//! - [`FeedValidator`] / [`HttpFeedValidator`] - Fetch-and-parse confirmation of a candidate
//! - [`RedditService`] - Subreddit and user feeds (with community icons)
//! - [`ApplePodcastsService`] - Podcast directory pages resolved via the iTunes lookup API
//! - [`YouTubeService`] - Channel and playlist feeds
//! - [`StandardService`] - Universal fallback (extensions, common paths, HTML `<link>` tags)
//!
//! # Example
//!
//! ```no_run
//! use feedscout_core::config::DiscoveryConfig;
//! use feedscout_core::discovery::build_default_registry;
//! use feedscout_core::telemetry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = build_default_registry(&DiscoveryConfig::default(), telemetry::noop())?;
//! let feeds = registry.discover("https://www.reddit.com/r/rust").await?;
//! for feed in feeds {
//!     println!("{} -> {}", feed.title, feed.url);
//! }
//! # Ok(())
//! # }
//! ```

mod apple_podcasts;
mod context;
mod error;
mod html;
mod http_client;
mod normalize;
mod reddit;
mod registry;
mod standard;
mod utils;
mod validator;
mod youtube;

pub use apple_podcasts::ApplePodcastsService;
pub use context::DiscoveryContext;
pub use error::DiscoveryError;
pub use html::extract_feed_links;
pub use http_client::{FetchedBody, HttpFetcher};
pub use normalize::normalize_feed_url;
pub use reddit::RedditService;
pub use registry::DiscoveryRegistry;
pub use standard::StandardService;
pub use validator::{FeedValidator, HttpFeedValidator, parse_feed_bytes};
pub use youtube::YouTubeService;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::DiscoveryConfig;
use crate::telemetry::SharedTelemetry;

/// Builds the default discovery registry.
///
/// Order is deterministic: site-specific services run before the standard
/// fallback. All services share one HTTP client and one validator.
///
/// # Errors
///
/// Returns [`DiscoveryError::ClientBuild`] when the HTTP client cannot be
/// constructed.
pub fn build_default_registry(
    config: &DiscoveryConfig,
    telemetry: SharedTelemetry,
) -> Result<DiscoveryRegistry, DiscoveryError> {
    let fetcher = HttpFetcher::new(config)?;
    let validator: Arc<dyn FeedValidator> =
        Arc::new(HttpFeedValidator::new(fetcher.clone(), config.validate_timeout()));

    let mut registry = DiscoveryRegistry::new(validator).with_telemetry(telemetry);
    registry.register(Box::new(RedditService::new(
        fetcher.clone(),
        config.metadata_timeout(),
    )));
    registry.register(Box::new(ApplePodcastsService::new(
        fetcher.clone(),
        config.metadata_timeout(),
    )));
    registry.register(Box::new(YouTubeService::new(
        fetcher.clone(),
        config.html_timeout(),
    )));
    registry.register(Box::new(StandardService::new(fetcher, config.html_timeout())));
    Ok(registry)
}

/// Priority level for service ordering.
///
/// Services are tried in priority order: Specialized first, then General, then
/// Fallback. Within the same level, registration order is preserved.
///
/// Derives `Ord` so that `Specialized < General < Fallback` for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServicePriority {
    /// Site-specific services (e.g., Reddit, Apple Podcasts)
    Specialized = 0,
    /// Heuristic services that are narrower than the fallback
    General = 1,
    /// Universal fallback: always applicable, runs last
    Fallback = 2,
}

/// Syndication format of a validated feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedType {
    /// RSS 0.9x, RSS 1.0 (RDF) or RSS 2.0
    Rss,
    /// Atom 1.0
    Atom,
    /// JSON Feed
    Json,
}

impl std::fmt::Display for FeedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Rss => "rss",
            Self::Atom => "atom",
            Self::Json => "json",
        })
    }
}

/// A confirmed feed. Produced by validation; services only add an icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredFeed {
    /// URL of the feed document.
    pub url: String,
    /// Feed title.
    pub title: String,
    /// Feed description, if the document has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Syndication format.
    #[serde(rename = "type")]
    pub feed_type: FeedType,
    /// Icon supplied by a domain-specific service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl DiscoveredFeed {
    /// Creates a feed without description or icon.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>, feed_type: FeedType) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: None,
            feed_type,
            icon_url: None,
        }
    }

    /// Returns a copy with `icon_url` set, unless `icon_url` is `None`.
    #[must_use]
    pub fn with_icon_url(mut self, icon_url: Option<String>) -> Self {
        if icon_url.is_some() {
            self.icon_url = icon_url;
        }
        self
    }

    /// Dedup key of this feed.
    #[must_use]
    pub fn normalized_url(&self) -> String {
        normalize_feed_url(&self.url)
    }
}

/// Trait that all discovery services implement.
///
/// A service proposes candidate URLs for an input and confirms them through
/// [`DiscoveryContext::validate_feed`], never by validating directly, so the
/// per-call memo sees every probe.
///
/// # Object Safety
///
/// Uses `async_trait` so the registry can hold `Box<dyn DiscoveryService>`.
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// Returns the service's name (e.g., "reddit", "standard").
    fn name(&self) -> &str;

    /// Returns the service's priority level.
    fn priority(&self) -> ServicePriority;

    /// Returns true if this service can meaningfully handle `url`.
    fn can_handle(&self, url: &str) -> bool;

    /// Proposes and validates candidates for `url`.
    ///
    /// Probe failures must be absorbed (empty result); `Err` is reserved for
    /// failures the registry should report.
    async fn discover(
        &self,
        url: &str,
        ctx: &DiscoveryContext,
    ) -> Result<Vec<DiscoveredFeed>, DiscoveryError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_priority_ordering() {
        assert!(ServicePriority::Specialized < ServicePriority::General);
        assert!(ServicePriority::General < ServicePriority::Fallback);
    }

    #[test]
    fn test_discovered_feed_serializes_with_public_field_names() {
        let feed = DiscoveredFeed::new("https://example.com/rss", "Example", FeedType::Rss)
            .with_icon_url(Some("https://example.com/icon.png".into()));
        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json["type"], "rss");
        assert_eq!(json["iconUrl"], "https://example.com/icon.png");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_with_icon_url_none_keeps_existing_icon() {
        let feed = DiscoveredFeed::new("https://example.com/rss", "Example", FeedType::Atom)
            .with_icon_url(Some("a.png".into()))
            .with_icon_url(None);
        assert_eq!(feed.icon_url.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_normalized_url_matches_free_function() {
        let feed = DiscoveredFeed::new("HTTPS://Example.com/rss/", "x", FeedType::Rss);
        assert_eq!(feed.normalized_url(), "https://example.com/rss");
    }

    #[test]
    fn test_build_default_registry_orders_fallback_last() {
        let registry =
            build_default_registry(&DiscoveryConfig::default(), crate::telemetry::noop()).unwrap();
        assert_eq!(registry.service_count(), 4);
        let handlers = registry.find_handlers("https://example.com/blog");
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].name(), "standard");

        let handlers = registry.find_handlers("https://www.reddit.com/r/rust");
        let names: Vec<&str> = handlers.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["reddit", "standard"]);
    }
}
