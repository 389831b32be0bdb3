//! Standard discovery service - the universal fallback.
//!
//! [`StandardService`] handles any URL by guessing: the input itself, the
//! input path with feed extensions appended, a list of well-known feed paths
//! (at the host root and below the input path), and finally the feeds the
//! page advertises through `<link>` tags. Each probe group validates its
//! candidates concurrently, and the groups themselves run concurrently.
//! A failing group contributes nothing; it never aborts the others.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::telemetry::Breadcrumb;

use super::html::extract_feed_links;
use super::http_client::HttpFetcher;
use super::utils::origin_of;
use super::{DiscoveredFeed, DiscoveryContext, DiscoveryError, DiscoveryService, ServicePriority};

/// Extensions appended to the input path by the extension probe.
const FEED_EXTENSIONS: [&str; 3] = [".rss", ".atom", ".xml"];

/// Well-known feed locations relative to the host root.
const COMMON_FEED_PATHS: [&str; 16] = [
    "/feed",
    "/rss",
    "/atom",
    "/feed.xml",
    "/rss.xml",
    "/atom.xml",
    "/index.xml",
    "/feed.json",
    "/index.rss",
    "/feed/atom",
    "/feed/rss",
    "/rss/index.xml",
    "/feeds/posts/default",
    "/blog/feed",
    "/blog/rss",
    "/?feed=rss2",
];

/// Well-known feed locations relative to the input path.
const RELATIVE_FEED_PATHS: [&str; 6] =
    ["feed", "rss", "atom.xml", "rss.xml", "feed.xml", "index.xml"];

/// Universal fallback service. `can_handle` is always true.
#[derive(Debug, Clone)]
pub struct StandardService {
    fetcher: HttpFetcher,
    html_timeout: Duration,
}

impl StandardService {
    /// Creates the service; `html_timeout` bounds the page fetch of the
    /// `<link>` probe.
    #[must_use]
    pub fn new(fetcher: HttpFetcher, html_timeout: Duration) -> Self {
        Self {
            fetcher,
            html_timeout,
        }
    }

    async fn probe_html_links(
        &self,
        url: &str,
        base_url: &str,
        ctx: &DiscoveryContext,
    ) -> Vec<DiscoveredFeed> {
        let page = match self.fetcher.fetch_html(url, self.html_timeout).await {
            Ok(page) => page,
            Err(error) => {
                debug!(error = %error, "HTML link probe skipped");
                return Vec::new();
            }
        };
        let links = extract_feed_links(&page.text(), base_url);
        debug!(count = links.len(), "Feed links advertised by page");
        ctx.validate_all(links).await
    }
}

#[async_trait]
impl DiscoveryService for StandardService {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn priority(&self) -> ServicePriority {
        ServicePriority::Fallback
    }

    fn can_handle(&self, _url: &str) -> bool {
        true
    }

    #[tracing::instrument(skip(self, ctx), fields(service = "standard"))]
    async fn discover(
        &self,
        url: &str,
        ctx: &DiscoveryContext,
    ) -> Result<Vec<DiscoveredFeed>, DiscoveryError> {
        let parts = InputParts::parse(url)?;

        let direct_and_extensions = async {
            let (direct, extensions) = tokio::join!(
                ctx.validate_feed(url),
                ctx.validate_all(parts.extension_candidates())
            );
            direct.into_iter().chain(extensions).collect::<Vec<_>>()
        };
        let common = ctx.validate_all(parts.common_path_candidates());
        let relative = ctx.validate_all(parts.relative_path_candidates());
        let advertised = self.probe_html_links(url, &parts.base_url, ctx);

        let (direct_and_extensions, common, relative, advertised) =
            tokio::join!(direct_and_extensions, common, relative, advertised);

        let mut feeds = direct_and_extensions;
        feeds.extend(common);
        feeds.extend(relative);
        feeds.extend(advertised);

        ctx.telemetry().breadcrumb(
            Breadcrumb::new("discovery.standard", "standard probes finished")
                .with("url", url)
                .with("found", feeds.len().to_string()),
        );
        if !feeds.is_empty() {
            info!(count = feeds.len(), "Standard probes found feeds");
        }
        Ok(feeds)
    }
}

/// Pieces of the input URL the probes build candidates from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InputParts {
    /// `scheme://host[:port]`
    base_url: String,
    /// Path as given, e.g. `/blog` or `/blog/`.
    original_path: String,
    /// Path forced to end with `/`, e.g. `/blog/`.
    input_pathname: String,
}

impl InputParts {
    fn parse(url: &str) -> Result<Self, DiscoveryError> {
        let parsed = Url::parse(url).map_err(|e| DiscoveryError::invalid_url(url, e.to_string()))?;
        let base_url =
            origin_of(&parsed).ok_or_else(|| DiscoveryError::invalid_url(url, "URL has no host"))?;

        let original_path = parsed.path().to_string();
        let input_pathname = if original_path.ends_with('/') {
            original_path.clone()
        } else {
            format!("{original_path}/")
        };

        Ok(Self {
            base_url,
            original_path,
            input_pathname,
        })
    }

    /// `<path>.rss`, `<path>.atom`, `<path>.xml`; none for the root path or
    /// when the path already carries a feed extension.
    fn extension_candidates(&self) -> Vec<String> {
        let path = self.original_path.trim_end_matches('/');
        let lower = path.to_ascii_lowercase();
        if path.is_empty() || FEED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Vec::new();
        }
        FEED_EXTENSIONS
            .iter()
            .map(|ext| format!("{}{path}{ext}", self.base_url))
            .collect()
    }

    fn common_path_candidates(&self) -> Vec<String> {
        COMMON_FEED_PATHS
            .iter()
            .map(|path| format!("{}{path}", self.base_url))
            .collect()
    }

    /// Variants below the input path; none when the input is the root.
    fn relative_path_candidates(&self) -> Vec<String> {
        if self.input_pathname == "/" {
            return Vec::new();
        }
        RELATIVE_FEED_PATHS
            .iter()
            .map(|path| format!("{}{}{path}", self.base_url, self.input_pathname))
            .collect()
    }
}
