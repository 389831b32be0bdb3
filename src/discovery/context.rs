//! Per-call deduplication context shared by every service.
//!
//! Several services routinely guess the same candidate (`/feed`, a `<link>`
//! tag pointing at `/rss.xml` that the common-path probe also tried, ...).
//! [`DiscoveryContext::validate_feed`] keys every probe by its normalized URL
//! and stores one `OnceCell` per key: the first caller runs the validator and
//! concurrent callers for the same key await that same in-flight probe. The
//! validator therefore runs at most once per normalized URL per call.

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::sync::OnceCell;
use tracing::trace;

use crate::telemetry::{SharedTelemetry, noop};

use super::normalize::normalize_feed_url;
use super::{DiscoveredFeed, FeedValidator};

type Outcome = Arc<OnceCell<Option<DiscoveredFeed>>>;

/// Shared state for one top-level discovery call. Never reused across calls.
pub struct DiscoveryContext {
    validator: Arc<dyn FeedValidator>,
    telemetry: SharedTelemetry,
    memo: DashMap<String, Outcome>,
}

impl DiscoveryContext {
    /// Creates an empty context around `validator`.
    #[must_use]
    pub fn new(validator: Arc<dyn FeedValidator>) -> Self {
        Self::with_telemetry(validator, noop())
    }

    /// Creates an empty context that exposes `telemetry` to services.
    #[must_use]
    pub fn with_telemetry(validator: Arc<dyn FeedValidator>, telemetry: SharedTelemetry) -> Self {
        Self {
            validator,
            telemetry,
            memo: DashMap::new(),
        }
    }

    /// Validates `url`, consulting the memo before any network I/O.
    pub async fn validate_feed(&self, url: &str) -> Option<DiscoveredFeed> {
        let key = normalize_feed_url(url);
        let outcome: Outcome = Arc::clone(&self.memo.entry(key).or_default());

        if let Some(cached) = outcome.get() {
            trace!(url, "Validation memo hit");
            return cached.clone();
        }

        outcome
            .get_or_init(|| self.validator.validate(url))
            .await
            .clone()
    }

    /// Validates every URL concurrently and returns the confirmed feeds in
    /// input order.
    pub async fn validate_all<I, S>(&self, urls: I) -> Vec<DiscoveredFeed>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        join_all(
            urls.into_iter()
                .map(|url| async move { self.validate_feed(url.as_ref()).await }),
        )
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Number of distinct normalized URLs probed so far.
    #[must_use]
    pub fn probed_count(&self) -> usize {
        self.memo.len()
    }

    /// Telemetry adapter for services that want to leave breadcrumbs.
    #[must_use]
    pub fn telemetry(&self) -> &SharedTelemetry {
        &self.telemetry
    }
}

impl std::fmt::Debug for DiscoveryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryContext")
            .field("probed_count", &self.memo.len())
            .finish_non_exhaustive()
    }
}
