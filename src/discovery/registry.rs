//! Discovery registry with priority-ordered discovery loop.
//!
//! The [`DiscoveryRegistry`] manages a collection of services and runs the
//! discovery loop: input preparation, handler selection, per-service failure
//! isolation, early exit on the first service that finds feeds, and final
//! deduplication.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{Instrument, debug, info, warn};
use url::Url;

use crate::telemetry::{Breadcrumb, ErrorContext, SharedTelemetry, noop};

use super::utils::leading_scheme;
use super::{DiscoveredFeed, DiscoveryContext, DiscoveryError, DiscoveryService, FeedValidator};

/// A priority-ordered collection of discovery services.
///
/// Services are tried in priority order (Specialized first, then General,
/// then Fallback). Within the same priority level, services are tried in
/// registration order.
pub struct DiscoveryRegistry {
    services: Vec<Box<dyn DiscoveryService>>,
    validator: Arc<dyn FeedValidator>,
    telemetry: SharedTelemetry,
}

impl DiscoveryRegistry {
    /// Creates an empty registry that confirms candidates with `validator`.
    #[must_use]
    pub fn new(validator: Arc<dyn FeedValidator>) -> Self {
        Self {
            services: Vec::new(),
            validator,
            telemetry: noop(),
        }
    }

    /// Replaces the telemetry adapter (no-op by default).
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: SharedTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Registers a service with the registry.
    #[tracing::instrument(skip(self, service), fields(service_name))]
    pub fn register(&mut self, service: Box<dyn DiscoveryService>) {
        tracing::Span::current().record("service_name", service.name());
        debug!(
            name = service.name(),
            priority = ?service.priority(),
            "Registering discovery service"
        );
        self.services.push(service);
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Returns true if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Returns all services that can handle `url`, sorted by priority.
    ///
    /// The sort is stable, so registration order breaks ties.
    #[must_use]
    pub fn find_handlers(&self, url: &str) -> Vec<&dyn DiscoveryService> {
        let mut handlers: Vec<&dyn DiscoveryService> = self
            .services
            .iter()
            .filter(|s| s.can_handle(url))
            .map(AsRef::as_ref)
            .collect();
        handlers.sort_by_key(|s| s.priority());
        handlers
    }

    /// Discovers the feeds reachable from `input`.
    ///
    /// 1. Prepares the input (trim, default `https://`, require a host)
    /// 2. Creates a fresh [`DiscoveryContext`] for this call
    /// 3. Runs each applicable service in priority order
    /// 4. Returns the first non-empty result, deduplicated by normalized URL
    ///
    /// A service that errors or panics is reported to telemetry and skipped.
    /// Finding nothing is `Ok(vec![])`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidUrl`] if `input` cannot be turned
    /// into an absolute http(s) URL.
    #[tracing::instrument(skip(self), fields(url = tracing::field::Empty))]
    pub async fn discover(&self, input: &str) -> Result<Vec<DiscoveredFeed>, DiscoveryError> {
        let url = prepare_input(input)?;
        tracing::Span::current().record("url", url.as_str());

        let ctx = DiscoveryContext::with_telemetry(
            Arc::clone(&self.validator),
            Arc::clone(&self.telemetry),
        );
        let handlers = self.find_handlers(&url);
        debug!(handler_count = handlers.len(), "Found handlers for input");

        for service in handlers {
            let name = service.name();
            let span = self.telemetry.span(
                "discovery.service",
                &[("service", name.to_string()), ("url", url.clone())],
            );
            debug!(service = name, "Trying discovery service");

            let outcome = AssertUnwindSafe(service.discover(&url, &ctx))
                .catch_unwind()
                .instrument(span)
                .await;

            let feeds = match outcome {
                Ok(Ok(feeds)) => feeds,
                Ok(Err(error)) => {
                    self.report_failure(name, &url, &error);
                    continue;
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    let error = DiscoveryError::service_failed(name, &url, reason);
                    self.report_failure(name, &url, &error);
                    continue;
                }
            };

            self.telemetry.breadcrumb(
                Breadcrumb::new("discovery.service", "service finished")
                    .with("service", name)
                    .with("found", feeds.len().to_string()),
            );

            if !feeds.is_empty() {
                let feeds = dedup_by_normalized_url(feeds);
                info!(
                    service = name,
                    count = feeds.len(),
                    probed = ctx.probed_count(),
                    "Discovery successful"
                );
                return Ok(feeds);
            }
            debug!(service = name, "Service found nothing, trying next");
        }

        info!(probed = ctx.probed_count(), "No feeds found");
        Ok(Vec::new())
    }

    fn report_failure(&self, service: &str, url: &str, error: &DiscoveryError) {
        warn!(service, error = %error, "Discovery service failed, trying next");
        self.telemetry
            .capture_error(error, &ErrorContext::new(service, url));
    }
}

impl std::fmt::Debug for DiscoveryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.services.iter().map(|s| s.name()).collect();
        f.debug_struct("DiscoveryRegistry")
            .field("service_count", &self.services.len())
            .field("services", &names)
            .finish_non_exhaustive()
    }
}

/// Turns user input into an absolute http(s) URL.
///
/// Input without a leading `scheme:` gets `https://`. Anything that still
/// fails to parse, has a non-http scheme or lacks a host is rejected.
pub(crate) fn prepare_input(input: &str) -> Result<String, DiscoveryError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DiscoveryError::invalid_url(input, "input is empty"));
    }

    let candidate = if leading_scheme(trimmed).is_some() {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed =
        Url::parse(&candidate).map_err(|e| DiscoveryError::invalid_url(input, e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DiscoveryError::invalid_url(
            input,
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(DiscoveryError::invalid_url(input, "URL has no host"));
    }
    Ok(parsed.to_string())
}

/// Drops feeds whose normalized URL was already seen; first occurrence wins.
fn dedup_by_normalized_url(feeds: Vec<DiscoveredFeed>) -> Vec<DiscoveredFeed> {
    let mut seen = HashSet::with_capacity(feeds.len());
    feeds
        .into_iter()
        .filter(|feed| seen.insert(feed.normalized_url()))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
