//! Error types for discovery operations.
//!
//! Most of these never reach a caller of
//! [`DiscoveryRegistry::discover`](super::DiscoveryRegistry::discover): probe
//! failures are swallowed inside services and service failures are swallowed
//! by the registry. They exist so each layer can say *why* a probe produced
//! nothing when logging or reporting to telemetry.

use thiserror::Error;

/// Errors that can occur while discovering or validating feeds.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The input is not an http(s) URL with a host
    #[error("invalid URL '{input}': {reason}\n  Suggestion: Pass a full http(s) URL, e.g. https://example.com/blog")]
    InvalidUrl {
        /// The rejected input
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("network error fetching '{url}': {source}")]
    Network {
        /// URL being fetched
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching '{url}'")]
    HttpStatus {
        /// URL being fetched
        url: String,
        /// Response status code
        status: u16,
    },

    /// Request or body read exceeded its deadline
    #[error("timed out after {timeout_ms}ms fetching '{url}'")]
    Timeout {
        /// URL being fetched
        url: String,
        /// Deadline that elapsed
        timeout_ms: u128,
    },

    /// Response body exceeded the configured size cap
    #[error("response from '{url}' exceeds {limit} bytes")]
    TooLarge {
        /// URL being fetched
        url: String,
        /// Configured cap
        limit: usize,
    },

    /// Body was fetched but is not a recognizable payload
    #[error("'{url}' did not return a usable document: {reason}")]
    NotAFeed {
        /// URL being fetched
        url: String,
        /// What was wrong with the body
        reason: String,
    },

    /// A discovery service failed for a reason other than a probe failure
    #[error("service '{service}' failed for '{url}': {reason}")]
    ServiceFailed {
        /// Service name
        service: String,
        /// Input URL
        url: String,
        /// Failure description
        reason: String,
    },

    /// The shared HTTP client could not be constructed
    #[error("HTTP client construction failed: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl DiscoveryError {
    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `NotAFeed` error.
    #[must_use]
    pub fn not_a_feed(url: &str, reason: impl Into<String>) -> Self {
        Self::NotAFeed {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `ServiceFailed` error.
    #[must_use]
    pub fn service_failed(service: &str, url: &str, reason: impl Into<String>) -> Self {
        Self::ServiceFailed {
            service: service.to_string(),
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
