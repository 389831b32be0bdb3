//! Discovery configuration: network deadlines, body limits and HTTP identity.
//!
//! [`DiscoveryConfig`] is built once at start-up (from defaults, CLI flags or
//! an embedding application's own config file) and handed to
//! [`build_default_registry`](crate::discovery::build_default_registry).

use std::time::Duration;

use serde::Deserialize;

use crate::user_agent;

/// Default deadline for a single feed-validation probe.
pub const DEFAULT_VALIDATE_TIMEOUT_MS: u64 = 8_000;
/// Default deadline for full-page HTML fetches.
pub const DEFAULT_HTML_TIMEOUT_MS: u64 = 10_000;
/// Default deadline for lightweight metadata lookups (icons, directory APIs).
pub const DEFAULT_METADATA_TIMEOUT_MS: u64 = 5_000;
/// Default TCP/TLS connect timeout applied at the client level.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
/// Default cap on any response body read by the engine.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Tunables shared by every discovery service.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Deadline for one feed-validation probe, in milliseconds.
    pub validate_timeout_ms: u64,
    /// Deadline for HTML page fetches, in milliseconds.
    pub html_timeout_ms: u64,
    /// Deadline for metadata/icon lookups, in milliseconds.
    pub metadata_timeout_ms: u64,
    /// Connect timeout for the shared HTTP client, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Maximum number of body bytes read from any response.
    pub max_body_bytes: usize,
    /// User-Agent for feed and API requests.
    pub user_agent: String,
    /// User-Agent for HTML page fetches.
    pub browser_user_agent: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            validate_timeout_ms: DEFAULT_VALIDATE_TIMEOUT_MS,
            html_timeout_ms: DEFAULT_HTML_TIMEOUT_MS,
            metadata_timeout_ms: DEFAULT_METADATA_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            user_agent: user_agent::default_tool_user_agent(),
            browser_user_agent: user_agent::default_browser_user_agent(),
        }
    }
}

impl DiscoveryConfig {
    /// Overrides the feed-validation deadline.
    #[must_use]
    pub fn with_validate_timeout_ms(mut self, ms: u64) -> Self {
        self.validate_timeout_ms = ms;
        self
    }

    /// Overrides the HTML fetch deadline.
    #[must_use]
    pub fn with_html_timeout_ms(mut self, ms: u64) -> Self {
        self.html_timeout_ms = ms;
        self
    }

    /// Overrides the metadata lookup deadline.
    #[must_use]
    pub fn with_metadata_timeout_ms(mut self, ms: u64) -> Self {
        self.metadata_timeout_ms = ms;
        self
    }

    /// Overrides the response body cap.
    #[must_use]
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    #[must_use]
    pub fn validate_timeout(&self) -> Duration {
        Duration::from_millis(self.validate_timeout_ms)
    }

    #[must_use]
    pub fn html_timeout(&self) -> Duration {
        Duration::from_millis(self.html_timeout_ms)
    }

    #[must_use]
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
