//! Optional telemetry for discovery runs.
//!
//! The engine reports spans, breadcrumbs and captured errors through the
//! [`Telemetry`] trait. Every method has a no-op default, so [`NoopTelemetry`]
//! is an empty impl and embedding applications only override what their
//! observability backend supports. [`TracingTelemetry`] forwards everything to
//! the `tracing` ecosystem.

use std::fmt;
use std::sync::Arc;

use tracing::{Span, debug, info_span, warn};

/// Shared handle to a telemetry adapter.
pub type SharedTelemetry = Arc<dyn Telemetry>;

/// A lightweight event recorded along the discovery path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    /// Coarse grouping, e.g. `"discovery.service"`.
    pub category: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Structured key/value data.
    pub data: Vec<(&'static str, String)>,
}

impl Breadcrumb {
    #[must_use]
    pub fn new(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            data: Vec::new(),
        }
    }

    /// Adds one key/value pair.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.data.push((key, value.into()));
        self
    }
}

/// Where a captured error happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Name of the service (or component) that failed.
    pub service: String,
    /// Input URL of the discovery call.
    pub url: String,
}

impl ErrorContext {
    #[must_use]
    pub fn new(service: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            url: url.into(),
        }
    }
}

/// Span/breadcrumb/exception reporting seam.
///
/// `span` returns a [`tracing::Span`] that the engine uses to instrument the
/// wrapped future; returning [`Span::none`] disables it.
pub trait Telemetry: Send + Sync + fmt::Debug {
    fn span(&self, _name: &'static str, _attrs: &[(&'static str, String)]) -> Span {
        Span::none()
    }

    fn breadcrumb(&self, _crumb: Breadcrumb) {}

    fn capture_error(&self, _error: &(dyn std::error::Error + 'static), _context: &ErrorContext) {}
}

/// Null-object telemetry. The default for every registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {}

/// Telemetry adapter that writes to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn span(&self, name: &'static str, attrs: &[(&'static str, String)]) -> Span {
        let rendered = render_pairs(attrs);
        info_span!("discovery", op = name, attrs = %rendered)
    }

    fn breadcrumb(&self, crumb: Breadcrumb) {
        debug!(
            category = crumb.category,
            data = %render_pairs(&crumb.data),
            "{}",
            crumb.message
        );
    }

    fn capture_error(&self, error: &(dyn std::error::Error + 'static), context: &ErrorContext) {
        warn!(
            service = %context.service,
            url = %context.url,
            error = %error,
            "Captured discovery error"
        );
    }
}

/// Returns the default no-op telemetry handle.
#[must_use]
pub fn noop() -> SharedTelemetry {
    Arc::new(NoopTelemetry)
}

fn render_pairs(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
