//! Feedscout Core Library
//!
//! This library finds the syndication feeds (RSS, Atom, JSON Feed) reachable
//! from an arbitrary URL. Site-specific services build feed URLs directly;
//! a universal fallback guesses well-known paths and reads the page's
//! `<link>` tags. Every reported feed has been fetched and parsed.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`discovery`] - Services, registry, validation and the HTTP fetch helper
//! - [`config`] - Deadlines, body limit and user agents
//! - [`telemetry`] - Optional span/breadcrumb/error reporting seam

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod discovery;
pub mod telemetry;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::DiscoveryConfig;
pub use discovery::{
    DiscoveredFeed, DiscoveryError, DiscoveryRegistry, DiscoveryService, FeedType,
    ServicePriority, build_default_registry, normalize_feed_url,
};
pub use telemetry::{NoopTelemetry, SharedTelemetry, Telemetry, TracingTelemetry};
