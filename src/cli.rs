//! CLI argument definitions using clap derive macros.

use clap::Parser;

use feedscout_core::config::{
    DEFAULT_HTML_TIMEOUT_MS, DEFAULT_METADATA_TIMEOUT_MS, DEFAULT_VALIDATE_TIMEOUT_MS,
};

/// Discover the RSS, Atom and JSON feeds reachable from a URL.
///
/// Feedscout tries site-specific routes (Reddit, YouTube, Apple Podcasts)
/// first and falls back to well-known paths and the page's `<link>` tags.
/// Every reported feed has been fetched and parsed.
#[derive(Parser, Debug)]
#[command(name = "feedscout")]
#[command(author, version, about)]
pub struct Args {
    /// URLs to inspect (read from stdin, one per line, when omitted)
    pub urls: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print one JSON object per input instead of text lines
    #[arg(long)]
    pub json: bool,

    /// Deadline for fetching and parsing one candidate feed, in milliseconds (100-120000)
    #[arg(long, env = "FEEDSCOUT_VALIDATE_TIMEOUT_MS", default_value_t = DEFAULT_VALIDATE_TIMEOUT_MS, value_parser = clap::value_parser!(u64).range(100..=120_000))]
    pub validate_timeout_ms: u64,

    /// Deadline for fetching the input page's HTML, in milliseconds (100-120000)
    #[arg(long, env = "FEEDSCOUT_HTML_TIMEOUT_MS", default_value_t = DEFAULT_HTML_TIMEOUT_MS, value_parser = clap::value_parser!(u64).range(100..=120_000))]
    pub html_timeout_ms: u64,

    /// Deadline for icon and directory lookups, in milliseconds (100-120000)
    #[arg(long, env = "FEEDSCOUT_METADATA_TIMEOUT_MS", default_value_t = DEFAULT_METADATA_TIMEOUT_MS, value_parser = clap::value_parser!(u64).range(100..=120_000))]
    pub metadata_timeout_ms: u64,
}
