//! CLI entry point for the feedscout tool.

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use feedscout_core::config::DiscoveryConfig;
use feedscout_core::discovery::{DiscoveredFeed, build_default_registry};
use feedscout_core::telemetry::TracingTelemetry;
use serde::Serialize;
use tracing::{debug, error, info};

mod cli;

use cli::Args;

/// One line of `--json` output.
#[derive(Serialize)]
struct Report<'a> {
    input: &'a str,
    feeds: &'a [DiscoveredFeed],
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries results; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let inputs = collect_inputs(&args)?;
    if inputs.is_empty() {
        bail!("no URLs provided\n  Suggestion: Pass a URL, e.g. feedscout https://example.com/blog");
    }

    let config = DiscoveryConfig::default()
        .with_validate_timeout_ms(args.validate_timeout_ms)
        .with_html_timeout_ms(args.html_timeout_ms)
        .with_metadata_timeout_ms(args.metadata_timeout_ms);
    let registry = build_default_registry(&config, Arc::new(TracingTelemetry))?;

    let mut missing: Vec<String> = Vec::new();
    for input in &inputs {
        let feeds = match registry.discover(input).await {
            Ok(feeds) => feeds,
            Err(err) => {
                error!(input = %input, "{err}");
                missing.push(input.clone());
                continue;
            }
        };

        if args.json {
            println!(
                "{}",
                serde_json::to_string(&Report {
                    input,
                    feeds: &feeds
                })?
            );
        } else {
            for feed in &feeds {
                println!("{}\t{}\t{}", feed.url, feed.feed_type, feed.title);
            }
        }

        if feeds.is_empty() {
            missing.push(input.clone());
        } else {
            info!(input = %input, count = feeds.len(), "Feeds found");
        }
    }

    if !missing.is_empty() {
        bail!("no feed could be found at {}", missing.join(", "));
    }
    Ok(())
}

/// Positional URLs, or one URL per non-empty stdin line when none are given.
fn collect_inputs(args: &Args) -> Result<Vec<String>> {
    if !args.urls.is_empty() {
        return Ok(args.urls.clone());
    }
    if io::stdin().is_terminal() {
        return Ok(Vec::new());
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
