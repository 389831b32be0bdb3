//! Feed documents, pages and registries shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use feedscout_core::config::DiscoveryConfig;
use feedscout_core::discovery::{
    DiscoveryRegistry, FeedValidator, HttpFeedValidator, HttpFetcher, StandardService,
};
use wiremock::ResponseTemplate;

pub fn rss_body(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>{title}</title>
    <link>https://example.com/</link>
    <description>Posts about things</description>
    <item><title>First</title><link>https://example.com/first</link></item>
  </channel>
</rss>"#
    )
}

pub fn atom_body(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>{title}</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2024-01-01T00:00:00Z</updated>
  <entry>
    <title>First</title>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <updated>2024-01-01T00:00:00Z</updated>
  </entry>
</feed>"#
    )
}

pub fn json_feed_body(title: &str) -> String {
    format!(
        r#"{{"version":"https://jsonfeed.org/version/1","title":"{title}","items":[{{"id":"1","content_text":"hello"}}]}}"#
    )
}

/// HTML page advertising each `(type, href)` pair as an alternate link.
pub fn html_with_links(links: &[(&str, &str)]) -> String {
    let tags: String = links
        .iter()
        .map(|(kind, href)| {
            format!(r#"    <link rel="alternate" type="{kind}" title="Feed" href="{href}">"#)
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "<!doctype html>\n<html>\n  <head>\n    <title>Blog</title>\n{tags}\n  </head>\n  <body><p>Hello</p></body>\n</html>"
    )
}

pub fn xml_response(body: String, content_type: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), content_type)
}

pub fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8")
}

/// Short deadlines so failing fetches resolve quickly.
pub fn fast_config() -> DiscoveryConfig {
    DiscoveryConfig::default()
        .with_validate_timeout_ms(2_000)
        .with_html_timeout_ms(2_000)
        .with_metadata_timeout_ms(300)
}

pub fn http_validator(fetcher: &HttpFetcher, config: &DiscoveryConfig) -> Arc<dyn FeedValidator> {
    Arc::new(HttpFeedValidator::new(
        fetcher.clone(),
        config.validate_timeout(),
    ))
}

/// Registry with only the standard fallback, validating over real HTTP.
pub fn standard_registry() -> DiscoveryRegistry {
    let config = fast_config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let mut registry = DiscoveryRegistry::new(http_validator(&fetcher, &config));
    registry.register(Box::new(StandardService::new(fetcher, config.html_timeout())));
    registry
}
