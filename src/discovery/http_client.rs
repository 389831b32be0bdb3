//! Shared HTTP policy and the single "fetch with deadline" helper.
//!
//! Every network operation in the engine goes through [`HttpFetcher::fetch`]:
//! the feed validator, the HTML link probe and each service's metadata lookup.
//! The deadline covers the request *and* the full body read. When it elapses
//! the in-flight future is dropped, which drops the response stream and
//! returns the connection instead of leaving a late body to drain.

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response, redirect};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::trace;

use crate::config::DiscoveryConfig;

use super::DiscoveryError;

const MAX_REDIRECTS: usize = 10;

/// Accept header for feed validation requests.
pub const FEED_ACCEPT: &str = "application/rss+xml, application/atom+xml, application/feed+json, \
     application/xml;q=0.9, text/xml;q=0.9, application/json;q=0.8, */*;q=0.5";
/// Accept header for HTML page fetches.
pub const HTML_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";
/// Accept header for JSON metadata APIs.
pub const JSON_ACCEPT: &str = "application/json";

/// A fully read, size-capped response body.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// URL after redirects.
    pub final_url: String,
    /// Lower-cased `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// Raw body bytes.
    pub bytes: Vec<u8>,
}

impl FetchedBody {
    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Cheap-to-clone handle bundling the shared client with fetch policy.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
    browser_user_agent: String,
}

impl HttpFetcher {
    /// Builds the shared client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::ClientBuild`] when client construction fails.
    pub fn new(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .build()
            .map_err(DiscoveryError::ClientBuild)?;
        Ok(Self::with_client(client, config))
    }

    /// Wraps an existing client (tests, or callers sharing a pool).
    #[must_use]
    pub fn with_client(client: Client, config: &DiscoveryConfig) -> Self {
        Self {
            client,
            max_body_bytes: config.max_body_bytes,
            browser_user_agent: config.browser_user_agent.clone(),
        }
    }

    /// GETs `url` with the given `Accept` header under `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Timeout`] when the deadline elapses,
    /// [`DiscoveryError::HttpStatus`] on a non-2xx answer,
    /// [`DiscoveryError::TooLarge`] when the body exceeds the cap, and
    /// [`DiscoveryError::Network`] on transport failures.
    pub async fn fetch(
        &self,
        url: &str,
        timeout: Duration,
        accept: &str,
    ) -> Result<FetchedBody, DiscoveryError> {
        self.fetch_with_user_agent(url, timeout, accept, None).await
    }

    /// GETs a page as a browser would: browser-like UA, `Accept: text/html`.
    ///
    /// # Errors
    ///
    /// Same as [`HttpFetcher::fetch`].
    pub async fn fetch_html(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<FetchedBody, DiscoveryError> {
        self.fetch_with_user_agent(url, timeout, HTML_ACCEPT, Some(&self.browser_user_agent))
            .await
    }

    /// GETs a JSON document and deserializes it.
    ///
    /// # Errors
    ///
    /// Same as [`HttpFetcher::fetch`], plus [`DiscoveryError::NotAFeed`] when
    /// the body is not valid JSON for `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, DiscoveryError> {
        let body = self.fetch(url, timeout, JSON_ACCEPT).await?;
        serde_json::from_slice(&body.bytes)
            .map_err(|e| DiscoveryError::not_a_feed(url, format!("invalid JSON: {e}")))
    }

    async fn fetch_with_user_agent(
        &self,
        url: &str,
        timeout: Duration,
        accept: &str,
        user_agent: Option<&str>,
    ) -> Result<FetchedBody, DiscoveryError> {
        let request = async {
            let mut builder = self.client.get(url).header(ACCEPT, accept);
            if let Some(user_agent) = user_agent {
                builder = builder.header(USER_AGENT, user_agent);
            }
            let response = builder.send().await.map_err(|source| DiscoveryError::Network {
                url: url.to_string(),
                source,
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(DiscoveryError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let final_url = response.url().to_string();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_ascii_lowercase);
            let bytes = read_limited(response, url, self.max_body_bytes).await?;

            trace!(url, final_url = %final_url, bytes = bytes.len(), "Fetched body");
            Ok(FetchedBody {
                final_url,
                content_type,
                bytes,
            })
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(DiscoveryError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis(),
            }),
        }
    }
}

/// Reads the body chunk by chunk, refusing to buffer past `limit` bytes.
async fn read_limited(
    response: Response,
    url: &str,
    limit: usize,
) -> Result<Vec<u8>, DiscoveryError> {
    let too_large = || DiscoveryError::TooLarge {
        url: url.to_string(),
        limit,
    };

    if let Some(len) = response.content_length()
        && usize::try_from(len).map_or(true, |len| len > limit)
    {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| DiscoveryError::Network {
            url: url.to_string(),
            source,
        })?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn fetcher(config: &DiscoveryConfig) -> HttpFetcher {
        HttpFetcher::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("hello")
                    .insert_header("Content-Type", "Text/Plain"),
            )
            .mount(&server)
            .await;

        let body = fetcher(&DiscoveryConfig::default())
            .fetch(
                &format!("{}/doc", server.uri()),
                Duration::from_secs(2),
                "*/*",
            )
            .await
            .unwrap();
        assert_eq!(body.text(), "hello");
        assert_eq!(body.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects_and_records_final_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/doc"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/doc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let body = fetcher(&DiscoveryConfig::default())
            .fetch(
                &format!("{}/old", server.uri()),
                Duration::from_secs(2),
                "*/*",
            )
            .await
            .unwrap();
        assert_eq!(body.final_url, format!("{}/doc", server.uri()));
        assert_eq!(body.text(), "moved");
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher(&DiscoveryConfig::default())
            .fetch(&server.uri(), Duration::from_secs(2), "*/*")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_times_out_on_slow_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = fetcher(&DiscoveryConfig::default())
            .fetch(&server.uri(), Duration::from_millis(100), "*/*")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Timeout { timeout_ms: 100, .. }));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let config = DiscoveryConfig::default().with_max_body_bytes(16);
        let err = fetcher(&config)
            .fetch(&server.uri(), Duration::from_secs(2), "*/*")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::TooLarge { limit: 16, .. }));
    }

    #[tokio::test]
    async fn test_fetch_html_sends_browser_headers() {
        let server = MockServer::start().await;
        let config = DiscoveryConfig::default();
        Mock::given(method("GET"))
            .and(|req: &Request| {
                let value = |name: &str| {
                    req.headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                };
                value("accept").starts_with("text/html")
                    && value("user-agent").starts_with("Mozilla/5.0")
            })
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let body = fetcher(&config)
            .fetch_html(&server.uri(), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(body.text(), "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_json_invalid_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result: Result<serde_json::Value, _> = fetcher(&DiscoveryConfig::default())
            .fetch_json(&server.uri(), Duration::from_secs(2))
            .await;
        assert!(matches!(result, Err(DiscoveryError::NotAFeed { .. })));
    }
}
