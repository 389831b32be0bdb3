//! Shared User-Agent strings for feed probes and HTML page fetches.
//!
//! Single source for project URL and UA format so feed, API and page traffic
//! stay consistent and easy to update.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/feedscout";

/// Browser-like UA used for HTML page fetches. Many sites serve a stripped
/// page (or a 403) to clients that do not look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Default User-Agent for feed validation and metadata API requests.
#[must_use]
pub(crate) fn default_tool_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("feedscout/{version} (feed-discovery; +{PROJECT_UA_URL})")
}

/// User-Agent sent with HTML page fetches.
#[must_use]
pub(crate) fn default_browser_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_ua_contains_version_and_project_url() {
        let ua = default_tool_user_agent();
        assert!(ua.contains(PROJECT_UA_URL), "tool UA must contain project URL");
        assert_eq!(
            env!("CARGO_PKG_VERSION"),
            ua.strip_prefix("feedscout/")
                .and_then(|s| s.split(' ').next())
                .expect("tool UA has version"),
            "tool UA must contain crate version"
        );
    }

    #[test]
    fn test_browser_ua_looks_like_a_browser() {
        let ua = default_browser_user_agent();
        assert!(ua.starts_with("Mozilla/5.0"), "browser UA: {ua}");
        assert!(!ua.contains("feedscout"), "browser UA must not name the tool");
    }
}
