//! Skips wiremock-backed tests in sandboxes that forbid localhost sockets.
//!
//! Set `FEEDSCOUT_REQUIRE_SOCKET_TESTS=1` in CI so a missing socket fails the
//! test instead of silently passing it.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "FEEDSCOUT_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_ENV).is_ok_and(|value| {
        let value = value.trim();
        value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
    })
}

/// Why a loopback listener cannot be opened, or `None` when it can.
fn loopback_unavailable() -> Option<String> {
    TcpListener::bind(("127.0.0.1", 0)).err().map(|error| error.to_string())
}

/// Starts a mock server, or returns `None` after logging why the calling
/// test is skipped.
///
/// # Panics
///
/// Panics when sockets are unavailable and `FEEDSCOUT_REQUIRE_SOCKET_TESTS`
/// is set.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    let Some(reason) = loopback_unavailable() else {
        return Some(MockServer::start().await);
    };

    let thread = std::thread::current();
    let test = thread.name().unwrap_or("<unnamed test>");
    assert!(
        !sockets_required(),
        "{test}: loopback socket unavailable ({reason}) and {REQUIRE_ENV} is set"
    );
    eprintln!("{test}: skipped, loopback socket unavailable ({reason})");
    None
}
