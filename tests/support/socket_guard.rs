//! Guard for tests that need a localhost socket (wiremock servers).
//!
//! Sandboxed CI runners sometimes forbid binding. By default those tests are
//! skipped with a note on stderr; `IMAGE_PROBE_REQUIRE_SOCKET_TESTS=1` turns
//! the skip into a failure.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "IMAGE_PROBE_REQUIRE_SOCKET_TESTS";

/// What to do when localhost cannot be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unbindable {
    Skip,
    Fail,
}

impl Unbindable {
    fn from_env() -> Self {
        match std::env::var(REQUIRE_ENV) {
            Ok(value) if matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes") => {
                Self::Fail
            }
            _ => Self::Skip,
        }
    }
}

fn localhost_bindable() -> bool {
    TcpListener::bind(("127.0.0.1", 0)).is_ok()
}

/// Starts a wiremock server, or returns `None` when the test should be skipped.
///
/// # Panics
///
/// Panics when binding is impossible and the require variable is set.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if localhost_bindable() {
        return Some(MockServer::start().await);
    }

    match Unbindable::from_env() {
        Unbindable::Fail => panic!("[socket-bound-test] localhost is not bindable and {REQUIRE_ENV} is set"),
        Unbindable::Skip => {
            eprintln!(
                "[socket-bound-test] localhost is not bindable; skipping (set {REQUIRE_ENV}=1 to fail instead)"
            );
            None
        }
    }
}
