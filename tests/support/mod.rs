//! Shared helpers for integration tests: image fixtures, mock transports,
//! socket guards for wiremock-based tests.

#![allow(dead_code)]

pub mod images;
pub mod mock_transport;
pub mod socket_guard;

/// Installs a test-writer subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
