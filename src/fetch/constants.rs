//! Constants for the fetch module (transport defaults).

/// Default maximum number of redirects followed per transfer.
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// Default HTTP connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total timeout per transfer (10 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// `image-probe/<version>`.
#[must_use]
pub fn default_user_agent() -> String {
    format!("image-probe/{}", env!("CARGO_PKG_VERSION"))
}
