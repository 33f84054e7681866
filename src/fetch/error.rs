//! Error types for the fetch module.
//!
//! None of these cross the batch boundary as hard failures: a transfer that
//! ends in one of them is recorded as a failed probe and its candidate is
//! left out of the results.

use thiserror::Error;

use crate::format::ImageMime;
use crate::inline::InlineError;

/// Errors raised by a [`Transport`](super::Transport) while opening or reading a transfer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL being fetched.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Connect or total timeout elapsed.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The reference is not a valid http(s) URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// I/O failure from a non-HTTP transport.
    #[error("IO error fetching {url}: {source}")]
    Io {
        /// The URL being fetched.
        url: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            url: url.into(),
            source,
        }
    }

    /// Returns true for timeouts.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Why a probe ended without image info.
#[derive(Debug, Error)]
pub enum ProbeFailure {
    /// The transfer could not be opened or broke mid-stream.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body ended before the type or the header could be determined.
    #[error("body ended after {bytes} bytes before the image header was complete")]
    Truncated {
        /// Body bytes received.
        bytes: u64,
        /// Classified type, if classification had succeeded.
        mime: Option<ImageMime>,
    },

    /// The inline data URI could not be measured.
    #[error("malformed inline data: {0}")]
    MalformedInline(#[from] InlineError),

    /// The probe task panicked or was cancelled before finishing.
    #[error("probe task did not finish: {reason}")]
    TaskAborted {
        /// Join error description.
        reason: String,
    },
}
