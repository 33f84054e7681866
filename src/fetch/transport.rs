//! Transport seam between probes and the network.
//!
//! A transport opens one streaming transfer per URL. Probes pull chunks from
//! the returned [`BodyStream`] and cancel the transfer by dropping it.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

use super::TransportError;

/// Streaming response body. Dropping it aborts the transfer.
pub type BodyStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// A source of streaming transfers shared by every probe in a batch.
///
/// Implementations must support many transfers open at once; probes call
/// [`open`](Transport::open) concurrently from separate tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Starts a transfer and returns its body stream once headers are in.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the transfer cannot be started or the
    /// response is not usable.
    async fn open(&self, url: &str) -> Result<BodyStream, TransportError>;
}
