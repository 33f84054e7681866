//! In-process transport that serves scripted chunk sequences and records how
//! much of each body was pulled and whether the body stream was released.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use image_probe::fetch::BodyStream;
use image_probe::{Transport, TransportError};
use tokio::sync::Barrier;

/// How a scripted body ends after its chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tail {
    /// The stream ends normally.
    End,
    /// The stream never yields again (a stalled server).
    Pending,
    /// The stream yields a transport error.
    Error,
}

/// Scripted response for one URL.
#[derive(Debug, Clone)]
pub struct MockBody {
    chunks: Vec<Vec<u8>>,
    tail: Tail,
    open_timeout: bool,
    gate: Option<Arc<Barrier>>,
}

impl MockBody {
    /// Serves `chunks` in order, then ends.
    pub fn chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            tail: Tail::End,
            open_timeout: false,
            gate: None,
        }
    }

    /// Splits `body` into chunks of `chunk_size` bytes.
    pub fn split(body: &[u8], chunk_size: usize) -> Self {
        Self::chunks(body.chunks(chunk_size).map(<[u8]>::to_vec).collect())
    }

    /// Fails to open with a timeout.
    pub fn open_timeout() -> Self {
        Self {
            open_timeout: true,
            ..Self::chunks(Vec::new())
        }
    }

    /// Replaces how the body ends.
    pub fn with_tail(mut self, tail: Tail) -> Self {
        self.tail = tail;
        self
    }

    /// Makes `open` wait on `barrier` before returning.
    pub fn gated(mut self, barrier: Arc<Barrier>) -> Self {
        self.gate = Some(barrier);
        self
    }
}

/// Per-URL counters.
#[derive(Debug, Clone, Default)]
pub struct BodyStats {
    delivered: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
}

impl BodyStats {
    /// Chunks pulled from the body stream.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Whether the body stream has been dropped.
    pub fn dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

struct BodyTracker(BodyStats);

impl BodyTracker {
    fn record_chunk(&self) {
        self.0.delivered.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for BodyTracker {
    fn drop(&mut self) {
        self.0.dropped.store(true, Ordering::SeqCst);
    }
}

/// Transport serving [`MockBody`] scripts keyed by URL. Unknown URLs get HTTP 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    bodies: HashMap<String, MockBody>,
    stats: HashMap<String, BodyStats>,
    opened: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the script for `url`.
    pub fn with_body(mut self, url: &str, body: MockBody) -> Self {
        self.bodies.insert(url.to_string(), body);
        self.stats.insert(url.to_string(), BodyStats::default());
        self
    }

    /// Counters for `url`.
    pub fn stats(&self, url: &str) -> BodyStats {
        self.stats.get(url).cloned().unwrap_or_default()
    }

    /// Number of `open` calls so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, url: &str) -> Result<BodyStream, TransportError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let Some(body) = self.bodies.get(url) else {
            return Err(TransportError::http_status(url, 404));
        };
        if let Some(gate) = &body.gate {
            gate.wait().await;
        }
        if body.open_timeout {
            return Err(TransportError::timeout(url));
        }

        let tracker = BodyTracker(self.stats(url));
        let chunks = stream::iter(
            body.chunks
                .clone()
                .into_iter()
                .map(|chunk| Ok::<Bytes, TransportError>(Bytes::from(chunk))),
        )
        .inspect(move |_| tracker.record_chunk());

        let owned_url = url.to_string();
        Ok(match body.tail {
            Tail::End => chunks.boxed(),
            Tail::Pending => chunks.chain(stream::pending()).boxed(),
            Tail::Error => chunks
                .chain(stream::once(async move {
                    Err(TransportError::io(
                        owned_url,
                        std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer"),
                    ))
                }))
                .boxed(),
        })
    }
}
