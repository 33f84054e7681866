//! Per-transfer probe state machine.
//!
//! A [`Probe`] owns the accumulating body of exactly one transfer. Each chunk
//! is appended, classified until the type is known, then handed to the header
//! parser. The returned [`ChunkDecision`] tells the driver whether to keep
//! reading or to drop the transfer.
//!
//! ```text
//! Started -> Streaming -> Resolved | Rejected | Failed
//! ```

use futures_util::StreamExt;
use tracing::{debug, instrument, trace};

use super::error::ProbeFailure;
use super::transport::Transport;
use super::TransportError;
use crate::candidate::ImageInfo;
use crate::format::{Classification, ImageMime, ParseOutcome, classify, try_parse_dimensions};

/// What the transport should do after a chunk has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkDecision {
    /// Keep delivering data.
    Continue,
    /// Dimensions are known; stop the transfer.
    AbortResolved,
    /// The content is not an allowed image (or the probe already failed); stop the transfer.
    AbortRejected,
}

impl ChunkDecision {
    /// Returns true if the transfer should be cancelled.
    #[must_use]
    pub fn is_abort(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Lifecycle position of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePhase {
    /// Transfer initiated, no bytes yet.
    Started,
    /// At least one chunk received, no verdict yet.
    Streaming,
    /// Dimensions were parsed.
    Resolved,
    /// Content was classified outside the allow-list.
    Rejected,
    /// The transfer ended or broke before a verdict.
    Failed,
}

impl ProbePhase {
    /// Returns true for `Resolved`, `Rejected` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected | Self::Failed)
    }
}

/// Terminal result of one probe.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The header was parsed.
    Resolved(ImageInfo),
    /// Sniffing identified a disallowed type.
    Rejected {
        /// Best-effort label for the detected content.
        detected: &'static str,
    },
    /// No answer could be produced.
    Failed(ProbeFailure),
}

impl ProbeOutcome {
    /// Returns the image info for resolved outcomes.
    #[must_use]
    pub fn info(&self) -> Option<&ImageInfo> {
        match self {
            Self::Resolved(info) => Some(info),
            Self::Rejected { .. } | Self::Failed(_) => None,
        }
    }

    /// Returns true for resolved outcomes.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Incremental classifier/parser state for one transfer.
///
/// Single-writer: only the task driving the transfer calls [`feed`](Probe::feed).
#[derive(Debug)]
pub struct Probe {
    buffer: Vec<u8>,
    bytes_received: u64,
    mime: Option<ImageMime>,
    phase: ProbePhase,
    outcome: Option<ProbeOutcome>,
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe {
    /// Creates a probe in the `Started` phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            bytes_received: 0,
            mime: None,
            phase: ProbePhase::Started,
            outcome: None,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> ProbePhase {
        self.phase
    }

    /// Returns true once the probe is resolved, rejected or failed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Returns the classified type, once known.
    #[must_use]
    pub fn mime(&self) -> Option<ImageMime> {
        self.mime
    }

    /// Returns the body bytes accepted so far.
    #[must_use]
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Returns the resolved image info, if any.
    #[must_use]
    pub fn info(&self) -> Option<&ImageInfo> {
        self.outcome.as_ref().and_then(ProbeOutcome::info)
    }

    /// Handles one inbound chunk.
    ///
    /// After a terminal phase the chunk is ignored and the abort decision is
    /// repeated, so no further bytes are ever processed.
    pub fn feed(&mut self, chunk: &[u8]) -> ChunkDecision {
        if self.is_terminal() {
            return self.terminal_decision();
        }

        self.phase = ProbePhase::Streaming;
        self.buffer.extend_from_slice(chunk);
        self.bytes_received += chunk.len() as u64;
        trace!(
            chunk = chunk.len(),
            buffered = self.buffer.len(),
            "probe chunk"
        );

        let mime = match self.mime {
            Some(mime) => mime,
            None => match classify(&self.buffer) {
                Classification::Undetermined => return ChunkDecision::Continue,
                Classification::Rejected { detected } => {
                    debug!(detected, bytes = self.bytes_received, "probe rejected");
                    self.finish_with(ProbePhase::Rejected, ProbeOutcome::Rejected { detected });
                    return ChunkDecision::AbortRejected;
                }
                Classification::Allowed(mime) => {
                    trace!(%mime, "probe classified");
                    self.mime = Some(mime);
                    mime
                }
            },
        };

        match try_parse_dimensions(&self.buffer) {
            ParseOutcome::Incomplete => ChunkDecision::Continue,
            ParseOutcome::Found(dimensions) => {
                let info = ImageInfo::from_dimensions(dimensions, mime);
                debug!(
                    width = info.width,
                    height = info.height,
                    %mime,
                    bytes = self.bytes_received,
                    "probe resolved"
                );
                self.finish_with(ProbePhase::Resolved, ProbeOutcome::Resolved(info));
                ChunkDecision::AbortResolved
            }
        }
    }

    /// Records a transport failure. No effect once terminal.
    pub fn fail(&mut self, error: TransportError) {
        if self.is_terminal() {
            return;
        }
        debug!(error = %error, bytes = self.bytes_received, "probe failed");
        self.finish_with(
            ProbePhase::Failed,
            ProbeOutcome::Failed(ProbeFailure::Transport(error)),
        );
    }

    /// Marks the end of the body. A probe without a verdict becomes `Failed`.
    pub fn finish(&mut self) {
        if self.is_terminal() {
            return;
        }
        debug!(bytes = self.bytes_received, mime = ?self.mime, "body ended without verdict");
        let failure = ProbeFailure::Truncated {
            bytes: self.bytes_received,
            mime: self.mime,
        };
        self.finish_with(ProbePhase::Failed, ProbeOutcome::Failed(failure));
    }

    /// Consumes the probe, finishing it first if needed.
    #[must_use]
    pub fn into_outcome(mut self) -> ProbeOutcome {
        self.finish();
        match self.outcome {
            Some(outcome) => outcome,
            None => ProbeOutcome::Failed(ProbeFailure::Truncated {
                bytes: self.bytes_received,
                mime: self.mime,
            }),
        }
    }

    fn finish_with(&mut self, phase: ProbePhase, outcome: ProbeOutcome) {
        self.phase = phase;
        self.outcome = Some(outcome);
        self.buffer = Vec::new();
    }

    fn terminal_decision(&self) -> ChunkDecision {
        match self.phase {
            ProbePhase::Resolved => ChunkDecision::AbortResolved,
            _ => ChunkDecision::AbortRejected,
        }
    }
}

/// Drives one transfer to a terminal state.
///
/// The body stream is dropped as soon as the probe reaches a verdict, which
/// cancels the transfer without reading the rest of the payload. Returns the
/// outcome and the number of body bytes consumed.
#[instrument(level = "debug", skip(transport), fields(url = %url))]
pub async fn run_probe(transport: &dyn Transport, url: &str) -> (ProbeOutcome, u64) {
    let mut probe = Probe::new();

    let mut body = match transport.open(url).await {
        Ok(body) => body,
        Err(error) => {
            probe.fail(error);
            return (probe.into_outcome(), 0);
        }
    };

    while let Some(chunk) = body.next().await {
        match chunk {
            Ok(bytes) => {
                if probe.feed(&bytes).is_abort() {
                    break;
                }
            }
            Err(error) => {
                probe.fail(error);
                break;
            }
        }
    }
    drop(body);

    let bytes = probe.bytes_received();
    (probe.into_outcome(), bytes)
}
