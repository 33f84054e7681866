//! Batch coordinator for concurrent partial-download probes.
//!
//! This module provides the [`BatchResolver`] which fans a candidate list
//! out into one probe per remote URL, runs them all concurrently over one
//! shared transport, and merges each resolved probe back onto its candidate.
//!
//! # Overview
//!
//! - Inline `data:` candidates are decoded synchronously, before any transfer
//!   starts, and never reach the transport.
//! - Every remote candidate gets its own Tokio task in one `JoinSet` and its
//!   own [`Probe`] state; nothing mutable is shared between probes. Dropping
//!   a pending batch future aborts its transfers.
//! - The coordinator waits once, for all tasks, then restores input order.
//! - Rejected and failed candidates are absent from [`BatchResolver::resolve_all`];
//!   [`BatchResolver::probe_all`] reports them with their reason.
//!
//! # Example
//!
//! ```no_run
//! use image_probe::{BatchResolver, Candidate, TransportConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = BatchResolver::new(&TransportConfig::default())?;
//! let reports = resolver
//!     .probe_all(&[Candidate::new("https://example.com/logo.png")])
//!     .await;
//! for report in &reports {
//!     println!("{} -> {:?}", report.reference, report.outcome);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Probe`]: super::Probe

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::client::HttpTransport;
use super::config::{ConfigError, TransportConfig, TransportOverrides};
use super::error::ProbeFailure;
use super::probe::{ProbeOutcome, run_probe};
use super::transport::Transport;
use crate::candidate::{Candidate, ResultRecord};
use crate::inline::try_decode_embedded;

/// Hard failures of a batch call. Per-candidate problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Transport configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// A runtime for the blocking entry point could not be started.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Terminal outcome of one candidate, with diagnostics.
#[derive(Debug)]
pub struct ProbeReport {
    /// Position of the candidate in the input batch.
    pub index: usize,
    /// The candidate's reference (URL or data URI).
    pub reference: String,
    /// How the probe ended.
    pub outcome: ProbeOutcome,
    /// Body bytes consumed from the transport; zero for inline candidates.
    pub bytes_received: u64,
}

/// Outcome counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Candidates that produced image info.
    pub resolved: usize,
    /// Candidates sniffed as a disallowed type.
    pub rejected: usize,
    /// Candidates that failed (transport, truncation, malformed inline data).
    pub failed: usize,
    /// Candidates handled by the inline decoder.
    pub inline: usize,
}

impl BatchSummary {
    /// Counts outcomes across reports.
    #[must_use]
    pub fn from_reports(reports: &[ProbeReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match report.outcome {
                ProbeOutcome::Resolved(_) => summary.resolved += 1,
                ProbeOutcome::Rejected { .. } => summary.rejected += 1,
                ProbeOutcome::Failed(_) => summary.failed += 1,
            }
            if report.reference.starts_with(crate::candidate::DATA_URI_PREFIX) {
                summary.inline += 1;
            }
        }
        summary
    }

    /// Returns the number of candidates processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.resolved + self.rejected + self.failed
    }
}

/// Concurrent resolver for candidate batches.
///
/// The resolver holds one transport and can be reused across calls; each
/// call opens its transfers on that transport and releases them before
/// returning.
#[derive(Clone)]
pub struct BatchResolver {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for BatchResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchResolver").finish_non_exhaustive()
    }
}

impl BatchResolver {
    /// Creates a resolver over a new [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self, EngineError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(config)?)))
    }

    /// Creates a resolver over a caller-supplied transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Resolves a batch, keeping only candidates with image info.
    ///
    /// Results follow input order.
    pub async fn resolve_all(&self, candidates: &[Candidate]) -> Vec<ResultRecord> {
        let reports = self.probe_all(candidates).await;
        merge_resolved(candidates, reports)
    }

    /// Resolves a batch and reports every candidate's outcome, in input order.
    ///
    /// Waits for every probe to reach a terminal state. Individual probe
    /// failures, including task panics, are reported as failed outcomes.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn probe_all(&self, candidates: &[Candidate]) -> Vec<ProbeReport> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut reports = Vec::with_capacity(candidates.len());
        let mut probes = JoinSet::new();
        let mut task_indices = HashMap::new();

        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.is_inline() {
                reports.push(inline_report(index, candidate));
                continue;
            }

            let transport = Arc::clone(&self.transport);
            let url = candidate.value.clone();
            debug!(index, url = %url, "starting probe");
            let handle = probes.spawn(async move { run_probe(transport.as_ref(), &url).await });
            task_indices.insert(handle.id(), index);
        }

        debug!(task_count = probes.len(), "waiting for probes to finish");

        // Dropping the set aborts any probe still in flight.
        while let Some(joined) = probes.join_next_with_id().await {
            let (id, (outcome, bytes_received)) = match joined {
                Ok(finished) => finished,
                Err(e) => {
                    warn!(error = %e, "probe task panicked");
                    let failure = ProbeFailure::TaskAborted {
                        reason: e.to_string(),
                    };
                    (e.id(), (ProbeOutcome::Failed(failure), 0))
                }
            };
            let Some(&index) = task_indices.get(&id) else {
                warn!(task = %id, "finished probe has no candidate");
                continue;
            };
            reports.push(ProbeReport {
                index,
                reference: candidates[index].value.clone(),
                outcome,
                bytes_received,
            });
        }

        reports.sort_by_key(|report| report.index);

        let summary = BatchSummary::from_reports(&reports);
        info!(
            resolved = summary.resolved,
            rejected = summary.rejected,
            failed = summary.failed,
            inline = summary.inline,
            total = summary.total(),
            "batch complete"
        );
        reports
    }
}

/// Resolves a batch over a fresh HTTP transport built from the default
/// configuration with `overrides` applied.
///
/// An empty batch returns immediately without building a transport. The
/// transport and its connections are released before this returns.
///
/// # Errors
///
/// Returns [`EngineError`] only for invalid configuration or client build
/// failure; per-candidate problems are represented by absence in the result.
pub async fn resolve_all(
    candidates: &[Candidate],
    overrides: &TransportOverrides,
) -> Result<Vec<ResultRecord>, EngineError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let config = TransportConfig::default().with_overrides(overrides);
    let resolver = BatchResolver::new(&config)?;
    Ok(resolver.resolve_all(candidates).await)
}

fn inline_report(index: usize, candidate: &Candidate) -> ProbeReport {
    let outcome = match try_decode_embedded(&candidate.value) {
        Ok(info) => ProbeOutcome::Resolved(info),
        Err(error) => {
            debug!(index, error = %error, "inline candidate dropped");
            ProbeOutcome::Failed(ProbeFailure::MalformedInline(error))
        }
    };
    ProbeReport {
        index,
        reference: candidate.value.clone(),
        outcome,
        bytes_received: 0,
    }
}

fn merge_resolved(candidates: &[Candidate], reports: Vec<ProbeReport>) -> Vec<ResultRecord> {
    reports
        .into_iter()
        .filter_map(|report| match report.outcome {
            ProbeOutcome::Resolved(info) => candidates
                .get(report.index)
                .map(|candidate| ResultRecord::new(candidate.clone(), info)),
            ProbeOutcome::Rejected { .. } | ProbeOutcome::Failed(_) => None,
        })
        .collect()
}
