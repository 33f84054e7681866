//! Partial-download fetch engine.
//!
//! This module streams remote images just far enough to read their headers.
//!
//! # Features
//!
//! - Many concurrent transfers over one pooled HTTP client
//! - Per-chunk classification and header parsing ([`Probe`])
//! - Mid-stream cancellation as soon as a verdict is reached
//! - Configurable timeouts, redirects, TLS verification, compression
//! - Pluggable [`Transport`] for custom or in-memory sources
//!
//! # Example
//!
//! ```no_run
//! use image_probe::fetch::{BatchResolver, TransportConfig, TransportOverrides};
//! use image_probe::Candidate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let overrides = TransportOverrides::from_json(r#"{"timeout_secs": 5}"#)?;
//! let config = TransportConfig::default().with_overrides(&overrides);
//! let resolver = BatchResolver::new(&config)?;
//! let records = resolver
//!     .resolve_all(&[Candidate::new("https://example.com/banner.gif")])
//!     .await;
//! println!("resolved {}", records.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
pub mod constants;
mod engine;
mod error;
mod probe;
mod transport;

pub use client::HttpTransport;
pub use config::{ConfigError, IpPreference, TransportConfig, TransportOverrides};
pub use engine::{BatchResolver, BatchSummary, EngineError, ProbeReport, resolve_all};
pub use error::{ProbeFailure, TransportError};
pub use probe::{ChunkDecision, Probe, ProbeOutcome, ProbePhase, run_probe};
pub use transport::{BodyStream, Transport};
