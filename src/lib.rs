//! Image Probe Library
//!
//! This library determines the pixel dimensions and MIME type of a batch of
//! remote images without downloading them in full. Each transfer is inspected
//! chunk by chunk and cancelled as soon as the image header has been parsed,
//! or as soon as the content is known not to be a supported image.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`format`] - Byte signature classification and header dimension parsing
//! - [`inline`] - `data:` URI decoding without network I/O
//! - [`candidate`] - Input candidates and merged result records
//! - [`fetch`] - Streaming transport, per-transfer probes, batch coordination
//! - [`blocking`] - Synchronous entry point for callers without a runtime
//!
//! # Example
//!
//! ```no_run
//! use image_probe::{Candidate, TransportOverrides, resolve_all};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let candidates = vec![Candidate::new("https://example.com/photo.jpg")];
//! let records = resolve_all(&candidates, &TransportOverrides::default()).await?;
//! for record in &records {
//!     println!("{}: {}x{}", record.candidate.value, record.info.width, record.info.height);
//! }
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blocking;
pub mod candidate;
pub mod fetch;
pub mod format;
pub mod inline;

// Re-export commonly used types
pub use candidate::{Candidate, ImageInfo, ResultRecord};
pub use fetch::{
    BatchResolver, BatchSummary, ChunkDecision, ConfigError, EngineError, HttpTransport,
    IpPreference, Probe, ProbeFailure, ProbeOutcome, ProbeReport, Transport, TransportConfig,
    TransportError, TransportOverrides, resolve_all,
};
pub use format::{ALLOWED_MIME_TYPES, Classification, ImageMime, ParseOutcome, classify};
pub use inline::{InlineError, decode_embedded, try_decode_embedded};
