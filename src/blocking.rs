//! Synchronous entry point.
//!
//! Runs a batch on a private current-thread Tokio runtime, for callers that
//! are not already inside an async context. Must not be called from within
//! a Tokio runtime.

use tokio::runtime::Builder;

use crate::candidate::{Candidate, ResultRecord};
use crate::fetch::{self, EngineError, TransportOverrides};

/// Blocking variant of [`fetch::resolve_all`].
///
/// # Errors
///
/// Returns [`EngineError::Runtime`] if the runtime cannot be created, and
/// otherwise the same errors as [`fetch::resolve_all`].
pub fn resolve_all(
    candidates: &[Candidate],
    overrides: &TransportOverrides,
) -> Result<Vec<ResultRecord>, EngineError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(EngineError::Runtime)?;
    runtime.block_on(fetch::resolve_all(candidates, overrides))
}
