//! Progress reporting for bulk scoring.
//!
//! [`ProgressCallback`] keeps the bulk runner independent of how progress is
//! shown. The CLI renders it as an `indicatif` bar; library callers and
//! tests use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a bulk run.
///
/// Implementations must be `Send + Sync`: updates arrive from whichever
/// task finishes an item.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of properties in the run.
    fn set_total(&self, total: u64);

    /// Advances by `delta` finished properties.
    fn inc(&self, delta: u64);

    /// Replaces the status message.
    fn set_message(&self, msg: String);

    /// Marks the run complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
