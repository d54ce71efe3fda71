//! Progress reporting for crawls and offline batches.
//!
//! The driver loops report through [`ProgressCallback`] so they stay
//! decoupled from any rendering backend. The CLI supplies an `indicatif`
//! implementation; tests and library callers can use [`null_progress`].

use std::sync::Arc;

/// Receives progress updates from a running scrape.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total expected units of work (pages or files).
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Updates the message shown alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Marks progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
