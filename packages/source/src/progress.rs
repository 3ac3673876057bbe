//! Progress reporting for downloads.
//!
//! [`ProgressCallback`] decouples fetch progress from any rendering
//! backend. The CLI plugs in `indicatif` spinners; library callers and
//! tests use [`null_progress`].

use std::sync::Arc;

/// Receives progress updates from a running download.
pub trait ProgressCallback: Send + Sync {
    /// Update the message displayed alongside the indicator.
    fn set_message(&self, msg: String);

    /// Mark the download as complete with a final message.
    fn finish(&self, msg: String);

    /// Mark the download as failed or abandoned and remove the indicator.
    fn finish_and_clear(&self);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
