//! Milestone notifications emitted by long-running tools.
//!
//! Reporters are advisory: a handler's result never depends on whether a
//! report was delivered.

use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, message: &str, progress: u32, total: u32);
}

/// Discards every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

#[async_trait]
impl ProgressReporter for NoProgress {
    async fn report(&self, _message: &str, _progress: u32, _total: u32) {}
}

/// Forwards reports to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

#[async_trait]
impl ProgressReporter for LogProgress {
    async fn report(&self, message: &str, progress: u32, total: u32) {
        debug!(progress, total, "{}", message);
    }
}
