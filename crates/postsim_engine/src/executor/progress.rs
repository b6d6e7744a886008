//! Progress reporting for pooled runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Snapshot of a run's progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressInfo {
    /// Draws finished so far, successful or not.
    pub completed: usize,
    /// Draws that failed so far.
    pub failed: usize,
    /// Draws in the run.
    pub total: usize,
}

impl ProgressInfo {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Callback invoked from worker threads after every finished draw.
pub type ProgressCallback = Arc<dyn Fn(ProgressInfo) + Send + Sync>;

/// Shared counter updated by workers as draws finish.
pub(crate) struct ProgressTracker {
    total: usize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    log_every: usize,
    callback: Option<ProgressCallback>,
}

impl ProgressTracker {
    /// Logs roughly every tenth of the run.
    pub(crate) fn new(total: usize, callback: Option<ProgressCallback>) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            log_every: (total / 10).max(1),
            callback,
        }
    }

    pub(crate) fn record(&self, success: bool) {
        let failed = if success {
            self.failed.load(Ordering::Relaxed)
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed) + 1
        };
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;

        if completed % self.log_every == 0 || completed == self.total {
            tracing::info!(completed, failed, total = self.total, "draw progress");
        }
        if let Some(callback) = &self.callback {
            callback(ProgressInfo {
                completed,
                failed,
                total: self.total,
            });
        }
    }

    pub(crate) fn snapshot(&self) -> ProgressInfo {
        ProgressInfo {
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            total: self.total,
        }
    }
}
