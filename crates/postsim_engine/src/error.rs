//! Error types for the draw engine.
//!
//! - `TaskError`: why one draw failed
//! - `EngineError`: why an orchestration call failed as a whole
//!
//! Every error raised after fan-out names the draw index it came from.

use std::time::Duration;

use postsim_core::types::{AggregationError, ModelError, PosteriorError};
use thiserror::Error;

use crate::executor::ConfigError;

/// Failure of a single draw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    /// The model engine rejected the parameter vector or failed to filter
    /// or simulate.
    #[error("Model engine failed: {0}")]
    Model(#[from] ModelError),

    /// The innovation mask could not be applied to the residuals.
    #[error("Innovation mask rejected: {0}")]
    Mask(#[from] PosteriorError),

    /// The draw finished after its soft deadline.
    #[error("Draw took {elapsed:?}, exceeding the {limit:?} timeout")]
    Timeout {
        /// Configured deadline.
        limit: Duration,
        /// Measured wall time.
        elapsed: Duration,
    },

    /// The draw panicked.
    #[error("Draw panicked: {0}")]
    Panicked(String),
}

/// Failure of an orchestration call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The posterior is unusable (empty pool, layout mismatch, mask shape).
    #[error(transparent)]
    Posterior(#[from] PosteriorError),

    /// A draw failed under the fail-fast policy.
    #[error("Worker task for draw {index} failed: {source}")]
    WorkerTask {
        /// Index of the failing draw.
        index: usize,
        /// Underlying cause.
        source: TaskError,
    },

    /// The impulse-response dry run at the posterior mean failed.
    #[error("Dry run at posterior mean failed: {0}")]
    DryRun(#[source] TaskError),

    /// Per-draw outputs could not be stacked.
    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    /// The executor configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every draw failed under the best-effort policy.
    #[error("All {n_draws} draws failed; first failure at draw {first_index}: {first_error}")]
    AllDrawsFailed {
        /// Number of draws attempted.
        n_draws: usize,
        /// Lowest failing index.
        first_index: usize,
        /// Cause of the lowest failing draw.
        first_error: TaskError,
    },
}

impl EngineError {
    /// Index of the draw this error is attributed to, if any.
    pub fn draw_index(&self) -> Option<usize> {
        match self {
            Self::WorkerTask { index, .. } => Some(*index),
            Self::AllDrawsFailed { first_index, .. } => Some(*first_index),
            Self::Aggregation(AggregationError::AggregationShape { index, .. }) => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_task_display_names_index() {
        let err = EngineError::WorkerTask {
            index: 3,
            source: TaskError::Model(ModelError::Simulation("diverged".to_string())),
        };
        let message = err.to_string();
        assert!(message.contains("draw 3"));
        assert!(message.contains("diverged"));
        assert_eq!(err.draw_index(), Some(3));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let err = EngineError::WorkerTask {
            index: 0,
            source: TaskError::Panicked("boom".to_string()),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Draw panicked: boom"));
    }

    #[test]
    fn test_from_conversions() {
        let err: EngineError = PosteriorError::DuplicateParameterIndex(2).into();
        assert!(matches!(err, EngineError::Posterior(_)));
        assert_eq!(err.draw_index(), None);

        let err: EngineError = AggregationError::NoDraws.into();
        assert!(matches!(err, EngineError::Aggregation(_)));

        let err: EngineError = ConfigError::InvalidDrawCount(0).into();
        assert!(matches!(err, EngineError::Config(_)));

        let err: TaskError = ModelError::FilterNotCreated.into();
        assert_eq!(err, TaskError::Model(ModelError::FilterNotCreated));
    }

    #[test]
    fn test_aggregation_error_carries_index() {
        let err = EngineError::Aggregation(AggregationError::AggregationShape {
            field: "paths",
            index: 7,
            expected: vec![4, 2],
            actual: vec![3, 2],
        });
        assert_eq!(err.draw_index(), Some(7));
    }
}
