//! Call-scoped parallel execution of draw tasks.
//!
//! - [`ExecutorConfig`]: draw count, worker count, chunking, failure policy
//! - [`PooledExecutor`]: runs `0..n` on a rayon pool built for one call
//! - [`ProgressInfo`]: per-draw progress snapshots

mod config;
mod pool;
mod progress;

pub use config::{
    ConfigError, ExecutorConfig, ExecutorConfigBuilder, FailurePolicy, DEFAULT_DRAWS,
    DRAWS_PER_WORKER_CHUNK, MAX_DRAWS,
};
pub use pool::{DrawFailure, ExecutionOutcome, PooledExecutor};
pub use progress::{ProgressCallback, ProgressInfo};
