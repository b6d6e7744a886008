//! Executor configuration.
//!
//! This module provides the validated configuration for a pooled run of
//! posterior draws and its builder.

use std::time::Duration;

use thiserror::Error;

/// Maximum number of draws allowed in one orchestration call.
pub const MAX_DRAWS: usize = 10_000_000;

/// Number of draws used when none is specified.
pub const DEFAULT_DRAWS: usize = 1000;

/// Chunks hold this many draws per worker unless overridden.
pub const DRAWS_PER_WORKER_CHUNK: usize = 4;

/// Configuration error for the pooled executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Draw count outside valid range [1, 10_000_000].
    #[error("Invalid draw count {0}: must be in range [1, 10_000_000]")]
    InvalidDrawCount(usize),

    /// Worker count of zero.
    #[error("Invalid worker count {0}: must be at least 1")]
    InvalidWorkerCount(usize),

    /// Chunk size of zero.
    #[error("Invalid chunk size {0}: must be at least 1")]
    InvalidChunkSize(usize),

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },
}

/// What happens to a run when individual draws fail.
///
/// - `FailFast`: the first failure aborts the run; draws not yet started
///   are skipped and the lowest failing index is reported
/// - `BestEffort`: failed draws are recorded and skipped; successful draws
///   are still aggregated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Abort the whole call on the first failed draw.
    #[default]
    FailFast,

    /// Aggregate the successful draws and report the failed ones.
    BestEffort,
}

/// Pooled executor configuration.
///
/// Immutable once built. Use [`ExecutorConfigBuilder`] to construct
/// instances; [`ExecutorConfig::default`] gives 1000 draws on all cores.
///
/// # Examples
///
/// ```rust
/// use postsim_engine::executor::{ExecutorConfig, FailurePolicy};
///
/// let config = ExecutorConfig::builder()
///     .n_draws(500)
///     .worker_count(4)
///     .failure_policy(FailurePolicy::BestEffort)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_draws(), 500);
/// assert_eq!(config.workers(), 4);
/// assert_eq!(config.chunk_size(), 16);
/// assert_eq!(config.seed_for(7), 7);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutorConfig {
    /// Number of draws to run.
    n_draws: usize,
    /// Worker threads; `None` means one per available core.
    worker_count: Option<usize>,
    /// Draws submitted per chunk; `None` means 4 per worker.
    chunk_size: Option<usize>,
    /// Behaviour on failed draws.
    failure_policy: FailurePolicy,
    /// Soft per-draw deadline.
    task_timeout: Option<Duration>,
    /// Seed of draw 0; draw `i` uses `base_seed + i`.
    base_seed: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            n_draws: DEFAULT_DRAWS,
            worker_count: None,
            chunk_size: None,
            failure_policy: FailurePolicy::FailFast,
            task_timeout: None,
            base_seed: 0,
        }
    }
}

impl ExecutorConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }

    /// Returns the number of draws.
    #[inline]
    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    /// Returns the requested worker count, if any.
    #[inline]
    pub fn worker_count(&self) -> Option<usize> {
        self.worker_count
    }

    /// Returns the effective worker count.
    pub fn workers(&self) -> usize {
        self.worker_count.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Returns the effective chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
            .unwrap_or_else(|| self.workers() * DRAWS_PER_WORKER_CHUNK)
            .max(1)
    }

    /// Returns the failure policy.
    #[inline]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Returns the soft per-draw deadline.
    #[inline]
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout
    }

    /// Returns the seed of draw 0.
    #[inline]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Seed for draw `index`.
    #[inline]
    pub fn seed_for(&self, index: usize) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }

    /// Returns a copy with a different draw count, validated.
    pub fn with_n_draws(&self, n_draws: usize) -> Result<Self, ConfigError> {
        let config = Self {
            n_draws,
            ..self.clone()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `n_draws` is 0 or greater than 10,000,000
    /// - `worker_count` or `chunk_size` is 0
    /// - `task_timeout` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_draws == 0 || self.n_draws > MAX_DRAWS {
            return Err(ConfigError::InvalidDrawCount(self.n_draws));
        }
        if self.worker_count == Some(0) {
            return Err(ConfigError::InvalidWorkerCount(0));
        }
        if self.chunk_size == Some(0) {
            return Err(ConfigError::InvalidChunkSize(0));
        }
        if self.task_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidParameter {
                name: "task_timeout",
                value: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`ExecutorConfig`].
///
/// Unset fields take the defaults of [`ExecutorConfig::default`].
#[derive(Clone, Debug, Default)]
pub struct ExecutorConfigBuilder {
    n_draws: Option<usize>,
    worker_count: Option<usize>,
    chunk_size: Option<usize>,
    failure_policy: FailurePolicy,
    task_timeout: Option<Duration>,
    base_seed: u64,
}

impl ExecutorConfigBuilder {
    /// Sets the number of draws.
    ///
    /// # Arguments
    ///
    /// * `n_draws` - Number of draws in [1, 10_000_000]
    #[inline]
    pub fn n_draws(mut self, n_draws: usize) -> Self {
        self.n_draws = Some(n_draws);
        self
    }

    /// Sets the number of worker threads.
    #[inline]
    pub fn worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = Some(worker_count);
        self
    }

    /// Sets an optional worker count; `None` uses every available core.
    #[inline]
    pub fn maybe_worker_count(mut self, worker_count: Option<usize>) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Sets the number of draws submitted per chunk.
    ///
    /// Bounds how many finished but not yet stacked draw results are held
    /// in memory at once.
    #[inline]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Sets the failure policy.
    #[inline]
    pub fn failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Sets the soft per-draw deadline.
    ///
    /// Draws are never interrupted; a draw that finishes after the deadline
    /// is treated as failed.
    #[inline]
    pub fn task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }

    /// Sets the seed of draw 0.
    #[inline]
    pub fn base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any value is out of range.
    pub fn build(self) -> Result<ExecutorConfig, ConfigError> {
        let config = ExecutorConfig {
            n_draws: self.n_draws.unwrap_or(DEFAULT_DRAWS),
            worker_count: self.worker_count,
            chunk_size: self.chunk_size,
            failure_policy: self.failure_policy,
            task_timeout: self.task_timeout,
            base_seed: self.base_seed,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Builder
    // ========================================================================

    #[test]
    fn test_builder_defaults() {
        let config = ExecutorConfig::builder().build().unwrap();

        assert_eq!(config, ExecutorConfig::default());
        assert_eq!(config.n_draws(), DEFAULT_DRAWS);
        assert_eq!(config.worker_count(), None);
        assert!(config.workers() >= 1);
        assert_eq!(config.failure_policy(), FailurePolicy::FailFast);
        assert_eq!(config.task_timeout(), None);
        assert_eq!(config.base_seed(), 0);
    }

    #[test]
    fn test_builder_all_fields() {
        let config = ExecutorConfig::builder()
            .n_draws(20)
            .worker_count(3)
            .chunk_size(5)
            .failure_policy(FailurePolicy::BestEffort)
            .task_timeout(Duration::from_secs(2))
            .base_seed(100)
            .build()
            .unwrap();

        assert_eq!(config.n_draws(), 20);
        assert_eq!(config.workers(), 3);
        assert_eq!(config.chunk_size(), 5);
        assert_eq!(config.failure_policy(), FailurePolicy::BestEffort);
        assert_eq!(config.task_timeout(), Some(Duration::from_secs(2)));
        assert_eq!(config.seed_for(0), 100);
        assert_eq!(config.seed_for(5), 105);
    }

    #[test]
    fn test_default_chunk_size_scales_with_workers() {
        let config = ExecutorConfig::builder().worker_count(6).build().unwrap();
        assert_eq!(config.chunk_size(), 24);
    }

    #[test]
    fn test_seed_wraps() {
        let config = ExecutorConfig::builder().base_seed(u64::MAX).build().unwrap();
        assert_eq!(config.seed_for(1), 0);
    }

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_invalid_zero_draws() {
        let result = ExecutorConfig::builder().n_draws(0).build();
        assert_eq!(result, Err(ConfigError::InvalidDrawCount(0)));
    }

    #[test]
    fn test_invalid_too_many_draws() {
        let result = ExecutorConfig::builder().n_draws(MAX_DRAWS + 1).build();
        assert!(matches!(result, Err(ConfigError::InvalidDrawCount(_))));
    }

    #[test]
    fn test_invalid_zero_workers() {
        let result = ExecutorConfig::builder().worker_count(0).build();
        assert_eq!(result, Err(ConfigError::InvalidWorkerCount(0)));
    }

    #[test]
    fn test_invalid_zero_chunk() {
        let result = ExecutorConfig::builder().chunk_size(0).build();
        assert_eq!(result, Err(ConfigError::InvalidChunkSize(0)));
    }

    #[test]
    fn test_invalid_zero_timeout() {
        let result = ExecutorConfig::builder()
            .task_timeout(Duration::ZERO)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter {
                name: "task_timeout",
                ..
            })
        ));
    }

    #[test]
    fn test_with_n_draws() {
        let config = ExecutorConfig::builder().worker_count(2).build().unwrap();
        let smaller = config.with_n_draws(5).unwrap();
        assert_eq!(smaller.n_draws(), 5);
        assert_eq!(smaller.workers(), 2);
        assert!(config.with_n_draws(0).is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidDrawCount(0);
        assert!(err.to_string().contains("Invalid draw count 0"));

        let err = ConfigError::InvalidParameter {
            name: "task_timeout",
            value: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("task_timeout"));
    }
}
