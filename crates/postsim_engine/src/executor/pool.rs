//! Pooled executor.
//!
//! [`PooledExecutor`] runs draw indices `0..n` on a rayon thread pool that
//! exists only for the duration of one call; its threads are joined before
//! the call returns. Draws are submitted in chunks;
//! each finished chunk is handed to the caller in index order before the
//! next chunk starts, so at most one chunk of results is buffered.
//!
//! # Ordering
//!
//! Completion order inside the pool is unspecified. Results always reach
//! the caller in ascending index order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use super::config::{ExecutorConfig, FailurePolicy};
use super::progress::{ProgressCallback, ProgressInfo, ProgressTracker};
use crate::error::{EngineError, TaskError};

/// A draw that failed under the best-effort policy.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawFailure {
    /// Draw index.
    pub index: usize,
    /// Cause.
    pub error: TaskError,
}

/// Results of [`PooledExecutor::run_all`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionOutcome<T> {
    /// Successful results as `(index, value)` in ascending index order.
    pub results: Vec<(usize, T)>,
    /// Failed draws in ascending index order (best-effort only).
    pub failures: Vec<DrawFailure>,
}

impl<T> ExecutionOutcome<T> {
    /// Successful values in index order.
    pub fn into_values(self) -> Vec<T> {
        self.results.into_iter().map(|(_, value)| value).collect()
    }

    /// Indices of the successful draws.
    pub fn indices(&self) -> Vec<usize> {
        self.results.iter().map(|(index, _)| *index).collect()
    }
}

/// Executes independent draw tasks on a call-scoped worker pool.
///
/// # Examples
///
/// ```rust
/// use postsim_engine::executor::{ExecutorConfig, PooledExecutor};
///
/// let config = ExecutorConfig::builder().worker_count(2).build().unwrap();
/// let executor = PooledExecutor::new(config);
///
/// let outcome = executor.run_all(5, |i| Ok(i * i)).unwrap();
/// assert_eq!(outcome.into_values(), vec![0, 1, 4, 9, 16]);
/// ```
#[derive(Clone)]
pub struct PooledExecutor {
    config: ExecutorConfig,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for PooledExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledExecutor")
            .field("config", &self.config)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl PooledExecutor {
    /// Creates an executor for `config`.
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            progress: None,
        }
    }

    /// Registers a callback invoked after every finished draw.
    ///
    /// The callback runs on worker threads.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressInfo) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs `task_fn` for every index in `0..n_tasks` and collects the results
    /// in index order.
    ///
    /// # Errors
    ///
    /// - `WorkerTask` for the lowest failing index under `FailFast`
    /// - `AllDrawsFailed` if every draw failed under `BestEffort`
    /// - `ThreadPool` if the pool cannot be created
    pub fn run_all<T, F>(
        &self,
        n_tasks: usize,
        task_fn: F,
    ) -> Result<ExecutionOutcome<T>, EngineError>
    where
        T: Send,
        F: Fn(usize) -> Result<T, TaskError> + Sync,
    {
        let mut results = Vec::with_capacity(n_tasks);
        let failures = self.run_streaming(n_tasks, task_fn, |index, value| {
            results.push((index, value));
            Ok(())
        })?;
        Ok(ExecutionOutcome { results, failures })
    }

    /// Runs `task_fn` for every index in `0..n_tasks`, passing each finished
    /// chunk to `sink` in index order.
    ///
    /// `sink` runs on the calling thread. An error from `sink` aborts the run.
    /// Returns the failed draws (always empty under `FailFast`). Worker
    /// threads are joined before this returns.
    pub fn run_streaming<T, F, S>(
        &self,
        n_tasks: usize,
        task_fn: F,
        mut sink: S,
    ) -> Result<Vec<DrawFailure>, EngineError>
    where
        T: Send,
        F: Fn(usize) -> Result<T, TaskError> + Sync,
        S: FnMut(usize, T) -> Result<(), EngineError>,
    {
        ThreadPoolBuilder::new()
            .num_threads(self.config.workers())
            .thread_name(|i| format!("draw-worker-{}", i))
            .build_scoped(
                |thread| thread.run(),
                |pool| self.run_chunks(pool, n_tasks, &task_fn, &mut sink),
            )
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?
    }

    fn run_chunks<T, F, S>(
        &self,
        pool: &ThreadPool,
        n_tasks: usize,
        task_fn: &F,
        sink: &mut S,
    ) -> Result<Vec<DrawFailure>, EngineError>
    where
        T: Send,
        F: Fn(usize) -> Result<T, TaskError> + Sync,
        S: FnMut(usize, T) -> Result<(), EngineError>,
    {
        let chunk_size = self.config.chunk_size();
        let fail_fast = self.config.failure_policy() == FailurePolicy::FailFast;
        let abort = AtomicBool::new(false);
        let progress = ProgressTracker::new(n_tasks, self.progress.clone());
        let mut failures = Vec::new();

        debug!(
            n_tasks,
            workers = pool.current_num_threads(),
            chunk_size,
            "starting pooled run"
        );

        let mut start = 0;
        while start < n_tasks {
            let end = (start + chunk_size).min(n_tasks);
            let outcomes: Vec<Option<Result<T, TaskError>>> = pool.install(|| {
                (start..end)
                    .into_par_iter()
                    .map(|index| {
                        if abort.load(Ordering::Relaxed) {
                            return None;
                        }
                        let result = self.execute(index, task_fn);
                        if fail_fast && result.is_err() {
                            abort.store(true, Ordering::Relaxed);
                        }
                        progress.record(result.is_ok());
                        Some(result)
                    })
                    .collect()
            });

            for (index, outcome) in (start..end).zip(outcomes) {
                match outcome {
                    Some(Ok(value)) => sink(index, value)?,
                    Some(Err(error)) if fail_fast => {
                        warn!(index, %error, "draw failed, aborting run");
                        return Err(EngineError::WorkerTask {
                            index,
                            source: error,
                        });
                    }
                    Some(Err(error)) => {
                        warn!(index, %error, "draw failed, skipping");
                        failures.push(DrawFailure { index, error });
                    }
                    None => {}
                }
            }
            debug!(start, end, "chunk finished");
            start = end;
        }

        let summary = progress.snapshot();
        debug!(
            completed = summary.completed,
            failed = summary.failed,
            "pooled run finished"
        );

        if n_tasks > 0 && failures.len() == n_tasks {
            let first = failures.swap_remove(0);
            return Err(EngineError::AllDrawsFailed {
                n_draws: n_tasks,
                first_index: first.index,
                first_error: first.error,
            });
        }
        Ok(failures)
    }

    fn execute<T, F>(&self, index: usize, task_fn: &F) -> Result<T, TaskError>
    where
        F: Fn(usize) -> Result<T, TaskError>,
    {
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| task_fn(index)))
            .unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(payload.as_ref()))));

        match (result, self.config.task_timeout()) {
            (Ok(value), Some(limit)) => {
                let elapsed = started.elapsed();
                if elapsed > limit {
                    Err(TaskError::Timeout { limit, elapsed })
                } else {
                    Ok(value)
                }
            }
            (result, _) => result,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postsim_core::types::ModelError;
    use std::sync::atomic::AtomicUsize;

    fn executor(workers: usize, policy: FailurePolicy) -> PooledExecutor {
        PooledExecutor::new(
            ExecutorConfig::builder()
                .worker_count(workers)
                .chunk_size(3)
                .failure_policy(policy)
                .build()
                .unwrap(),
        )
    }

    fn fail_on(index: usize, target: usize) -> Result<usize, TaskError> {
        if index == target {
            Err(TaskError::Model(ModelError::Simulation(format!(
                "draw {} diverged",
                index
            ))))
        } else {
            Ok(index)
        }
    }

    // ========================================================================
    // Ordering and chunking
    // ========================================================================

    #[test]
    fn test_results_in_index_order_across_chunks() {
        let outcome = executor(4, FailurePolicy::FailFast)
            .run_all(10, |i| Ok(i * 10))
            .unwrap();
        assert_eq!(outcome.indices(), (0..10).collect::<Vec<_>>());
        assert_eq!(outcome.into_values()[7], 70);
    }

    #[test]
    fn test_zero_tasks() {
        let outcome = executor(2, FailurePolicy::FailFast)
            .run_all(0, |i| Ok(i))
            .unwrap();
        assert!(outcome.results.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_sink_sees_chunks_in_order() {
        let mut seen = Vec::new();
        executor(3, FailurePolicy::FailFast)
            .run_streaming(
                8,
                |i| Ok(i),
                |index, value| {
                    assert_eq!(index, value);
                    seen.push(index);
                    Ok(())
                },
            )
            .unwrap();
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_sink_error_aborts() {
        let result = executor(2, FailurePolicy::FailFast).run_streaming(
            6,
            |i| Ok(i),
            |index, _| {
                if index == 4 {
                    Err(EngineError::ThreadPool("sink full".to_string()))
                } else {
                    Ok(())
                }
            },
        );
        assert_eq!(
            result,
            Err(EngineError::ThreadPool("sink full".to_string()))
        );
    }

    // ========================================================================
    // Failure policy
    // ========================================================================

    #[test]
    fn test_fail_fast_reports_index() {
        let result = executor(2, FailurePolicy::FailFast).run_all(6, |i| fail_on(i, 3));
        match result {
            Err(EngineError::WorkerTask { index, source }) => {
                assert_eq!(index, 3);
                assert!(matches!(source, TaskError::Model(_)));
            }
            other => panic!("expected WorkerTask error, got {:?}", other),
        }
    }

    #[test]
    fn test_fail_fast_skips_later_chunks() {
        let calls = AtomicUsize::new(0);
        let result = executor(1, FailurePolicy::FailFast).run_all(30, |i| {
            calls.fetch_add(1, Ordering::SeqCst);
            fail_on(i, 0)
        });
        assert!(result.is_err());
        // Only the first chunk of three can have started
        assert!(calls.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_best_effort_collects_failures() {
        let outcome = executor(2, FailurePolicy::BestEffort)
            .run_all(6, |i| fail_on(i, 3))
            .unwrap();
        assert_eq!(outcome.indices(), vec![0, 1, 2, 4, 5]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 3);
    }

    #[test]
    fn test_best_effort_all_failed() {
        let result = executor(2, FailurePolicy::BestEffort).run_all(4, |_| {
            Err::<usize, _>(TaskError::Panicked("always".to_string()))
        });
        assert!(matches!(
            result,
            Err(EngineError::AllDrawsFailed {
                n_draws: 4,
                first_index: 0,
                ..
            })
        ));
    }

    // ========================================================================
    // Panics and progress
    // ========================================================================

    #[test]
    fn test_panic_becomes_task_error() {
        let result = executor(2, FailurePolicy::FailFast).run_all(4, |i| {
            if i == 2 {
                panic!("bad draw");
            }
            Ok(i)
        });
        assert_eq!(
            result,
            Err(EngineError::WorkerTask {
                index: 2,
                source: TaskError::Panicked("bad draw".to_string()),
            })
        );
    }

    #[test]
    fn test_progress_callback_sees_every_draw() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let executor = executor(3, FailurePolicy::FailFast).with_progress(move |info| {
            assert_eq!(info.total, 9);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        executor.run_all(9, |i| Ok(i)).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 9);
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u32), "unknown panic payload");
    }
}
