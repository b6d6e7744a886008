//! Impulse responses under parameter uncertainty.

use ndarray::Array3;
use postsim_core::sampling::ChainSampler;
use postsim_core::traits::{ModelEngine, ShockSpec};
use postsim_core::types::Posterior;
use tracing::{info, info_span};

use super::run_draws;
use crate::error::EngineError;
use crate::executor::{ConfigError, DrawFailure, ExecutorConfig, PooledExecutor};
use crate::task::IrfTask;

/// Impulse horizon used when none is given.
pub const DEFAULT_HORIZON: usize = 40;

/// Stacked output of [`sampled_irfs`].
#[derive(Clone, Debug, PartialEq)]
pub struct IrfEnsemble {
    /// `(draws, horizon, selected)`.
    pub paths: Array3<f64>,
    /// Column labels of `paths`, fixed by the dry run.
    pub labels: Vec<String>,
    /// `(draws, horizon, observables)`.
    pub observables: Array3<f64>,
    /// `(draws, horizon, shocks)`.
    pub shocks: Array3<f64>,
    /// Draw index of each slice along axis 0.
    pub draw_indices: Vec<usize>,
    /// Draws skipped under the best-effort policy.
    pub failures: Vec<DrawFailure>,
}

impl IrfEnsemble {
    /// Number of stacked draws.
    #[inline]
    pub fn n_draws(&self) -> usize {
        self.draw_indices.len()
    }

    /// `(paths, labels, (observables, shocks))`.
    pub fn into_parts(self) -> (Array3<f64>, Vec<String>, (Array3<f64>, Array3<f64>)) {
        (self.paths, self.labels, (self.observables, self.shocks))
    }
}

/// Recomputes impulse responses to the joint shock `shocks` under
/// `config.n_draws()` posterior draws.
///
/// A single dry run at the posterior mean fixes the labels; draws only
/// contribute values.
///
/// # Errors
///
/// - `Config` if `horizon` is 0
/// - `Posterior` if the chain is unusable
/// - `DryRun` if the model rejects the shocks or selection at the mean
/// - `WorkerTask` / `AllDrawsFailed` / `Aggregation` as for
///   [`sampled_sim`](super::sampled_sim)
pub fn sampled_irfs<M: ModelEngine>(
    model: &M,
    posterior: &Posterior,
    shocks: &[ShockSpec],
    selection: &[String],
    horizon: usize,
    config: &ExecutorConfig,
) -> Result<IrfEnsemble, EngineError> {
    sampled_irfs_with(
        &PooledExecutor::new(config.clone()),
        model,
        posterior,
        shocks,
        selection,
        horizon,
    )
}

/// [`sampled_irfs`] on a caller-supplied executor.
pub fn sampled_irfs_with<M: ModelEngine>(
    executor: &PooledExecutor,
    model: &M,
    posterior: &Posterior,
    shocks: &[ShockSpec],
    selection: &[String],
    horizon: usize,
) -> Result<IrfEnsemble, EngineError> {
    let config = executor.config();
    let span = info_span!("sampled_irfs", n_draws = config.n_draws(), horizon);
    let _guard = span.enter();

    if horizon == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "horizon",
            value: "must be at least 1".to_string(),
        }
        .into());
    }

    posterior.validate()?;
    let sampler = ChainSampler::new(posterior)?;
    let task = IrfTask::new(model, shocks, selection, horizon);

    let mean = posterior.means()?;
    let labels = task.dry_run(mean.view()).map_err(EngineError::DryRun)?;

    info!(
        n_draws = config.n_draws(),
        workers = config.workers(),
        pool_size = sampler.pool_size(),
        shocks = shocks.len(),
        labels = ?labels,
        "starting impulse-response draws"
    );

    let (stacked, failures) = run_draws(executor, sampler, &task)?;

    info!(
        stacked = stacked.draw_indices.len(),
        failed = failures.len(),
        "impulse-response draws finished"
    );

    Ok(IrfEnsemble {
        paths: stacked.paths,
        labels,
        observables: stacked.observables,
        shocks: stacked.shocks,
        draw_indices: stacked.draw_indices,
        failures,
    })
}
