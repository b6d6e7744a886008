//! Posterior-predictive simulation.

use ndarray::{Array3, ArrayView2};
use postsim_core::sampling::ChainSampler;
use postsim_core::traits::ModelEngine;
use postsim_core::types::{InnovationMask, Posterior};
use tracing::{info, info_span};

use super::run_draws;
use crate::error::EngineError;
use crate::executor::{DrawFailure, ExecutorConfig, PooledExecutor};
use crate::task::SimulationTask;

/// Stacked output of [`sampled_sim`].
///
/// Every array has the draw axis first, in ascending draw-index order.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationEnsemble {
    /// `(draws, periods, observables)`.
    pub observables: Array3<f64>,
    /// `(draws, periods, states)`.
    pub states: Array3<f64>,
    /// `(draws, periods, shocks)`.
    pub shocks: Array3<f64>,
    /// `(draws, periods, shocks)`, after masking.
    pub residuals: Array3<f64>,
    /// Draw index of each slice along axis 0.
    pub draw_indices: Vec<usize>,
    /// Draws skipped under the best-effort policy.
    pub failures: Vec<DrawFailure>,
}

impl SimulationEnsemble {
    /// Number of stacked draws.
    #[inline]
    pub fn n_draws(&self) -> usize {
        self.draw_indices.len()
    }

    /// `(observables, states, shocks, residuals)`.
    pub fn into_parts(self) -> (Array3<f64>, Array3<f64>, Array3<f64>, Array3<f64>) {
        (self.observables, self.states, self.shocks, self.residuals)
    }
}

/// Simulates the model forward under `config.n_draws()` posterior draws.
///
/// Each draw filters `observed` with its own parameter vector, replaces
/// residuals pinned by `mask`, and simulates from the filtered initial
/// state.
///
/// # Errors
///
/// - `Posterior` if the chain is unusable or the mask shape does not match
///   the residuals `(periods - 1, shocks)`
/// - `WorkerTask` naming the failing draw (fail-fast)
/// - `AllDrawsFailed` (best-effort)
/// - `Aggregation` if draws are not congruent
///
/// # Examples
///
/// ```rust
/// use ndarray::{array, Array3};
/// use postsim_core::types::{Chain, ParameterLayout, Posterior};
/// use postsim_engine::executor::ExecutorConfig;
/// use postsim_engine::sampled_sim;
/// use postsim_models::{simulate_observed, DemandSupplyModel, DemandSupplyParams};
///
/// let chain = Chain::new(Array3::from_elem((2, 20, 1), 0.2));
/// let layout = ParameterLayout::new(array![0.3, 0.8, 0.5, 0.1], vec![3]).unwrap();
/// let posterior = Posterior::new(chain, 10, layout).unwrap();
/// let observed = simulate_observed(&DemandSupplyParams::default(), 30, 1);
///
/// let config = ExecutorConfig::builder().n_draws(8).worker_count(2).build().unwrap();
/// let (observables, states, shocks, residuals) =
///     sampled_sim(&DemandSupplyModel::new(), &posterior, observed.view(), None, &config)
///         .unwrap()
///         .into_parts();
///
/// assert_eq!(observables.dim(), (8, 29, 2));
/// assert_eq!(residuals.dim(), (8, 29, 2));
/// # let _ = (states, shocks);
/// ```
pub fn sampled_sim<'a, M: ModelEngine>(
    model: &'a M,
    posterior: &Posterior,
    observed: ArrayView2<'a, f64>,
    mask: Option<&'a InnovationMask>,
    config: &ExecutorConfig,
) -> Result<SimulationEnsemble, EngineError> {
    sampled_sim_with(
        &PooledExecutor::new(config.clone()),
        model,
        posterior,
        observed,
        mask,
    )
}

/// [`sampled_sim`] on a caller-supplied executor (e.g. one with a progress
/// callback).
pub fn sampled_sim_with<'a, M: ModelEngine>(
    executor: &PooledExecutor,
    model: &'a M,
    posterior: &Posterior,
    observed: ArrayView2<'a, f64>,
    mask: Option<&'a InnovationMask>,
) -> Result<SimulationEnsemble, EngineError> {
    let config = executor.config();
    let span = info_span!("sampled_sim", n_draws = config.n_draws());
    let _guard = span.enter();

    posterior.validate()?;
    let sampler = ChainSampler::new(posterior)?;
    let task = SimulationTask::new(model, observed, mask);
    if let Some(mask) = mask {
        mask.check_shape(task.residual_shape())?;
    }

    info!(
        n_draws = config.n_draws(),
        workers = config.workers(),
        pool_size = sampler.pool_size(),
        periods = observed.nrows(),
        masked_cells = mask.map_or(0, |m| m.pinned_count()),
        "starting posterior-predictive simulation"
    );

    let (stacked, failures) = run_draws(executor, sampler, &task)?;

    info!(
        stacked = stacked.draw_indices.len(),
        failed = failures.len(),
        "posterior-predictive simulation finished"
    );

    Ok(SimulationEnsemble {
        observables: stacked.observables,
        states: stacked.states,
        shocks: stacked.shocks,
        residuals: stacked.residuals,
        draw_indices: stacked.draw_indices,
        failures,
    })
}
