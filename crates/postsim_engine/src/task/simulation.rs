//! Posterior-predictive simulation task.

use ndarray::{ArrayView1, ArrayView2};
use postsim_core::aggregate::SimulationDraw;
use postsim_core::traits::{ModelEngine, StateSpaceSystem};
use postsim_core::types::InnovationMask;
use tracing::trace;

use super::DrawTask;
use crate::error::TaskError;

/// Filters the observed data under one parameter vector, optionally pins
/// residuals through an innovation mask, and simulates forward.
///
/// Sequence per draw: `configure -> preprocess -> create_filter ->
/// run_filter -> extract_residuals -> mask -> simulate`.
#[derive(Debug)]
pub struct SimulationTask<'a, M> {
    model: &'a M,
    observed: ArrayView2<'a, f64>,
    mask: Option<&'a InnovationMask>,
}

impl<'a, M: ModelEngine> SimulationTask<'a, M> {
    /// Creates a task over `observed`, shaped `(periods, observables)`.
    pub fn new(
        model: &'a M,
        observed: ArrayView2<'a, f64>,
        mask: Option<&'a InnovationMask>,
    ) -> Self {
        Self {
            model,
            observed,
            mask,
        }
    }

    /// Shape of the residual matrix every draw produces.
    pub fn residual_shape(&self) -> (usize, usize) {
        (
            self.observed.nrows().saturating_sub(1),
            self.model.shock_names().len(),
        )
    }
}

impl<M: ModelEngine> DrawTask for SimulationTask<'_, M> {
    type Output = SimulationDraw;

    fn run(
        &self,
        index: usize,
        parameters: ArrayView1<'_, f64>,
    ) -> Result<SimulationDraw, TaskError> {
        let mut system = self.model.configure(parameters)?;
        system.preprocess()?;
        system.create_filter(self.observed)?;
        system.run_filter()?;

        let mut residuals = system.extract_residuals()?;
        if let Some(mask) = self.mask {
            mask.apply(&mut residuals)?;
        }

        let simulation = system.simulate(residuals.view())?;
        trace!(index, "simulation draw finished");

        Ok(SimulationDraw {
            observables: simulation.observables,
            states: simulation.states,
            shocks: simulation.shocks,
            residuals,
        })
    }
}
