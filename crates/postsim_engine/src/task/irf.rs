//! Impulse-response task.

use ndarray::ArrayView1;
use postsim_core::aggregate::IrfDraw;
use postsim_core::traits::{ImpulseResponse, ModelEngine, ShockSpec, StateSpaceSystem};
use tracing::trace;

use super::DrawTask;
use crate::error::TaskError;

/// Recomputes impulse responses to a fixed joint shock for one parameter
/// vector.
///
/// Labels are established once by [`IrfTask::dry_run`]; per-draw runs only
/// produce values.
#[derive(Debug)]
pub struct IrfTask<'a, M> {
    model: &'a M,
    shocks: &'a [ShockSpec],
    selection: &'a [String],
    horizon: usize,
}

impl<'a, M: ModelEngine> IrfTask<'a, M> {
    /// Creates a task for `shocks` applied jointly, reporting `selection`
    /// over `horizon` periods.
    pub fn new(
        model: &'a M,
        shocks: &'a [ShockSpec],
        selection: &'a [String],
        horizon: usize,
    ) -> Self {
        Self {
            model,
            shocks,
            selection,
            horizon,
        }
    }

    /// Impulse horizon.
    #[inline]
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    fn respond(&self, parameters: ArrayView1<'_, f64>) -> Result<ImpulseResponse, TaskError> {
        let mut system = self.model.configure(parameters)?;
        system.preprocess()?;
        Ok(system.impulse_responses(self.shocks, self.selection, self.horizon)?)
    }

    /// Runs once at `parameters` and returns the output-variable labels
    /// shared by every draw.
    pub fn dry_run(&self, parameters: ArrayView1<'_, f64>) -> Result<Vec<String>, TaskError> {
        Ok(self.respond(parameters)?.labels)
    }
}

impl<M: ModelEngine> DrawTask for IrfTask<'_, M> {
    type Output = IrfDraw;

    fn run(&self, index: usize, parameters: ArrayView1<'_, f64>) -> Result<IrfDraw, TaskError> {
        let response = self.respond(parameters)?;
        trace!(index, "impulse-response draw finished");
        Ok(IrfDraw {
            paths: response.paths,
            observables: response.observables,
            shocks: response.shocks,
        })
    }
}
