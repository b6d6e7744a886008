//! Draw tasks.
//!
//! A draw task turns one parameter vector into one per-draw record by
//! driving a model engine. Tasks hold only shared, read-only inputs (model,
//! observed data, mask, shock list); every per-draw value is created inside
//! [`DrawTask::run`] and never outlives it.

mod irf;
mod simulation;

pub use irf::IrfTask;
pub use simulation::SimulationTask;

use ndarray::ArrayView1;

use crate::error::TaskError;

/// One independent unit of work per posterior draw.
pub trait DrawTask: Sync {
    /// Per-draw record.
    type Output: Send;

    /// Runs draw `index` with the full parameter vector `parameters`.
    fn run(
        &self,
        index: usize,
        parameters: ArrayView1<'_, f64>,
    ) -> Result<Self::Output, TaskError>;
}
