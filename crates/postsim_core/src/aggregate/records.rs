//! Per-draw result records and their stacked counterparts.
//!
//! Each record type knows how to stack itself field by field through a
//! [`DrawStacker`]. [`ResultAggregator`] is the batch entry point; the
//! pooled executor drives the stackers incrementally instead.

use ndarray::{Array2, Array3, Ix2};

use super::stacker::FieldStacker;
use crate::types::AggregationError;

/// Incremental stacker for one record type.
pub trait DrawStacker {
    /// Per-draw record.
    type Draw;
    /// Stacked output.
    type Stacked;

    /// Appends the record of draw `index`; all fields are checked before any
    /// is stored.
    fn push(&mut self, index: usize, draw: Self::Draw) -> Result<(), AggregationError>;

    /// Number of draws stacked so far.
    fn len(&self) -> usize;

    /// Returns true if nothing has been stacked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the stacked output.
    fn finish(self) -> Result<Self::Stacked, AggregationError>;
}

/// A per-draw record that can be stacked along a leading draw axis.
pub trait StackableDraw: Sized {
    /// Stacker for this record type.
    type Stacker: DrawStacker<Draw = Self>;

    /// Creates an empty stacker sized for `expected_draws`.
    fn stacker(expected_draws: usize) -> Self::Stacker;
}

// =============================================================================
// Simulation records
// =============================================================================

/// Output of one posterior-predictive simulation draw.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationDraw {
    /// Simulated observables, `(periods, observables)`.
    pub observables: Array2<f64>,
    /// Simulated states, `(periods, states)`.
    pub states: Array2<f64>,
    /// Simulated shocks, `(periods, shocks)`.
    pub shocks: Array2<f64>,
    /// Filtered (and possibly masked) residuals, `(periods, shocks)`.
    pub residuals: Array2<f64>,
}

/// Simulation draws stacked along a leading draw axis.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedSimulation {
    /// `(draws, periods, observables)`.
    pub observables: Array3<f64>,
    /// `(draws, periods, states)`.
    pub states: Array3<f64>,
    /// `(draws, periods, shocks)`.
    pub shocks: Array3<f64>,
    /// `(draws, periods, shocks)`.
    pub residuals: Array3<f64>,
    /// Draw index of each slice along axis 0.
    pub draw_indices: Vec<usize>,
}

/// Stacker for [`SimulationDraw`].
#[derive(Clone, Debug)]
pub struct SimulationStacker {
    observables: FieldStacker<Ix2>,
    states: FieldStacker<Ix2>,
    shocks: FieldStacker<Ix2>,
    residuals: FieldStacker<Ix2>,
    draw_indices: Vec<usize>,
}

impl DrawStacker for SimulationStacker {
    type Draw = SimulationDraw;
    type Stacked = StackedSimulation;

    fn push(&mut self, index: usize, draw: SimulationDraw) -> Result<(), AggregationError> {
        self.observables.check(index, &draw.observables.view())?;
        self.states.check(index, &draw.states.view())?;
        self.shocks.check(index, &draw.shocks.view())?;
        self.residuals.check(index, &draw.residuals.view())?;

        self.observables.push(index, draw.observables.view())?;
        self.states.push(index, draw.states.view())?;
        self.shocks.push(index, draw.shocks.view())?;
        self.residuals.push(index, draw.residuals.view())?;
        self.draw_indices.push(index);
        Ok(())
    }

    fn len(&self) -> usize {
        self.draw_indices.len()
    }

    fn finish(self) -> Result<StackedSimulation, AggregationError> {
        Ok(StackedSimulation {
            observables: self.observables.finish()?,
            states: self.states.finish()?,
            shocks: self.shocks.finish()?,
            residuals: self.residuals.finish()?,
            draw_indices: self.draw_indices,
        })
    }
}

impl StackableDraw for SimulationDraw {
    type Stacker = SimulationStacker;

    fn stacker(expected_draws: usize) -> SimulationStacker {
        SimulationStacker {
            observables: FieldStacker::with_capacity("observables", expected_draws),
            states: FieldStacker::with_capacity("states", expected_draws),
            shocks: FieldStacker::with_capacity("shocks", expected_draws),
            residuals: FieldStacker::with_capacity("residuals", expected_draws),
            draw_indices: Vec::with_capacity(expected_draws),
        }
    }
}

// =============================================================================
// Impulse-response records
// =============================================================================

/// Output of one impulse-response draw.
///
/// Variable labels are not part of the record: they are fixed once per
/// orchestration call and shared by every draw.
#[derive(Clone, Debug, PartialEq)]
pub struct IrfDraw {
    /// Selected-variable paths, `(horizon, selected)`.
    pub paths: Array2<f64>,
    /// Observable paths, `(horizon, observables)`.
    pub observables: Array2<f64>,
    /// Applied shock paths, `(horizon, shocks)`.
    pub shocks: Array2<f64>,
}

/// Impulse-response draws stacked along a leading draw axis.
#[derive(Clone, Debug, PartialEq)]
pub struct StackedIrfs {
    /// `(draws, horizon, selected)`.
    pub paths: Array3<f64>,
    /// `(draws, horizon, observables)`.
    pub observables: Array3<f64>,
    /// `(draws, horizon, shocks)`.
    pub shocks: Array3<f64>,
    /// Draw index of each slice along axis 0.
    pub draw_indices: Vec<usize>,
}

/// Stacker for [`IrfDraw`].
#[derive(Clone, Debug)]
pub struct IrfStacker {
    paths: FieldStacker<Ix2>,
    observables: FieldStacker<Ix2>,
    shocks: FieldStacker<Ix2>,
    draw_indices: Vec<usize>,
}

impl DrawStacker for IrfStacker {
    type Draw = IrfDraw;
    type Stacked = StackedIrfs;

    fn push(&mut self, index: usize, draw: IrfDraw) -> Result<(), AggregationError> {
        self.paths.check(index, &draw.paths.view())?;
        self.observables.check(index, &draw.observables.view())?;
        self.shocks.check(index, &draw.shocks.view())?;

        self.paths.push(index, draw.paths.view())?;
        self.observables.push(index, draw.observables.view())?;
        self.shocks.push(index, draw.shocks.view())?;
        self.draw_indices.push(index);
        Ok(())
    }

    fn len(&self) -> usize {
        self.draw_indices.len()
    }

    fn finish(self) -> Result<StackedIrfs, AggregationError> {
        Ok(StackedIrfs {
            paths: self.paths.finish()?,
            observables: self.observables.finish()?,
            shocks: self.shocks.finish()?,
            draw_indices: self.draw_indices,
        })
    }
}

impl StackableDraw for IrfDraw {
    type Stacker = IrfStacker;

    fn stacker(expected_draws: usize) -> IrfStacker {
        IrfStacker {
            paths: FieldStacker::with_capacity("paths", expected_draws),
            observables: FieldStacker::with_capacity("observables", expected_draws),
            shocks: FieldStacker::with_capacity("shocks", expected_draws),
            draw_indices: Vec::with_capacity(expected_draws),
        }
    }
}

// =============================================================================
// Batch aggregation
// =============================================================================

/// Stacks complete lists of per-draw records.
pub struct ResultAggregator;

impl ResultAggregator {
    /// Stacks `draws`, taking list position as the draw index.
    ///
    /// # Errors
    ///
    /// - `NoDraws` if `draws` is empty
    /// - `AggregationShape` naming the first non-congruent draw
    pub fn stack<T: StackableDraw>(
        draws: Vec<T>,
    ) -> Result<<T::Stacker as DrawStacker>::Stacked, AggregationError> {
        Self::stack_indexed(draws.into_iter().enumerate())
    }

    /// Stacks `(draw_index, record)` pairs in iteration order.
    pub fn stack_indexed<T, I>(
        draws: I,
    ) -> Result<<T::Stacker as DrawStacker>::Stacked, AggregationError>
    where
        T: StackableDraw,
        I: IntoIterator<Item = (usize, T)>,
    {
        let draws = draws.into_iter();
        let mut stacker = T::stacker(draws.size_hint().0);
        for (index, draw) in draws {
            stacker.push(index, draw)?;
        }
        stacker.finish()
    }
}
