//! Stacking of per-draw results.
//!
//! Per-draw outputs are stacked field by field into arrays whose leading
//! axis enumerates draws in task-index order and whose trailing axes keep
//! each draw's native shape. Non-congruent draws are rejected with
//! [`AggregationError::AggregationShape`](crate::types::AggregationError).

pub mod records;
pub mod stacker;

pub use records::{
    DrawStacker, IrfDraw, IrfStacker, ResultAggregator, SimulationDraw, SimulationStacker,
    StackableDraw, StackedIrfs, StackedSimulation,
};
pub use stacker::FieldStacker;
