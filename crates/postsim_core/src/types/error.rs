//! Error types for posterior handling, model engines and aggregation.
//!
//! This module provides structured error types using `thiserror`:
//! - `PosteriorError`: chain / parameter layout / mask inconsistencies
//! - `ModelError`: failures raised by a model engine for one parameter vector
//! - `AggregationError`: per-draw outputs that cannot be stacked

use thiserror::Error;

/// Errors raised while validating or sampling a posterior.
///
/// All variants are fatal to an orchestration call; callers are expected
/// to re-invoke with adjusted inputs (larger chain, smaller `tune`,
/// corrected mask shape).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PosteriorError {
    /// The post-burn-in pool `chain[:, tune:, :]` holds no draws.
    #[error(
        "No post-burn-in draws: chain has {walkers} walker(s) and {iterations} iteration(s), tune={tune}"
    )]
    EmptyChain {
        /// Number of walkers in the chain.
        walkers: usize,
        /// Number of iterations per walker.
        iterations: usize,
        /// Burn-in index.
        tune: usize,
    },

    /// The free-parameter index does not match the chain's parameter axis.
    #[error("Chain has {chain_params} free parameter(s) but prior_arg indexes {prior_arg_len}")]
    ShapeMismatch {
        /// Length of the chain's last axis.
        chain_params: usize,
        /// Length of `prior_arg`.
        prior_arg_len: usize,
    },

    /// A `prior_arg` entry points past the end of `par_fix`.
    #[error("prior_arg index {index} is out of range for par_fix of length {len}")]
    ParameterIndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Length of `par_fix`.
        len: usize,
    },

    /// A `prior_arg` entry occurs more than once.
    #[error("prior_arg contains index {0} more than once")]
    DuplicateParameterIndex(usize),

    /// Innovation mask shape differs from the residual shape it is applied to.
    #[error("Innovation mask has shape {actual:?}, residuals have shape {expected:?}")]
    MaskShape {
        /// Residual shape (periods, shocks).
        expected: (usize, usize),
        /// Mask shape (periods, shocks).
        actual: (usize, usize),
    },

    /// A mask cell outside the mask's shape was addressed.
    #[error("Mask cell ({period}, {shock}) is outside mask shape {shape:?}")]
    MaskIndexOutOfRange {
        /// Period index.
        period: usize,
        /// Shock index.
        shock: usize,
        /// Mask shape (periods, shocks).
        shape: (usize, usize),
    },
}

/// Errors raised by a model engine while processing one parameter vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Parameter vector length differs from the model's parameter count.
    #[error("Invalid parameter vector: expected {expected} values, got {actual}")]
    ParameterCount {
        /// Expected number of parameters.
        expected: usize,
        /// Supplied number of parameters.
        actual: usize,
    },

    /// A parameter value is outside its admissible region.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Description of the violation.
        reason: String,
    },

    /// Observed data does not fit the model's observables.
    #[error("Observed data has shape {actual:?}, expected at least {min_periods} period(s) of {observables} observable(s)")]
    DataShape {
        /// Minimum number of periods.
        min_periods: usize,
        /// Number of observables.
        observables: usize,
        /// Supplied shape (periods, columns).
        actual: (usize, usize),
    },

    /// Residuals handed to `simulate` do not fit the model's shocks.
    #[error("Residuals have {actual} column(s), model has {expected} shock(s)")]
    ResidualShape {
        /// Number of model shocks.
        expected: usize,
        /// Number of residual columns.
        actual: usize,
    },

    /// `run_filter` or `extract_residuals` was called before `create_filter`.
    #[error("Filter has not been created")]
    FilterNotCreated,

    /// Filtering failed.
    #[error("Filter failed: {0}")]
    Filter(String),

    /// Simulation failed.
    #[error("Simulation failed: {0}")]
    Simulation(String),

    /// Shock name not known to the model.
    #[error("Unknown shock: {0}")]
    UnknownShock(String),

    /// Variable name not known to the model.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
}

/// Errors raised while stacking per-draw results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    /// A draw's field is not congruent with the first draw's field.
    #[error("Draw {index} produced {field} with shape {actual:?}, expected {expected:?}")]
    AggregationShape {
        /// Field name (e.g. "observables").
        field: &'static str,
        /// Draw index of the offending result.
        index: usize,
        /// Shape established by the first stacked draw.
        expected: Vec<usize>,
        /// Shape of the offending draw.
        actual: Vec<usize>,
    },

    /// Nothing was pushed before finishing.
    #[error("No draws to aggregate")]
    NoDraws,

    /// The stacked buffer could not be laid out as an array.
    #[error("Failed to lay out stacked {field}: {message}")]
    Layout {
        /// Field name.
        field: &'static str,
        /// Underlying shape error.
        message: String,
    },
}
