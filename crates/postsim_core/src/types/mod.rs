//! Core data types for posterior-predictive analysis.
//!
//! This module provides:
//! - [`Chain`]: immutable `[walker, iteration, free_parameter]` MCMC chain
//! - [`ParameterLayout`]: `par_fix` template plus `prior_arg` index set
//! - [`Posterior`]: chain + burn-in + layout, with posterior mean/median vectors
//! - [`InnovationMask`]: NaN-or-value residual overrides
//! - Error types: [`PosteriorError`], [`ModelError`], [`AggregationError`]

pub mod chain;
pub mod error;
pub mod layout;
pub mod mask;
pub mod posterior;

pub use chain::Chain;
pub use error::{AggregationError, ModelError, PosteriorError};
pub use layout::ParameterLayout;
pub use mask::{mask_select, InnovationMask};
pub use posterior::Posterior;
