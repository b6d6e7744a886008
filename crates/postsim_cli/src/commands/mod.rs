//! CLI command implementations
//!
//! Each submodule implements a specific CLI command.

pub mod check;
pub mod irfs;
pub mod simulate;

use postsim_core::traits::ModelEngine;
use postsim_core::types::Posterior;

use crate::{CliError, Result};

/// Checks that `posterior` fills the model's full parameter vector
pub(crate) fn check_parameter_count<M: ModelEngine>(
    model: &M,
    posterior: &Posterior,
) -> Result<()> {
    let expected = model.n_parameters();
    let actual = posterior.layout().n_total();
    if expected != actual {
        return Err(CliError::InvalidArgument(format!(
            "posterior par_fix has {} value(s), model expects {}",
            actual, expected
        )));
    }
    Ok(())
}
