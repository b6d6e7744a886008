//! Simulate command implementation
//!
//! Posterior-predictive simulation of the observed data.

use postsim_core::traits::ModelEngine;
use postsim_core::types::InnovationMask;
use postsim_engine::executor::PooledExecutor;
use postsim_engine::sampled_sim_with;
use postsim_models::DemandSupplyModel;
use tracing::info;

use super::check_parameter_count;
use crate::config::RunConfig;
use crate::input;
use crate::output::{self, SimulationReport};
use crate::{CliError, Result};

/// Run the simulate command
pub fn run(
    posterior: &str,
    data: &str,
    mask: Option<&str>,
    output: Option<&str>,
    config: &RunConfig,
) -> Result<()> {
    info!("Starting posterior-predictive simulation...");
    info!("  Posterior: {}", posterior);
    info!("  Data: {}", data);
    info!("  Draws: {}", config.n_draws);

    let model = DemandSupplyModel::new();
    let posterior = input::read_posterior(posterior)?;
    check_parameter_count(&model, &posterior)?;

    let observed = input::read_table(data)?;
    if observed.values.ncols() != model.variable_names().len() {
        return Err(CliError::input(
            data,
            format!(
                "expected {} column(s) ({}), found {}",
                model.variable_names().len(),
                model.variable_names().join(", "),
                observed.values.ncols()
            ),
        ));
    }

    let mask = match mask {
        Some(path) => {
            info!("  Mask: {}", path);
            Some(InnovationMask::new(input::read_table(path)?.values))
        }
        None => None,
    };

    let executor = PooledExecutor::new(config.executor_config()?);
    let ensemble = sampled_sim_with(
        &executor,
        &model,
        &posterior,
        observed.values.view(),
        mask.as_ref(),
    )?;

    info!(
        "Simulation complete: {} draw(s), {} failed",
        ensemble.n_draws(),
        ensemble.failures.len()
    );

    let report = SimulationReport::new(&ensemble, model.variable_names(), model.shock_names());
    output::write_json(output, &report)
}
