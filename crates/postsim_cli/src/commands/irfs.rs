//! Irfs command implementation
//!
//! Impulse responses under posterior parameter uncertainty.

use postsim_core::traits::ModelEngine;
use postsim_engine::executor::PooledExecutor;
use postsim_engine::sampled_irfs_with;
use postsim_models::DemandSupplyModel;
use tracing::info;

use super::check_parameter_count;
use crate::config::RunConfig;
use crate::input;
use crate::output::{self, IrfReport};
use crate::{CliError, Result};

/// Run the irfs command
pub fn run(
    posterior: &str,
    shocks: &[String],
    select: &[String],
    output: Option<&str>,
    config: &RunConfig,
) -> Result<()> {
    if shocks.is_empty() {
        return Err(CliError::InvalidArgument(
            "at least one --shock is required".to_string(),
        ));
    }
    let impulses = shocks
        .iter()
        .map(|s| input::parse_shock(s))
        .collect::<Result<Vec<_>>>()?;

    let model = DemandSupplyModel::new();
    let selection = if select.is_empty() {
        model.variable_names().to_vec()
    } else {
        select.to_vec()
    };

    info!("Starting impulse responses...");
    info!("  Posterior: {}", posterior);
    info!("  Shocks: {}", shocks.join(", "));
    info!("  Variables: {}", selection.join(", "));
    info!("  Horizon: {}", config.horizon);
    info!("  Draws: {}", config.n_draws);

    let posterior = input::read_posterior(posterior)?;
    check_parameter_count(&model, &posterior)?;

    let executor = PooledExecutor::new(config.executor_config()?);
    let ensemble = sampled_irfs_with(
        &executor,
        &model,
        &posterior,
        &impulses,
        &selection,
        config.horizon,
    )?;

    info!(
        "Impulse responses complete: {} draw(s), {} failed",
        ensemble.n_draws(),
        ensemble.failures.len()
    );

    let report = IrfReport::new(&ensemble, &impulses, config.horizon);
    output::write_json(output, &report)
}
