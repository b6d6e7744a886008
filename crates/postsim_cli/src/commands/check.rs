//! Check command implementation
//!
//! Validates a posterior file against the reference model and prints the
//! posterior point summaries.

use postsim_core::traits::ModelEngine;
use postsim_models::DemandSupplyModel;
use tracing::info;

use super::check_parameter_count;
use crate::input;
use crate::Result;

/// Run the check command
pub fn run(posterior_path: &str) -> Result<()> {
    info!("Checking posterior: {}", posterior_path);

    let model = DemandSupplyModel::new();
    let posterior = input::read_posterior(posterior_path)?;
    posterior.validate()?;
    check_parameter_count(&model, &posterior)?;

    let chain = posterior.chain();
    println!("Posterior: {}", posterior_path);
    println!(
        "  Chain: {} walker(s) x {} iteration(s) x {} free parameter(s)",
        chain.n_walkers(),
        chain.n_iterations(),
        chain.n_params()
    );
    println!("  Burn-in: {}", posterior.tune());
    println!("  Post-burn-in pool: {} draw(s)", posterior.pool_size());

    let means = posterior.means()?;
    let medians = posterior.medians()?;
    let free = posterior.layout().prior_arg();
    let names = model.parameter_names();

    println!();
    println!("  {:<10} {:>6} {:>12} {:>12}", "Parameter", "Free", "Mean", "Median");
    for (i, name) in names.iter().enumerate() {
        let marker = if free.contains(&i) { "yes" } else { "-" };
        println!(
            "  {:<10} {:>6} {:>12.6} {:>12.6}",
            name, marker, means[i], medians[i]
        );
    }

    if let Some(prior_names) = posterior.prior_names() {
        println!();
        println!("  Prior names: {}", prior_names.join(", "));
    }

    // The posterior mean is the dry-run point for impulse responses
    model.configure(means.view())?;
    info!("Posterior is usable with the {}-parameter reference model", names.len());
    Ok(())
}
