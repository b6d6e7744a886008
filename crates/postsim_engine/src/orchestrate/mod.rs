//! Orchestrators: posterior draws in, stacked ensembles out.
//!
//! Each call validates the posterior, fans draws `0..n_draws` out over a
//! [`PooledExecutor`], and streams finished chunks into an incremental
//! stacker. Draw `i` is sampled with seed `base_seed + i`, so the same
//! configuration reproduces the same ensemble regardless of worker count.

mod irfs;
mod simulation;

pub use irfs::{sampled_irfs, sampled_irfs_with, IrfEnsemble, DEFAULT_HORIZON};
pub use simulation::{sampled_sim, sampled_sim_with, SimulationEnsemble};

use postsim_core::aggregate::{DrawStacker, StackableDraw};
use postsim_core::sampling::ChainSampler;

use crate::error::EngineError;
use crate::executor::{DrawFailure, PooledExecutor};
use crate::task::DrawTask;

type Stacked<D> = <<<D as DrawTask>::Output as StackableDraw>::Stacker as DrawStacker>::Stacked;

fn run_draws<D>(
    executor: &PooledExecutor,
    sampler: ChainSampler<'_>,
    task: &D,
) -> Result<(Stacked<D>, Vec<DrawFailure>), EngineError>
where
    D: DrawTask,
    D::Output: StackableDraw,
{
    let config = executor.config();
    let n_draws = config.n_draws();
    let mut stacker = <D::Output as StackableDraw>::stacker(n_draws);

    let failures = executor.run_streaming(
        n_draws,
        |index| task.run(index, sampler.sample(config.seed_for(index)).view()),
        |index, draw| stacker.push(index, draw).map_err(EngineError::from),
    )?;
    Ok((stacker.finish()?, failures))
}
