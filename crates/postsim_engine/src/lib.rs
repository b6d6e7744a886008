//! # postsim_engine: Parallel Posterior Draws (Layer 3)
//!
//! ## Layer 3 (Engine) Role
//!
//! postsim_engine turns a posterior chain and a model engine into stacked
//! ensembles of per-draw results:
//! - Draw tasks driving a model once per parameter vector (`task`)
//! - A call-scoped rayon worker pool with ordered, chunked fan-in (`executor`)
//! - The `sampled_sim` and `sampled_irfs` orchestrators (`orchestrate`)
//!
//! ## Reproducibility
//!
//! Draw `i` is always sampled with seed `base_seed + i`. Worker count, chunk
//! size and scheduling order never change the result.
//!
//! ## Usage Example
//!
//! ```rust
//! use ndarray::{array, Array3};
//! use postsim_core::traits::ShockSpec;
//! use postsim_core::types::{Chain, ParameterLayout, Posterior};
//! use postsim_engine::executor::ExecutorConfig;
//! use postsim_engine::sampled_irfs;
//! use postsim_models::DemandSupplyModel;
//!
//! let chain = Chain::new(Array3::from_shape_fn((4, 60, 1), |(w, i, _)| {
//!     0.1 + 0.001 * (w * 60 + i) as f64
//! }));
//! let layout = ParameterLayout::new(array![0.3, 0.8, 0.5, 0.1], vec![3]).unwrap();
//! let posterior = Posterior::new(chain, 30, layout).unwrap();
//!
//! let config = ExecutorConfig::builder().n_draws(10).worker_count(2).build().unwrap();
//! let selection = vec!["output".to_string(), "inflation".to_string()];
//! let (paths, labels, _) = sampled_irfs(
//!     &DemandSupplyModel::new(),
//!     &posterior,
//!     &[ShockSpec::unit("demand")],
//!     &selection,
//!     20,
//!     &config,
//! )
//! .unwrap()
//! .into_parts();
//!
//! assert_eq!(paths.dim(), (10, 20, 2));
//! assert_eq!(labels, selection);
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod executor;
pub mod orchestrate;
pub mod task;

pub use error::{EngineError, TaskError};
pub use executor::{
    ConfigError, DrawFailure, ExecutionOutcome, ExecutorConfig, FailurePolicy, PooledExecutor,
    ProgressInfo,
};
pub use orchestrate::{
    sampled_irfs, sampled_irfs_with, sampled_sim, sampled_sim_with, IrfEnsemble,
    SimulationEnsemble, DEFAULT_HORIZON,
};
pub use task::{DrawTask, IrfTask, SimulationTask};
