//! # postsim_core: Foundation for Posterior-Predictive Simulation
//!
//! ## Layer 1 (Foundation) Role
//!
//! postsim_core is the bottom layer of the workspace, providing:
//! - Posterior chain and parameter layout types (`types`)
//! - Innovation masks with the NaN mask-select rule (`types::mask`)
//! - Reproducible, copy-on-draw chain sampling (`sampling`)
//! - The model-engine contract consumed by draw tasks (`traits`)
//! - Stacking of per-draw outputs along a leading draw axis (`aggregate`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other postsim_* crates, with minimal external dependencies:
//! - ndarray: chain, draw and stacked result arrays
//! - rand: seeded per-draw generators
//! - thiserror: structured error types
//! - serde: serialisation of shock specifications (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use ndarray::{array, Array3};
//! use postsim_core::sampling::ChainSampler;
//! use postsim_core::types::{Chain, ParameterLayout, Posterior};
//!
//! // 2 walkers, 4 iterations, 1 free parameter
//! let chain = Chain::new(Array3::from_shape_fn((2, 4, 1), |(w, i, _)| (w * 10 + i) as f64));
//! let layout = ParameterLayout::new(array![0.5, 0.0], vec![1]).unwrap();
//! let posterior = Posterior::new(chain, 2, layout).unwrap();
//!
//! let sampler = ChainSampler::new(&posterior).unwrap();
//! let draw = sampler.sample(7);
//!
//! // Fixed positions keep their template value
//! assert_eq!(draw[0], 0.5);
//! // Same seed, same draw
//! assert_eq!(draw, sampler.sample(7));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for `ShockSpec`

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod aggregate;
pub mod sampling;
pub mod traits;
pub mod types;

pub use aggregate::{
    DrawStacker, FieldStacker, IrfDraw, IrfStacker, ResultAggregator, SimulationDraw,
    SimulationStacker, StackableDraw, StackedIrfs, StackedSimulation,
};
pub use sampling::{ChainSampler, Draw, DrawRng};
pub use traits::{
    FilterOutput, ImpulseResponse, ModelEngine, ShockSpec, Simulation, StateSpaceSystem,
};
pub use types::{
    AggregationError, Chain, InnovationMask, ModelError, ParameterLayout, Posterior,
    PosteriorError,
};
