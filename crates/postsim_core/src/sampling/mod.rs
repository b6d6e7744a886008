//! Reproducible posterior sampling.
//!
//! - [`DrawRng`]: seeded generator, one per draw
//! - [`ChainSampler`]: validated sampler producing copy-on-draw parameter vectors

pub mod rng;
pub mod sampler;

pub use rng::DrawRng;
pub use sampler::{sample_parameters, ChainSampler, Draw};
