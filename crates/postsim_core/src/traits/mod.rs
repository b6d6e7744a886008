//! Traits consumed by draw tasks.
//!
//! The model engine is an external collaborator; this module fixes the
//! interface a model must offer to be driven once per posterior draw.

pub mod model;

pub use model::{
    FilterOutput, ImpulseResponse, ModelEngine, ShockSpec, Simulation, StateSpaceSystem,
};
