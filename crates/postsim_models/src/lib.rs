//! # postsim_models: Reference Models (Layer 2)
//!
//! Concrete model engines implementing the `postsim_core` traits.
//!
//! ## Models
//!
//! - [`DemandSupplyModel`]: two-equation linear model with an output
//!   ("demand") and an inflation ("supply") shock, exactly observed so that
//!   filtering recovers residuals without error
//!
//! ## Usage Example
//!
//! ```rust
//! use postsim_core::traits::{ModelEngine, ShockSpec, StateSpaceSystem};
//! use postsim_models::{DemandSupplyModel, DemandSupplyParams};
//!
//! let model = DemandSupplyModel::new();
//! let mut system = model
//!     .configure(DemandSupplyParams::default().to_vector().view())
//!     .unwrap();
//! system.preprocess().unwrap();
//!
//! let irf = system
//!     .impulse_responses(&[ShockSpec::unit("demand")], &["output".to_string()], 20)
//!     .unwrap();
//! assert_eq!(irf.paths.dim(), (20, 1));
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod demand_supply;
pub mod synthetic;

pub use demand_supply::{
    DemandSupplyModel, DemandSupplyParams, DemandSupplySystem, N_PARAMETERS, PARAMETERS, SHOCKS,
    VARIABLES,
};
pub use synthetic::simulate_observed;
