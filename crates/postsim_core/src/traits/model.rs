//! Model-engine contract.
//!
//! A draw task drives a model engine through a fixed sequence of calls for
//! one parameter vector:
//!
//! ```text
//! ModelEngine::configure(parameters) -> System
//! System::preprocess()
//! System::create_filter(observed)
//! System::run_filter()          -> FilterOutput
//! System::extract_residuals()   -> residuals
//! System::simulate(residuals)   -> Simulation
//! ```
//!
//! or, for impulse responses, `configure -> preprocess -> impulse_responses`.
//!
//! The engine itself is shared read-only (`Sync`) across workers. All mutable
//! state lives in the per-draw `System` value, which never leaves its task.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::types::ModelError;

/// Filtered state estimates.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOutput {
    /// Filtered states, `(periods, states)`.
    pub states: Array2<f64>,
    /// Covariance of the final state estimate, `(states, states)`.
    pub covariance: Array2<f64>,
}

/// Forward simulation driven by a residual matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    /// Simulated observables, `(periods, observables)`.
    pub observables: Array2<f64>,
    /// Simulated states, `(periods, states)`.
    pub states: Array2<f64>,
    /// Shocks that drove the simulation, `(periods, shocks)`.
    pub shocks: Array2<f64>,
}

/// One shock impulse: `size` units of shock `name` hitting at `period`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShockSpec {
    /// Shock name as known to the model.
    pub name: String,
    /// Impulse size in shock standard deviations.
    #[cfg_attr(feature = "serde", serde(default = "default_size"))]
    pub size: f64,
    /// Period at which the impulse hits.
    #[cfg_attr(feature = "serde", serde(default))]
    pub period: usize,
}

#[cfg(feature = "serde")]
fn default_size() -> f64 {
    1.0
}

impl ShockSpec {
    /// Creates a shock specification.
    pub fn new(name: impl Into<String>, size: f64, period: usize) -> Self {
        Self {
            name: name.into(),
            size,
            period,
        }
    }

    /// One-standard-deviation impulse at period 0.
    pub fn unit(name: impl Into<String>) -> Self {
        Self::new(name, 1.0, 0)
    }
}

/// Impulse responses for a joint set of shocks.
#[derive(Clone, Debug, PartialEq)]
pub struct ImpulseResponse {
    /// Paths of the selected variables, `(horizon, selected)`.
    pub paths: Array2<f64>,
    /// Names of the selected variables, column order of `paths`.
    pub labels: Vec<String>,
    /// Observable paths, `(horizon, observables)`.
    pub observables: Array2<f64>,
    /// Applied shock paths, `(horizon, shocks)`.
    pub shocks: Array2<f64>,
}

/// A model specification that can be instantiated for a parameter vector.
///
/// Implementations must be free of interior mutability visible to other
/// draws: `configure` is called concurrently from many worker threads.
pub trait ModelEngine: Sync {
    /// Per-draw system (matrices, filter state).
    type System: StateSpaceSystem;

    /// Full parameter vector length the model expects.
    fn n_parameters(&self) -> usize;

    /// Names of all model variables (states).
    fn variable_names(&self) -> &[String];

    /// Names of the model's shocks.
    fn shock_names(&self) -> &[String];

    /// Instantiates the system matrices for `parameters`.
    fn configure(&self, parameters: ArrayView1<'_, f64>) -> Result<Self::System, ModelError>;
}

/// Model instance for one parameter vector.
pub trait StateSpaceSystem {
    /// Precomputes anything reused by filtering and simulation.
    fn preprocess(&mut self) -> Result<(), ModelError>;

    /// Prepares a filter over `observed`, shaped `(periods, observables)`.
    fn create_filter(&mut self, observed: ArrayView2<'_, f64>) -> Result<(), ModelError>;

    /// Runs the filter created by `create_filter`.
    fn run_filter(&mut self) -> Result<FilterOutput, ModelError>;

    /// Residuals implied by the last filter run, `(periods - 1, shocks)`.
    fn extract_residuals(&self) -> Result<Array2<f64>, ModelError>;

    /// Simulates forward from the filtered initial state using `residuals`.
    fn simulate(&self, residuals: ArrayView2<'_, f64>) -> Result<Simulation, ModelError>;

    /// Responses of `selection` to the joint impulse `shocks` over `horizon` periods.
    ///
    /// A shock whose `period` is not below `horizon` is an error.
    fn impulse_responses(
        &self,
        shocks: &[ShockSpec],
        selection: &[String],
        horizon: usize,
    ) -> Result<ImpulseResponse, ModelError>;
}
