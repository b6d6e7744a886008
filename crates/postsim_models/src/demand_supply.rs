//! Two-equation demand/supply state-space model.
//!
//! States and observables coincide: `x_t = (output_t, inflation_t)`.
//!
//! ```text
//! output_t    = rho * output_{t-1}                      + sigma * demand_t
//! inflation_t = phi * inflation_{t-1} + kappa * output_t + sigma * supply_t
//! ```
//!
//! In companion form `x_t = A x_{t-1} + B e_t` with
//!
//! ```text
//! A = | rho          0   |      B = sigma * | 1      0 |
//!     | kappa * rho  phi |                  | kappa  1 |
//! ```
//!
//! Because every state is observed without noise, filtering is exact and
//! residuals are recovered as `e_t = B^{-1} (x_t - A x_{t-1})`.
//!
//! Parameter vector layout: `[kappa, rho, phi, sigma]`.

use ndarray::{array, Array1, Array2, ArrayView1, ArrayView2};

use postsim_core::traits::{
    FilterOutput, ImpulseResponse, ModelEngine, ShockSpec, Simulation, StateSpaceSystem,
};
use postsim_core::types::ModelError;

/// Number of entries in the parameter vector.
pub const N_PARAMETERS: usize = 4;

/// Model variable names, state order.
pub const VARIABLES: [&str; 2] = ["output", "inflation"];

/// Model shock names, shock order.
pub const SHOCKS: [&str; 2] = ["demand", "supply"];

/// Parameter names, vector order.
pub const PARAMETERS: [&str; N_PARAMETERS] = ["kappa", "rho", "phi", "sigma"];

/// Structural parameters of the demand/supply model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DemandSupplyParams {
    /// Inflation response to output.
    pub kappa: f64,
    /// Output persistence.
    pub rho: f64,
    /// Inflation persistence.
    pub phi: f64,
    /// Shock standard deviation (> 0).
    pub sigma: f64,
}

impl Default for DemandSupplyParams {
    fn default() -> Self {
        Self {
            kappa: 0.3,
            rho: 0.8,
            phi: 0.5,
            sigma: 0.1,
        }
    }
}

impl DemandSupplyParams {
    /// Reads `[kappa, rho, phi, sigma]` and validates it.
    pub fn from_vector(parameters: ArrayView1<'_, f64>) -> Result<Self, ModelError> {
        if parameters.len() != N_PARAMETERS {
            return Err(ModelError::ParameterCount {
                expected: N_PARAMETERS,
                actual: parameters.len(),
            });
        }
        let params = Self {
            kappa: parameters[0],
            rho: parameters[1],
            phi: parameters[2],
            sigma: parameters[3],
        };
        params.validate()?;
        Ok(params)
    }

    /// Parameter vector in `[kappa, rho, phi, sigma]` order.
    pub fn to_vector(&self) -> Array1<f64> {
        array![self.kappa, self.rho, self.phi, self.sigma]
    }

    /// Checks finiteness and `sigma > 0`.
    pub fn validate(&self) -> Result<(), ModelError> {
        let values = [self.kappa, self.rho, self.phi, self.sigma];
        for (name, value) in PARAMETERS.iter().zip(values) {
            if !value.is_finite() {
                return Err(ModelError::InvalidParameter {
                    name: (*name).to_string(),
                    reason: format!("must be finite, got {}", value),
                });
            }
        }
        if self.sigma <= 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "sigma".to_string(),
                reason: format!("must be positive, got {}", self.sigma),
            });
        }
        Ok(())
    }

    /// Transition matrix `A`.
    pub fn transition(&self) -> Array2<f64> {
        array![[self.rho, 0.0], [self.kappa * self.rho, self.phi]]
    }

    /// Shock impact matrix `B`.
    pub fn impact(&self) -> Array2<f64> {
        array![[self.sigma, 0.0], [self.kappa * self.sigma, self.sigma]]
    }

    /// Inverse of the shock impact matrix.
    pub fn impact_inverse(&self) -> Array2<f64> {
        let s = 1.0 / self.sigma;
        array![[s, 0.0], [-self.kappa * s, s]]
    }
}

/// Model specification: names only; all numbers come from the parameter vector.
#[derive(Clone, Debug)]
pub struct DemandSupplyModel {
    variables: Vec<String>,
    shocks: Vec<String>,
}

impl Default for DemandSupplyModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DemandSupplyModel {
    /// Creates the model specification.
    pub fn new() -> Self {
        Self {
            variables: VARIABLES.iter().map(|s| s.to_string()).collect(),
            shocks: SHOCKS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parameter names in vector order.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        &PARAMETERS
    }
}

impl ModelEngine for DemandSupplyModel {
    type System = DemandSupplySystem;

    fn n_parameters(&self) -> usize {
        N_PARAMETERS
    }

    fn variable_names(&self) -> &[String] {
        &self.variables
    }

    fn shock_names(&self) -> &[String] {
        &self.shocks
    }

    fn configure(&self, parameters: ArrayView1<'_, f64>) -> Result<DemandSupplySystem, ModelError> {
        let params = DemandSupplyParams::from_vector(parameters)?;
        Ok(DemandSupplySystem::new(params))
    }
}

/// Demand/supply system for one parameter vector.
#[derive(Clone, Debug)]
pub struct DemandSupplySystem {
    params: DemandSupplyParams,
    transition: Array2<f64>,
    impact: Array2<f64>,
    impact_inverse: Option<Array2<f64>>,
    observed: Option<Array2<f64>>,
    filtered: Option<Array2<f64>>,
}

impl DemandSupplySystem {
    /// Builds the system matrices for `params`.
    pub fn new(params: DemandSupplyParams) -> Self {
        Self {
            params,
            transition: params.transition(),
            impact: params.impact(),
            impact_inverse: None,
            observed: None,
            filtered: None,
        }
    }

    /// Structural parameters of this system.
    pub fn params(&self) -> &DemandSupplyParams {
        &self.params
    }

    fn impact_inverse(&self) -> Result<&Array2<f64>, ModelError> {
        self.impact_inverse
            .as_ref()
            .ok_or_else(|| ModelError::Filter("system has not been preprocessed".to_string()))
    }

    fn step(&self, previous: ArrayView1<'_, f64>, shocks: ArrayView1<'_, f64>) -> Array1<f64> {
        self.transition.dot(&previous) + self.impact.dot(&shocks)
    }

    fn variable_index(name: &str) -> Result<usize, ModelError> {
        VARIABLES
            .iter()
            .position(|v| *v == name)
            .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))
    }

    fn shock_index(name: &str) -> Result<usize, ModelError> {
        SHOCKS
            .iter()
            .position(|s| *s == name)
            .ok_or_else(|| ModelError::UnknownShock(name.to_string()))
    }
}

impl StateSpaceSystem for DemandSupplySystem {
    fn preprocess(&mut self) -> Result<(), ModelError> {
        self.impact_inverse = Some(self.params.impact_inverse());
        Ok(())
    }

    fn create_filter(&mut self, observed: ArrayView2<'_, f64>) -> Result<(), ModelError> {
        if observed.ncols() != VARIABLES.len() || observed.nrows() < 2 {
            return Err(ModelError::DataShape {
                min_periods: 2,
                observables: VARIABLES.len(),
                actual: observed.dim(),
            });
        }
        self.observed = Some(observed.to_owned());
        self.filtered = None;
        Ok(())
    }

    fn run_filter(&mut self) -> Result<FilterOutput, ModelError> {
        self.impact_inverse()?;
        let observed = self.observed.as_ref().ok_or(ModelError::FilterNotCreated)?;
        if observed.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::Filter(
                "observed data contains non-finite values".to_string(),
            ));
        }
        let states = observed.clone();
        self.filtered = Some(states.clone());
        Ok(FilterOutput {
            states,
            covariance: Array2::zeros((VARIABLES.len(), VARIABLES.len())),
        })
    }

    fn extract_residuals(&self) -> Result<Array2<f64>, ModelError> {
        let inverse = self.impact_inverse()?;
        let states = self.filtered.as_ref().ok_or(ModelError::FilterNotCreated)?;

        let periods = states.nrows() - 1;
        let mut residuals = Array2::zeros((periods, SHOCKS.len()));
        for t in 0..periods {
            let innovation = &states.row(t + 1) - &self.transition.dot(&states.row(t));
            residuals.row_mut(t).assign(&inverse.dot(&innovation));
        }
        Ok(residuals)
    }

    fn simulate(&self, residuals: ArrayView2<'_, f64>) -> Result<Simulation, ModelError> {
        if residuals.ncols() != SHOCKS.len() {
            return Err(ModelError::ResidualShape {
                expected: SHOCKS.len(),
                actual: residuals.ncols(),
            });
        }
        let filtered = self.filtered.as_ref().ok_or(ModelError::FilterNotCreated)?;

        let mut states = Array2::zeros((residuals.nrows(), VARIABLES.len()));
        let mut previous = filtered.row(0).to_owned();
        for (t, shocks) in residuals.rows().into_iter().enumerate() {
            let next = self.step(previous.view(), shocks);
            states.row_mut(t).assign(&next);
            previous = next;
        }
        if states.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::Simulation(
                "simulated path is not finite".to_string(),
            ));
        }

        Ok(Simulation {
            observables: states.clone(),
            states,
            shocks: residuals.to_owned(),
        })
    }

    fn impulse_responses(
        &self,
        shocks: &[ShockSpec],
        selection: &[String],
        horizon: usize,
    ) -> Result<ImpulseResponse, ModelError> {
        let columns = selection
            .iter()
            .map(|name| Self::variable_index(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut impulses = Array2::zeros((horizon, SHOCKS.len()));
        for shock in shocks {
            let k = Self::shock_index(&shock.name)?;
            if shock.period >= horizon {
                return Err(ModelError::Simulation(format!(
                    "shock '{}' hits in period {}, beyond horizon {}",
                    shock.name, shock.period, horizon
                )));
            }
            impulses[[shock.period, k]] += shock.size;
        }

        let mut states = Array2::zeros((horizon, VARIABLES.len()));
        let mut previous = Array1::zeros(VARIABLES.len());
        for t in 0..horizon {
            let next = self.step(previous.view(), impulses.row(t));
            states.row_mut(t).assign(&next);
            previous = next;
        }

        let mut paths = Array2::zeros((horizon, columns.len()));
        for (j, &column) in columns.iter().enumerate() {
            paths.column_mut(j).assign(&states.column(column));
        }

        Ok(ImpulseResponse {
            paths,
            labels: selection.to_vec(),
            observables: states,
            shocks: impulses,
        })
    }
}
