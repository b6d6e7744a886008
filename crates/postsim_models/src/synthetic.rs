//! Synthetic observed data for the demand/supply model.
//!
//! Used to build reproducible test fixtures and CLI demonstrations without
//! an external data file.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use super::demand_supply::{DemandSupplyParams, SHOCKS, VARIABLES};

/// Simulates `periods` observations starting from the zero state.
///
/// Row 0 is the initial state; rows `1..periods` are driven by standard
/// normal shocks drawn from a generator seeded with `seed`.
///
/// # Examples
///
/// ```rust
/// use postsim_models::{simulate_observed, DemandSupplyParams};
///
/// let data = simulate_observed(&DemandSupplyParams::default(), 50, 42);
/// assert_eq!(data.dim(), (50, 2));
/// assert_eq!(data, simulate_observed(&DemandSupplyParams::default(), 50, 42));
/// ```
pub fn simulate_observed(params: &DemandSupplyParams, periods: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let transition = params.transition();
    let impact = params.impact();

    let mut data = Array2::zeros((periods, VARIABLES.len()));
    for t in 1..periods {
        let shocks: ndarray::Array1<f64> = (0..SHOCKS.len())
            .map(|_| StandardNormal.sample(&mut rng))
            .collect();
        let next = transition.dot(&data.row(t - 1)) + impact.dot(&shocks);
        data.row_mut(t).assign(&next);
    }
    data
}
