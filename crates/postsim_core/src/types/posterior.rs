//! Posterior source: chain, burn-in index and parameter layout.
//!
//! [`Posterior`] is the read-only input of every orchestration call. It is
//! usually assembled from a stored estimation result; loading that result
//! from disk is the caller's business.

use ndarray::{s, Array1};

use super::chain::Chain;
use super::error::PosteriorError;
use super::layout::ParameterLayout;

/// MCMC posterior with its burn-in index and fixed/free parameter layout.
///
/// # Invariants
///
/// - `layout.n_free() == chain.n_params()` (checked at construction)
/// - `tune < chain.n_iterations()` (checked by [`Posterior::validate`],
///   since `tune` is commonly adjusted after loading)
///
/// # Examples
///
/// ```rust
/// use ndarray::{array, Array3};
/// use postsim_core::types::{Chain, ParameterLayout, Posterior};
///
/// let chain = Chain::new(Array3::from_elem((2, 10, 1), 3.0));
/// let layout = ParameterLayout::new(array![1.0, 0.0], vec![1]).unwrap();
/// let posterior = Posterior::new(chain, 5, layout).unwrap();
///
/// assert_eq!(posterior.means().unwrap().to_vec(), vec![1.0, 3.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Posterior {
    chain: Chain,
    tune: usize,
    layout: ParameterLayout,
    prior_names: Option<Vec<String>>,
}

impl Posterior {
    /// Creates a posterior source.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `layout.n_free() != chain.n_params()`.
    pub fn new(chain: Chain, tune: usize, layout: ParameterLayout) -> Result<Self, PosteriorError> {
        if layout.n_free() != chain.n_params() {
            return Err(PosteriorError::ShapeMismatch {
                chain_params: chain.n_params(),
                prior_arg_len: layout.n_free(),
            });
        }
        Ok(Self {
            chain,
            tune,
            layout,
            prior_names: None,
        })
    }

    /// Replaces the burn-in index.
    pub fn with_tune(mut self, tune: usize) -> Self {
        self.tune = tune;
        self
    }

    /// Attaches free-parameter names, one per chain parameter.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if the name count differs from the chain's
    /// parameter count.
    pub fn with_prior_names(mut self, names: Vec<String>) -> Result<Self, PosteriorError> {
        if names.len() != self.chain.n_params() {
            return Err(PosteriorError::ShapeMismatch {
                chain_params: self.chain.n_params(),
                prior_arg_len: names.len(),
            });
        }
        self.prior_names = Some(names);
        Ok(self)
    }

    /// The stored chain.
    #[inline]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Burn-in index.
    #[inline]
    pub fn tune(&self) -> usize {
        self.tune
    }

    /// Fixed/free parameter layout.
    #[inline]
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// Free-parameter names, if attached.
    #[inline]
    pub fn prior_names(&self) -> Option<&[String]> {
        self.prior_names.as_deref()
    }

    /// Number of usable post-burn-in draws.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.chain.pool_size(self.tune)
    }

    /// Checks that the post-burn-in pool is non-empty.
    pub fn validate(&self) -> Result<(), PosteriorError> {
        self.chain.check_pool(self.tune)
    }

    /// Full parameter vector with free positions set to their posterior mean.
    ///
    /// Returns a new vector; the template is not modified.
    pub fn means(&self) -> Result<Array1<f64>, PosteriorError> {
        self.summarise(|values| values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Full parameter vector with free positions set to their posterior median.
    ///
    /// For an even number of draws the two middle values are averaged.
    pub fn medians(&self) -> Result<Array1<f64>, PosteriorError> {
        self.summarise(|values| {
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                0.5 * (values[mid - 1] + values[mid])
            } else {
                values[mid]
            }
        })
    }

    fn summarise<F>(&self, mut statistic: F) -> Result<Array1<f64>, PosteriorError>
    where
        F: FnMut(&mut Vec<f64>) -> f64,
    {
        let post = self.chain.post_burn_in(self.tune)?;
        let free: Array1<f64> = (0..self.chain.n_params())
            .map(|p| {
                let mut values: Vec<f64> = post.slice(s![.., .., p]).iter().copied().collect();
                statistic(&mut values)
            })
            .collect();
        Ok(self.layout.overlay(free.view()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array3};

    fn posterior(tune: usize) -> Posterior {
        // walker w, iteration i -> parameter 0 = i, parameter 1 = 10 * w
        let chain = Chain::new(Array3::from_shape_fn((2, 6, 2), |(w, i, p)| {
            if p == 0 {
                i as f64
            } else {
                10.0 * w as f64
            }
        }));
        let layout = ParameterLayout::new(array![7.0, 0.0, 0.0], vec![2, 1]).unwrap();
        Posterior::new(chain, tune, layout).unwrap()
    }

    #[test]
    fn test_new_shape_mismatch() {
        let chain = Chain::new(Array3::zeros((4, 100, 3)));
        let layout = ParameterLayout::new(array![1.0, 1.0, 1.0], vec![1, 2]).unwrap();
        let result = Posterior::new(chain, 50, layout);
        assert!(matches!(
            result,
            Err(PosteriorError::ShapeMismatch {
                chain_params: 3,
                prior_arg_len: 2
            })
        ));
    }

    #[test]
    fn test_validate_empty_after_tune() {
        let p = posterior(6);
        assert!(matches!(
            p.validate(),
            Err(PosteriorError::EmptyChain { tune: 6, .. })
        ));
        assert!(posterior(5).validate().is_ok());
    }

    #[test]
    fn test_with_tune() {
        let p = posterior(0).with_tune(3);
        assert_eq!(p.tune(), 3);
        assert_eq!(p.pool_size(), 6);
    }

    #[test]
    fn test_means() {
        let means = posterior(2).means().unwrap();
        // param 0 over iterations 2..6 -> 3.5, stored at position 2
        // param 1 over walkers {0, 10} -> 5.0, stored at position 1
        assert_relative_eq!(means[0], 7.0);
        assert_relative_eq!(means[1], 5.0);
        assert_relative_eq!(means[2], 3.5);
    }

    #[test]
    fn test_medians_even_count() {
        let medians = posterior(2).medians().unwrap();
        assert_relative_eq!(medians[2], 3.5);
        assert_relative_eq!(medians[1], 5.0);
    }

    #[test]
    fn test_medians_odd_count() {
        let chain = Chain::new(Array3::from_shape_vec((1, 3, 1), vec![5.0, 1.0, 3.0]).unwrap());
        let layout = ParameterLayout::new(array![0.0], vec![0]).unwrap();
        let p = Posterior::new(chain, 0, layout).unwrap();
        assert_relative_eq!(p.medians().unwrap()[0], 3.0);
    }

    #[test]
    fn test_means_leave_template_untouched() {
        let p = posterior(0);
        let _ = p.means().unwrap();
        assert_eq!(p.layout().par_fix().to_vec(), vec![7.0, 0.0, 0.0]);
    }

    #[test]
    fn test_means_empty_chain() {
        assert!(posterior(6).means().is_err());
    }

    #[test]
    fn test_prior_names() {
        let p = posterior(0)
            .with_prior_names(vec!["rho".into(), "sigma".into()])
            .unwrap();
        assert_eq!(p.prior_names().unwrap(), &["rho", "sigma"]);
        assert!(posterior(0).with_prior_names(vec!["rho".into()]).is_err());
    }
}
