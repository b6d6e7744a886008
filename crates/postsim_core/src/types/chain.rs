//! Posterior chain storage.
//!
//! A [`Chain`] is the `[walker, iteration, free_parameter]` array produced by
//! a prior MCMC estimation. It is immutable once constructed and shared
//! read-only by every draw task.

use ndarray::{s, Array3, ArrayView1, ArrayView3};

use super::error::PosteriorError;

/// Immutable 3-axis MCMC chain `[walker, iteration, free_parameter]`.
///
/// # Examples
///
/// ```rust
/// use ndarray::Array3;
/// use postsim_core::types::Chain;
///
/// let chain = Chain::new(Array3::zeros((4, 100, 3)));
/// assert_eq!(chain.n_walkers(), 4);
/// assert_eq!(chain.n_iterations(), 100);
/// assert_eq!(chain.n_params(), 3);
/// assert_eq!(chain.pool_size(50), 200);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Chain {
    draws: Array3<f64>,
}

impl Chain {
    /// Wraps a `[walker, iteration, free_parameter]` array.
    pub fn new(draws: Array3<f64>) -> Self {
        Self { draws }
    }

    /// Number of walkers.
    #[inline]
    pub fn n_walkers(&self) -> usize {
        self.draws.dim().0
    }

    /// Number of iterations per walker.
    #[inline]
    pub fn n_iterations(&self) -> usize {
        self.draws.dim().1
    }

    /// Number of free parameters.
    #[inline]
    pub fn n_params(&self) -> usize {
        self.draws.dim().2
    }

    /// Read-only view of the full chain.
    #[inline]
    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.draws.view()
    }

    /// Number of candidate vectors left after discarding `tune` iterations.
    ///
    /// Returns 0 when `tune >= n_iterations()`.
    #[inline]
    pub fn pool_size(&self, tune: usize) -> usize {
        self.n_walkers() * self.n_iterations().saturating_sub(tune)
    }

    /// View of the post-burn-in chain `chain[:, tune:, :]`.
    ///
    /// # Errors
    ///
    /// Returns `PosteriorError::EmptyChain` if no draw survives the burn-in.
    pub fn post_burn_in(&self, tune: usize) -> Result<ArrayView3<'_, f64>, PosteriorError> {
        self.check_pool(tune)?;
        Ok(self.draws.slice(s![.., tune.., ..]))
    }

    /// Row `row` of the flattened post-burn-in pool.
    ///
    /// Flattening is walker-major: rows `0..n_post` belong to walker 0,
    /// where `n_post = n_iterations() - tune`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= pool_size(tune)`.
    pub fn pool_row(&self, tune: usize, row: usize) -> ArrayView1<'_, f64> {
        let n_post = self.n_iterations() - tune;
        let walker = row / n_post;
        let iteration = tune + row % n_post;
        self.draws.slice(s![walker, iteration, ..])
    }

    /// Ensures the post-burn-in pool is non-empty.
    pub(crate) fn check_pool(&self, tune: usize) -> Result<(), PosteriorError> {
        if self.pool_size(tune) == 0 {
            return Err(PosteriorError::EmptyChain {
                walkers: self.n_walkers(),
                iterations: self.n_iterations(),
                tune,
            });
        }
        Ok(())
    }
}

impl From<Array3<f64>> for Chain {
    fn from(draws: Array3<f64>) -> Self {
        Self::new(draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indexed_chain(walkers: usize, iterations: usize, params: usize) -> Chain {
        Chain::new(Array3::from_shape_fn(
            (walkers, iterations, params),
            |(w, i, p)| (w * 1000 + i * 10 + p) as f64,
        ))
    }

    #[test]
    fn test_dimensions() {
        let chain = indexed_chain(4, 100, 3);
        assert_eq!(chain.n_walkers(), 4);
        assert_eq!(chain.n_iterations(), 100);
        assert_eq!(chain.n_params(), 3);
    }

    #[test]
    fn test_pool_size() {
        let chain = indexed_chain(4, 100, 3);
        assert_eq!(chain.pool_size(0), 400);
        assert_eq!(chain.pool_size(50), 200);
        assert_eq!(chain.pool_size(100), 0);
        assert_eq!(chain.pool_size(150), 0);
    }

    #[test]
    fn test_post_burn_in_shape() {
        let chain = indexed_chain(4, 100, 3);
        let post = chain.post_burn_in(50).unwrap();
        assert_eq!(post.dim(), (4, 50, 3));
        assert_eq!(post[[0, 0, 0]], 500.0);
    }

    #[test]
    fn test_post_burn_in_empty() {
        let chain = indexed_chain(2, 10, 1);
        let err = chain.post_burn_in(10).unwrap_err();
        assert_eq!(
            err,
            PosteriorError::EmptyChain {
                walkers: 2,
                iterations: 10,
                tune: 10
            }
        );
    }

    #[test]
    fn test_pool_row_walker_major() {
        let chain = indexed_chain(3, 10, 2);
        // n_post = 6: rows 0..6 walker 0, rows 6..12 walker 1
        assert_eq!(chain.pool_row(4, 0).to_vec(), vec![40.0, 41.0]);
        assert_eq!(chain.pool_row(4, 5).to_vec(), vec![90.0, 91.0]);
        assert_eq!(chain.pool_row(4, 6).to_vec(), vec![1040.0, 1041.0]);
        assert_eq!(chain.pool_row(4, 17).to_vec(), vec![2090.0, 2091.0]);
    }

    #[test]
    fn test_zero_walkers_is_empty() {
        let chain = Chain::new(Array3::zeros((0, 10, 2)));
        assert!(chain.check_pool(0).is_err());
    }
}
