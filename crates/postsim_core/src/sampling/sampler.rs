//! Reproducible chain sampler.
//!
//! [`ChainSampler`] draws one full parameter vector per seed from the
//! flattened post-burn-in chain. The contract the whole pipeline depends on:
//!
//! - Same seed, same draw (bit-identical)
//! - Every draw is a fresh copy of `par_fix`; the template is shared
//!   read-only and never written to

use ndarray::Array1;

use super::rng::DrawRng;
use crate::types::{Chain, ParameterLayout, Posterior, PosteriorError};

/// One realised parameter vector and its provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct Draw {
    /// Seed the draw was generated from.
    pub seed: u64,
    /// Row of the flattened post-burn-in pool that was picked.
    pub pool_row: usize,
    /// Full parameter vector (`par_fix` with free positions overwritten).
    pub parameters: Array1<f64>,
}

/// Validated, read-only sampler over a posterior chain.
///
/// Construction performs all checks; sampling itself cannot fail.
///
/// # Examples
///
/// ```rust
/// use ndarray::{array, Array3};
/// use postsim_core::sampling::ChainSampler;
/// use postsim_core::types::{Chain, ParameterLayout};
///
/// let chain = Chain::new(Array3::from_elem((4, 100, 3), 0.5));
/// let layout = ParameterLayout::new(array![1.0, 1.0, 1.0, 1.0], vec![1, 2, 3]).unwrap();
/// let sampler = ChainSampler::from_parts(&chain, 50, &layout).unwrap();
///
/// let draw = sampler.sample(3);
/// assert_eq!(draw.to_vec(), vec![1.0, 0.5, 0.5, 0.5]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ChainSampler<'a> {
    chain: &'a Chain,
    tune: usize,
    layout: &'a ParameterLayout,
    pool_size: usize,
}

impl<'a> ChainSampler<'a> {
    /// Creates a sampler over a validated posterior.
    ///
    /// # Errors
    ///
    /// Returns `EmptyChain` if the post-burn-in pool is empty.
    pub fn new(posterior: &'a Posterior) -> Result<Self, PosteriorError> {
        Self::from_parts(posterior.chain(), posterior.tune(), posterior.layout())
    }

    /// Creates a sampler from its parts.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `layout.n_free() != chain.n_params()`
    /// - `EmptyChain` if `tune >= chain.n_iterations()` or the chain has no walkers
    pub fn from_parts(
        chain: &'a Chain,
        tune: usize,
        layout: &'a ParameterLayout,
    ) -> Result<Self, PosteriorError> {
        if layout.n_free() != chain.n_params() {
            return Err(PosteriorError::ShapeMismatch {
                chain_params: chain.n_params(),
                prior_arg_len: layout.n_free(),
            });
        }
        chain.check_pool(tune)?;
        Ok(Self {
            chain,
            tune,
            layout,
            pool_size: chain.pool_size(tune),
        })
    }

    /// Number of candidate rows in the flattened post-burn-in pool.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Burn-in index.
    #[inline]
    pub fn tune(&self) -> usize {
        self.tune
    }

    /// Draws the full parameter vector for `seed`.
    pub fn draw(&self, seed: u64) -> Draw {
        let mut rng = DrawRng::from_seed(seed);
        let pool_row = rng.gen_index(self.pool_size);
        let free = self.chain.pool_row(self.tune, pool_row);
        Draw {
            seed,
            pool_row,
            parameters: self.layout.overlay(free),
        }
    }

    /// Parameter vector for `seed`; shorthand for `draw(seed).parameters`.
    #[inline]
    pub fn sample(&self, seed: u64) -> Array1<f64> {
        self.draw(seed).parameters
    }
}

/// One-shot sampling: validates `posterior` and draws the vector for `seed`.
pub fn sample_parameters(posterior: &Posterior, seed: u64) -> Result<Array1<f64>, PosteriorError> {
    Ok(ChainSampler::new(posterior)?.sample(seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    fn chain_4x100x3() -> Chain {
        Chain::new(Array3::from_shape_fn((4, 100, 3), |(w, i, p)| {
            0.001 * (w * 100 + i) as f64 + p as f64
        }))
    }

    fn layout_4() -> ParameterLayout {
        ParameterLayout::new(array![1.0, 1.0, 1.0, 1.0], vec![1, 2, 3]).unwrap()
    }

    #[test]
    fn test_sample_is_deterministic() {
        let chain = chain_4x100x3();
        let layout = layout_4();
        let sampler = ChainSampler::from_parts(&chain, 50, &layout).unwrap();

        for seed in 0..20 {
            assert_eq!(sampler.sample(seed), sampler.sample(seed));
        }
    }

    #[test]
    fn test_fixed_position_untouched() {
        let chain = chain_4x100x3();
        let layout = layout_4();
        let sampler = ChainSampler::from_parts(&chain, 50, &layout).unwrap();

        for seed in 0..5 {
            let draw = sampler.sample(seed);
            assert_eq!(draw.len(), 4);
            assert_eq!(draw[0], 1.0);
        }
        assert_eq!(layout.par_fix().to_vec(), vec![1.0; 4]);
    }

    #[test]
    fn test_draw_comes_from_post_burn_in() {
        let chain = chain_4x100x3();
        let layout = layout_4();
        let sampler = ChainSampler::from_parts(&chain, 50, &layout).unwrap();

        for seed in 0..200 {
            let draw = sampler.draw(seed);
            let walker = draw.pool_row / 50;
            let iteration = 50 + draw.pool_row % 50;
            assert!(iteration >= 50);
            assert_eq!(draw.parameters[1], chain.view()[[walker, iteration, 0]]);
            assert_eq!(draw.parameters[3], chain.view()[[walker, iteration, 2]]);
        }
    }

    #[test]
    fn test_empty_chain_error() {
        let chain = chain_4x100x3();
        let layout = layout_4();
        let result = ChainSampler::from_parts(&chain, 100, &layout);
        assert!(matches!(result, Err(PosteriorError::EmptyChain { .. })));
    }

    #[test]
    fn test_shape_mismatch_error() {
        let chain = chain_4x100x3();
        let layout = ParameterLayout::new(array![1.0, 1.0, 1.0], vec![1, 2]).unwrap();
        let result = ChainSampler::from_parts(&chain, 50, &layout);
        assert!(matches!(
            result,
            Err(PosteriorError::ShapeMismatch {
                chain_params: 3,
                prior_arg_len: 2
            })
        ));
    }

    #[test]
    fn test_sample_parameters_one_shot() {
        let posterior = Posterior::new(chain_4x100x3(), 50, layout_4()).unwrap();
        let a = sample_parameters(&posterior, 11).unwrap();
        let b = ChainSampler::new(&posterior).unwrap().sample(11);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeds_spread_over_pool() {
        let chain = chain_4x100x3();
        let layout = layout_4();
        let sampler = ChainSampler::from_parts(&chain, 50, &layout).unwrap();

        let rows: std::collections::HashSet<usize> =
            (0..100).map(|seed| sampler.draw(seed).pool_row).collect();
        assert!(rows.len() > 50);
    }
}
