//! Seeded per-draw random number generator.
//!
//! This module provides [`DrawRng`], a thin wrapper around a seeded PRNG.
//! Every draw task builds its own generator from its seed, so no random
//! state is shared between draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draw-local random number generator.
///
/// # Examples
///
/// ```rust
/// use postsim_core::sampling::DrawRng;
///
/// let mut rng1 = DrawRng::from_seed(12345);
/// let mut rng2 = DrawRng::from_seed(12345);
///
/// // Same seed produces identical sequences
/// assert_eq!(rng1.gen_index(1000), rng2.gen_index(1000));
/// ```
pub struct DrawRng {
    /// The underlying PRNG instance.
    inner: StdRng,
    /// The seed used for initialisation (kept for logging).
    seed: u64,
}

impl DrawRng {
    /// Creates a generator initialised with `seed`.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Returns the seed used for initialisation.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `[0, upper)`.
    ///
    /// # Panics
    ///
    /// Panics if `upper == 0`.
    #[inline]
    pub fn gen_index(&mut self, upper: usize) -> usize {
        self.inner.gen_range(0..upper)
    }
}
