//! Fixed / free parameter layout.
//!
//! A [`ParameterLayout`] pairs the full-length template `par_fix` with the
//! index set `prior_arg` that receives a sampled free-parameter vector.
//! The template is never written to: every overlay produces a new vector.

use std::collections::HashSet;

use ndarray::{Array1, ArrayView1};

use super::error::PosteriorError;

/// Template parameter vector plus the positions overwritten per draw.
///
/// # Examples
///
/// ```rust
/// use ndarray::array;
/// use postsim_core::types::ParameterLayout;
///
/// let layout = ParameterLayout::new(array![1.0, 1.0, 1.0, 1.0], vec![1, 2, 3]).unwrap();
/// let draw = layout.apply(array![0.9, 0.5, 0.1].view()).unwrap();
///
/// assert_eq!(draw.to_vec(), vec![1.0, 0.9, 0.5, 0.1]);
/// // The template is untouched
/// assert_eq!(layout.par_fix().to_vec(), vec![1.0, 1.0, 1.0, 1.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterLayout {
    par_fix: Array1<f64>,
    prior_arg: Vec<usize>,
}

impl ParameterLayout {
    /// Creates a layout, validating `prior_arg` against `par_fix`.
    ///
    /// # Errors
    ///
    /// - `ParameterIndexOutOfRange` if an index is `>= par_fix.len()`
    /// - `DuplicateParameterIndex` if an index occurs twice
    pub fn new(par_fix: Array1<f64>, prior_arg: Vec<usize>) -> Result<Self, PosteriorError> {
        let mut seen = HashSet::with_capacity(prior_arg.len());
        for &index in &prior_arg {
            if index >= par_fix.len() {
                return Err(PosteriorError::ParameterIndexOutOfRange {
                    index,
                    len: par_fix.len(),
                });
            }
            if !seen.insert(index) {
                return Err(PosteriorError::DuplicateParameterIndex(index));
            }
        }
        Ok(Self { par_fix, prior_arg })
    }

    /// The fixed-parameter template.
    #[inline]
    pub fn par_fix(&self) -> ArrayView1<'_, f64> {
        self.par_fix.view()
    }

    /// Positions of the free parameters inside the template.
    #[inline]
    pub fn prior_arg(&self) -> &[usize] {
        &self.prior_arg
    }

    /// Number of free parameters.
    #[inline]
    pub fn n_free(&self) -> usize {
        self.prior_arg.len()
    }

    /// Full parameter vector length.
    #[inline]
    pub fn n_total(&self) -> usize {
        self.par_fix.len()
    }

    /// Returns a copy of the template with the free positions set to `free`.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `free.len() != n_free()`.
    pub fn apply(&self, free: ArrayView1<'_, f64>) -> Result<Array1<f64>, PosteriorError> {
        if free.len() != self.prior_arg.len() {
            return Err(PosteriorError::ShapeMismatch {
                chain_params: free.len(),
                prior_arg_len: self.prior_arg.len(),
            });
        }
        Ok(self.overlay(free))
    }

    /// Copy-on-draw overlay; lengths must already agree.
    pub(crate) fn overlay(&self, free: ArrayView1<'_, f64>) -> Array1<f64> {
        let mut draw = self.par_fix.clone();
        for (&position, &value) in self.prior_arg.iter().zip(free.iter()) {
            draw[position] = value;
        }
        draw
    }
}
