//! Innovation masks.
//!
//! An [`InnovationMask`] has the shape of one draw's residual matrix
//! `(periods, shocks)`. A `NaN` cell keeps the draw's computed residual, any
//! other value replaces it. This pins selected shocks across all draws.

use ndarray::{Array2, ArrayView2, Zip};

use super::error::PosteriorError;

/// Mask-select rule for a single cell.
///
/// Returns `computed` when `mask` is NaN, otherwise `mask`.
///
/// ```rust
/// use postsim_core::types::mask_select;
///
/// assert_eq!(mask_select(f64::NAN, 0.3), 0.3);
/// assert_eq!(mask_select(0.0, 0.3), 0.0);
/// ```
#[inline]
pub fn mask_select(mask: f64, computed: f64) -> f64 {
    if mask.is_nan() {
        computed
    } else {
        mask
    }
}

/// Per-cell override of filtered residuals.
///
/// # Examples
///
/// ```rust
/// use ndarray::array;
/// use postsim_core::types::InnovationMask;
///
/// let mut mask = InnovationMask::empty(2, 2);
/// mask.fix(1, 0, 0.0).unwrap();
///
/// let residuals = array![[0.1, 0.2], [0.3, 0.4]];
/// let masked = mask.select(residuals.view()).unwrap();
/// assert_eq!(masked, array![[0.1, 0.2], [0.0, 0.4]]);
/// ```
#[derive(Clone, Debug)]
pub struct InnovationMask {
    values: Array2<f64>,
}

impl InnovationMask {
    /// Wraps a raw `(periods, shocks)` mask array.
    pub fn new(values: Array2<f64>) -> Self {
        Self { values }
    }

    /// All-NaN mask: every computed residual stands.
    pub fn empty(periods: usize, shocks: usize) -> Self {
        Self::new(Array2::from_elem((periods, shocks), f64::NAN))
    }

    /// All-NaN mask shaped for residuals filtered from `observed`.
    ///
    /// Residuals start at the second period, so the mask has
    /// `observed.nrows() - 1` rows and one column per observable.
    pub fn empty_for(observed: ArrayView2<'_, f64>) -> Self {
        Self::empty(observed.nrows().saturating_sub(1), observed.ncols())
    }

    /// Mask shape `(periods, shocks)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Raw mask values.
    #[inline]
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Forces residual `(period, shock)` to `value` in every draw.
    ///
    /// # Errors
    ///
    /// Returns `MaskIndexOutOfRange` if the cell lies outside the mask.
    pub fn fix(&mut self, period: usize, shock: usize, value: f64) -> Result<(), PosteriorError> {
        let shape = self.shape();
        let cell = self
            .values
            .get_mut((period, shock))
            .ok_or(PosteriorError::MaskIndexOutOfRange {
                period,
                shock,
                shape,
            })?;
        *cell = value;
        Ok(())
    }

    /// Forces a whole shock column to `value` (e.g. zero to switch a shock off).
    pub fn fix_shock(&mut self, shock: usize, value: f64) -> Result<(), PosteriorError> {
        let shape = self.shape();
        if shock >= shape.1 {
            return Err(PosteriorError::MaskIndexOutOfRange {
                period: 0,
                shock,
                shape,
            });
        }
        self.values.column_mut(shock).fill(value);
        Ok(())
    }

    /// Number of non-NaN (pinned) cells.
    pub fn pinned_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// Checks that the mask fits residuals of shape `expected`.
    pub fn check_shape(&self, expected: (usize, usize)) -> Result<(), PosteriorError> {
        if self.shape() != expected {
            return Err(PosteriorError::MaskShape {
                expected,
                actual: self.shape(),
            });
        }
        Ok(())
    }

    /// Returns `computed` with every pinned cell replaced by the mask value.
    pub fn select(&self, computed: ArrayView2<'_, f64>) -> Result<Array2<f64>, PosteriorError> {
        let mut out = computed.to_owned();
        self.apply(&mut out)?;
        Ok(out)
    }

    /// In-place variant of [`InnovationMask::select`].
    pub fn apply(&self, residuals: &mut Array2<f64>) -> Result<(), PosteriorError> {
        self.check_shape(residuals.dim())?;
        Zip::from(residuals)
            .and(&self.values)
            .for_each(|computed, &mask| *computed = mask_select(mask, *computed));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_for_shape() {
        let observed = Array2::<f64>::zeros((20, 3));
        let mask = InnovationMask::empty_for(observed.view());
        assert_eq!(mask.shape(), (19, 3));
        assert_eq!(mask.pinned_count(), 0);
    }

    #[test]
    fn test_empty_for_no_periods() {
        let observed = Array2::<f64>::zeros((0, 2));
        assert_eq!(InnovationMask::empty_for(observed.view()).shape(), (0, 2));
    }

    #[test]
    fn test_empty_mask_is_identity() {
        let mask = InnovationMask::empty(2, 2);
        let computed = array![[1.0, -2.0], [3.5, 0.0]];
        assert_eq!(mask.select(computed.view()).unwrap(), computed);
    }

    #[test]
    fn test_fix_and_select() {
        let mut mask = InnovationMask::empty(3, 2);
        mask.fix(0, 1, 9.0).unwrap();
        mask.fix(2, 0, -1.0).unwrap();
        assert_eq!(mask.pinned_count(), 2);

        let computed = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let masked = mask.select(computed.view()).unwrap();
        assert_eq!(masked, array![[1.0, 9.0], [3.0, 4.0], [-1.0, 6.0]]);
    }

    #[test]
    fn test_fix_out_of_range() {
        let mut mask = InnovationMask::empty(2, 2);
        assert!(matches!(
            mask.fix(2, 0, 0.0),
            Err(PosteriorError::MaskIndexOutOfRange { period: 2, .. })
        ));
    }

    #[test]
    fn test_fix_shock_column() {
        let mut mask = InnovationMask::empty(3, 2);
        mask.fix_shock(1, 0.0).unwrap();
        assert_eq!(mask.pinned_count(), 3);
        assert!(mask.fix_shock(2, 0.0).is_err());
    }

    #[test]
    fn test_select_shape_mismatch() {
        let mask = InnovationMask::empty(2, 2);
        let computed = Array2::<f64>::zeros((3, 2));
        assert!(matches!(
            mask.select(computed.view()),
            Err(PosteriorError::MaskShape {
                expected: (3, 2),
                actual: (2, 2)
            })
        ));
    }
}
