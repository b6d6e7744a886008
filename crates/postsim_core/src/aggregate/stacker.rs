//! Incremental stacking of one result field.
//!
//! [`FieldStacker`] accepts per-draw arrays one at a time and lays them out
//! contiguously, so a caller can stream chunks of finished draws into it
//! without keeping every draw result alive until the end.

use ndarray::{Array, ArrayView, Dimension, IxDyn};

use crate::types::AggregationError;

/// Accumulates congruent per-draw arrays into `(draws,) + S`.
///
/// The first pushed array fixes the per-draw shape `S`; any later array
/// with a different shape is rejected rather than truncated or padded.
///
/// # Examples
///
/// ```rust
/// use ndarray::{array, Ix2};
/// use postsim_core::aggregate::FieldStacker;
///
/// let mut stacker = FieldStacker::<Ix2>::new("paths");
/// stacker.push(0, array![[1.0, 2.0]].view()).unwrap();
/// stacker.push(1, array![[3.0, 4.0]].view()).unwrap();
///
/// let stacked = stacker.finish().unwrap();
/// assert_eq!(stacked.shape(), &[2, 1, 2]);
/// assert_eq!(stacked[[1, 0, 1]], 4.0);
/// ```
#[derive(Clone, Debug)]
pub struct FieldStacker<D: Dimension> {
    field: &'static str,
    shape: Option<D>,
    expected_draws: usize,
    data: Vec<f64>,
    count: usize,
}

impl<D: Dimension> FieldStacker<D> {
    /// Creates an empty stacker for `field`.
    pub fn new(field: &'static str) -> Self {
        Self::with_capacity(field, 0)
    }

    /// Creates an empty stacker that reserves room for `expected_draws`
    /// once the per-draw shape is known.
    pub fn with_capacity(field: &'static str, expected_draws: usize) -> Self {
        Self {
            field,
            shape: None,
            expected_draws,
            data: Vec::new(),
            count: 0,
        }
    }

    /// Field name used in error messages.
    #[inline]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Number of draws stacked so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if nothing has been stacked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Per-draw shape, once established.
    pub fn draw_shape(&self) -> Option<&[usize]> {
        self.shape.as_ref().map(|s| s.slice())
    }

    /// Checks `value` against the established shape without storing it.
    pub fn check(
        &self,
        index: usize,
        value: &ArrayView<'_, f64, D>,
    ) -> Result<(), AggregationError> {
        match &self.shape {
            Some(shape) if shape.slice() != value.shape() => {
                Err(AggregationError::AggregationShape {
                    field: self.field,
                    index,
                    expected: shape.slice().to_vec(),
                    actual: value.shape().to_vec(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Appends the result of draw `index`.
    ///
    /// # Errors
    ///
    /// Returns `AggregationShape` if `value` is not congruent with the
    /// first stacked draw.
    pub fn push(
        &mut self,
        index: usize,
        value: ArrayView<'_, f64, D>,
    ) -> Result<(), AggregationError> {
        self.check(index, &value)?;
        if self.shape.is_none() {
            self.data.reserve(value.len() * self.expected_draws.max(1));
            self.shape = Some(value.raw_dim());
        }
        self.data.extend(value.iter().copied());
        self.count += 1;
        Ok(())
    }

    /// Builds the stacked array with the draw axis first.
    ///
    /// # Errors
    ///
    /// Returns `NoDraws` if nothing was pushed.
    pub fn finish(self) -> Result<Array<f64, D::Larger>, AggregationError> {
        let field = self.field;
        let shape = self.shape.ok_or(AggregationError::NoDraws)?;

        let mut full = Vec::with_capacity(shape.ndim() + 1);
        full.push(self.count);
        full.extend_from_slice(shape.slice());

        Array::from_shape_vec(IxDyn(&full), self.data)
            .and_then(|stacked| stacked.into_dimensionality::<D::Larger>())
            .map_err(|e| AggregationError::Layout {
                field,
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, Ix1, Ix2};

    #[test]
    fn test_stack_shape_and_order() {
        let mut stacker = FieldStacker::<Ix2>::with_capacity("states", 3);
        for i in 0..3 {
            let value = Array2::from_elem((4, 2), i as f64);
            stacker.push(i, value.view()).unwrap();
        }
        assert_eq!(stacker.len(), 3);
        assert_eq!(stacker.draw_shape(), Some(&[4, 2][..]));

        let stacked = stacker.finish().unwrap();
        assert_eq!(stacked.dim(), (3, 4, 2));
        for i in 0..3 {
            assert!(stacked
                .index_axis(ndarray::Axis(0), i)
                .iter()
                .all(|&v| v == i as f64));
        }
    }

    #[test]
    fn test_row_major_layout_of_non_standard_views() {
        let value = array![[1.0, 2.0], [3.0, 4.0]];
        let transposed = value.t();

        let mut stacker = FieldStacker::<Ix2>::new("paths");
        stacker.push(0, transposed).unwrap();
        let stacked = stacker.finish().unwrap();

        assert_eq!(stacked[[0, 0, 1]], 3.0);
        assert_eq!(stacked[[0, 1, 0]], 2.0);
    }

    #[test]
    fn test_shape_mismatch_reports_index() {
        let mut stacker = FieldStacker::<Ix1>::new("residuals");
        stacker.push(0, array![1.0, 2.0].view()).unwrap();
        stacker.push(1, array![3.0, 4.0].view()).unwrap();
        let err = stacker.push(2, array![5.0].view()).unwrap_err();

        assert_eq!(
            err,
            AggregationError::AggregationShape {
                field: "residuals",
                index: 2,
                expected: vec![2],
                actual: vec![1],
            }
        );
        // Rejected draw is not counted
        assert_eq!(stacker.len(), 2);
    }

    #[test]
    fn test_finish_empty() {
        let stacker = FieldStacker::<Ix2>::new("paths");
        assert!(stacker.is_empty());
        assert_eq!(stacker.finish().unwrap_err(), AggregationError::NoDraws);
    }

    #[test]
    fn test_zero_sized_draws() {
        let mut stacker = FieldStacker::<Ix2>::new("shocks");
        stacker.push(0, Array2::<f64>::zeros((0, 2)).view()).unwrap();
        stacker.push(1, Array2::<f64>::zeros((0, 2)).view()).unwrap();
        let stacked = stacker.finish().unwrap();
        assert_eq!(stacked.dim(), (2, 0, 2));
    }
}
