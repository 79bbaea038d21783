//! peaks::correlation — validated view over a sampled correlation function.
//!
//! A [`CorrelationFunction`] borrows the caller's coordinate (`x`, usually
//! lag in seconds) and value (`y`) slices after they pass
//! [`validate_correlation`]; estimators never copy or mutate them.

use crate::peaks::{errors::PeakResult, validation::validate_correlation};

/// Borrowed `(x, y)` pair with a cached bin width.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationFunction<'a> {
    x: &'a [f64],
    y: &'a [f64],
    bin_width: f64,
}

impl<'a> CorrelationFunction<'a> {
    /// Validate and wrap a correlation function.
    ///
    /// Errors
    /// ------
    /// - Any error from [`validate_correlation`].
    pub fn new(x: &'a [f64], y: &'a [f64]) -> PeakResult<Self> {
        let bin_width = validate_correlation(x, y)?;
        Ok(Self { x, y, bin_width })
    }

    pub fn x(&self) -> &'a [f64] {
        self.x
    }

    pub fn y(&self) -> &'a [f64] {
        self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always `false`: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Spacing between samples, `x[1] − x[0]`.
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Index of the sample nearest to `value`, clamped to the array.
    pub fn val_to_index(&self, value: f64) -> usize {
        val_to_index(self.x, value)
    }
}

/// Nearest-sample index for `value` on a uniformly spaced axis `x`.
///
/// Values beyond either end clamp to `0` or `x.len() − 1`; a non-finite
/// value maps to `0`. `x` must hold at least two samples.
pub fn val_to_index(x: &[f64], value: f64) -> usize {
    let last = x.len().saturating_sub(1);
    if last == 0 || !value.is_finite() {
        return 0;
    }
    let step = x[1] - x[0];
    let pos = ((value - x[0]) / step).round();
    if pos <= 0.0 {
        0
    } else if pos >= last as f64 {
        last
    } else {
        pos as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Nearest-index lookup, including clamping at both ends.
    //
    // They intentionally DO NOT cover:
    // - Validation branches; see `validation`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Lookup rounds to the nearest bin and clamps outside the axis.
    //
    // Given
    // -----
    // - x = −1.0, −0.5, …, 1.0 (5 samples).
    //
    // Expect
    // ------
    // - 0.2 → 2, 0.3 → 3, −7 → 0, 9 → 4.
    fn val_to_index_rounds_and_clamps() {
        // Arrange
        let x = [-1.0, -0.5, 0.0, 0.5, 1.0];
        let y = [0.0, 0.1, 1.0, 0.1, 0.0];
        let corr = CorrelationFunction::new(&x, &y).expect("valid correlation");

        // Act / Assert
        assert_eq!(corr.val_to_index(0.2), 2);
        assert_eq!(corr.val_to_index(0.3), 3);
        assert_eq!(corr.val_to_index(-7.0), 0);
        assert_eq!(corr.val_to_index(9.0), 4);
    }
}
