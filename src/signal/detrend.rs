//! signal::detrend — least-squares polynomial fits and trend removal.
//!
//! Purpose
//! -------
//! Provide the small dense polynomial fit shared by the quadratic peak
//! estimator and trend removal on evenly sampled data.
//!
//! Key behaviors
//! -------------
//! - [`polyfit`] solves the normal equations `VᵀV c = Vᵀy` of the
//!   Vandermonde system with a Cholesky factorization (`nalgebra`).
//! - [`detrend`] fits against the centered sample index `t = i − n/2` and
//!   subtracts the fitted trend; the constant term is removed only when
//!   `demean` is set.
//!
//! Conventions
//! -----------
//! - Coefficients are returned in ascending powers: `c[0] + c[1]·x + …`.
//! - Callers should center `x` before fitting higher orders; the normal
//!   equations square the condition number.

use nalgebra::{DMatrix, DVector};

use crate::peaks::{
    errors::{PeakError, PeakResult},
    validation::validate_values,
};

/// Smallest admissible ratio between Cholesky pivots of the scaled normal
/// matrix.
const MIN_PIVOT: f64 = 1e-7;

/// Least-squares polynomial of degree `order` through `(x, y)`.
///
/// Errors
/// ------
/// - `LengthMismatch` if `x` and `y` differ in length.
/// - `InvalidPolynomialOrder` unless `len > order`.
/// - `SingularSystem` when the normal matrix is not positive definite
///   (e.g. repeated abscissae).
pub fn polyfit(x: &[f64], y: &[f64], order: usize) -> PeakResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(PeakError::LengthMismatch { x_len: x.len(), y_len: y.len() });
    }
    if x.len() <= order {
        return Err(PeakError::InvalidPolynomialOrder { order, len: x.len() });
    }
    let mut vander = DMatrix::from_fn(x.len(), order + 1, |i, k| x[i].powi(k as i32));
    // Unit-norm columns keep the pivot check meaningful across scales.
    let scales: Vec<f64> = vander.column_iter().map(|col| col.norm()).collect();
    if scales.iter().any(|&s| !(s > 0.0) || !s.is_finite()) {
        return Err(PeakError::SingularSystem);
    }
    for (mut col, &s) in vander.column_iter_mut().zip(&scales) {
        col /= s;
    }
    let rhs = DVector::from_column_slice(y);
    let normal = vander.transpose() * &vander;
    let projected = vander.transpose() * rhs;
    let chol = normal.cholesky().ok_or(PeakError::SingularSystem)?;
    let pivots = chol.l_dirty().diagonal();
    if pivots.min() < MIN_PIVOT * pivots.max() {
        return Err(PeakError::SingularSystem);
    }
    let coeffs = chol.solve(&projected);
    let coeffs: Vec<f64> = coeffs.iter().zip(&scales).map(|(c, s)| c / s).collect();
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(PeakError::SingularSystem);
    }
    Ok(coeffs)
}

/// Evaluate ascending-power coefficients at `x` (Horner).
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// Remove a polynomial trend of degree `order` from `data`.
///
/// Parameters
/// ----------
/// - `data`: evenly sampled values, all finite.
/// - `order`: trend degree; `0` only removes the mean (and only when
///   `demean` is set).
/// - `demean`: also subtract the fitted constant term.
///
/// Errors
/// ------
/// - `EmptyInput` / `NonFiniteSample` for bad data.
/// - `InvalidPolynomialOrder` unless `data.len() > order`.
pub fn detrend(data: &[f64], order: usize, demean: bool) -> PeakResult<Vec<f64>> {
    validate_values(data)?;
    let half = data.len() as f64 / 2.0;
    let t: Vec<f64> = (0..data.len()).map(|i| i as f64 - half).collect();
    let mut coeffs = polyfit(&t, data, order)?;
    if !demean {
        coeffs[0] = 0.0;
    }
    Ok(data.iter().zip(&t).map(|(&v, &ti)| v - polyval(&coeffs, ti)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact recovery of polynomial coefficients.
    // - Trend removal with and without the constant term.
    // - Rejection of underdetermined and degenerate fits.
    //
    // They intentionally DO NOT cover:
    // - Conditioning of high-order fits on uncentered data.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `polyfit` recovers an exact quadratic.
    //
    // Given
    // -----
    // - y = 2 − 3x + 0.5x² on x = −2..2 step 0.5.
    //
    // Expect
    // ------
    // - Coefficients [2, −3, 0.5] within 1e-10; `polyval` agrees.
    fn polyfit_recovers_quadratic() {
        // Arrange
        let x: Vec<f64> = (0..9).map(|k| -2.0 + 0.5 * k as f64).collect();
        let y: Vec<f64> = x.iter().map(|&v| 2.0 - 3.0 * v + 0.5 * v * v).collect();

        // Act
        let c = polyfit(&x, &y, 2).expect("well-posed fit");

        // Assert
        assert_relative_eq!(c[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(c[1], -3.0, epsilon = 1e-10);
        assert_relative_eq!(c[2], 0.5, epsilon = 1e-10);
        assert_relative_eq!(polyval(&c, 1.3), 2.0 - 3.9 + 0.5 * 1.69, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Linear detrending removes the slope and keeps the offset unless
    // `demean` is set.
    //
    // Given
    // -----
    // - data = 4 + 0.25·(i − n/2), n = 10.
    //
    // Expect
    // ------
    // - demean = false → every value 4; demean = true → every value 0.
    fn detrend_linear_with_and_without_mean() {
        // Arrange
        let data: Vec<f64> = (0..10).map(|i| 4.0 + 0.25 * (i as f64 - 5.0)).collect();

        // Act
        let kept = detrend(&data, 1, false).expect("detrend");
        let removed = detrend(&data, 1, true).expect("detrend");

        // Assert
        for (&k, &r) in kept.iter().zip(&removed) {
            assert_relative_eq!(k, 4.0, epsilon = 1e-10);
            assert_relative_eq!(r, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // Underdetermined and degenerate systems are input errors.
    //
    // Given
    // -----
    // - Two samples for a quadratic; three identical abscissae.
    //
    // Expect
    // ------
    // - `InvalidPolynomialOrder` and `SingularSystem`.
    fn polyfit_rejects_degenerate_input() {
        // Act
        let short = polyfit(&[0.0, 1.0], &[1.0, 2.0], 2);
        let repeated = polyfit(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0], 1);

        // Assert
        assert_eq!(short, Err(PeakError::InvalidPolynomialOrder { order: 2, len: 2 }));
        assert_eq!(repeated, Err(PeakError::SingularSystem));
    }
}
