//! Validation helpers for least-squares optimization.
//!
//! This module centralizes the consistency checks used across the solver
//! interface:
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`] ensure
//!   numeric tolerances are finite and strictly positive when provided.
//! - **Inputs**: [`validate_theta0`] rejects non-finite starting points.
//! - **Model outputs**: [`validate_residuals`] and [`validate_jacobian`]
//!   enforce shapes and finiteness of what a [`Residuals`] model returns.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Parameter estimates**: [`validate_theta_hat`] ensures a candidate
//!   `theta_hat` exists and contains only finite values.
//!
//! [`Residuals`]: crate::optimization::least_squares::traits::Residuals
use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::types::{Grad, Jacobian, ResidualVec, Theta},
};

/// Validate the optional gradient‐norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost‐change tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate a starting parameter vector: every entry must be finite.
///
/// # Errors
/// Returns [`OptError::InvalidThetaInput`] for the first offending entry.
pub fn validate_theta0(theta0: &Theta) -> OptResult<()> {
    for (index, &value) in theta0.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidThetaInput { index, value });
        }
    }
    Ok(())
}

/// Validate a residual vector against the expected observation count.
///
/// # Errors
/// - [`OptError::ResidualDimMismatch`] if `r.len() != n_obs`.
/// - [`OptError::NonFiniteResidual`] for the first `NaN`/`±∞` entry.
pub fn validate_residuals(r: &ResidualVec, n_obs: usize) -> OptResult<()> {
    if r.len() != n_obs {
        return Err(OptError::ResidualDimMismatch { expected: n_obs, found: r.len() });
    }
    for (index, &value) in r.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::NonFiniteResidual { index, value });
        }
    }
    Ok(())
}

/// Validate the shape and entries of an analytic Jacobian.
///
/// # Errors
/// - [`OptError::JacobianDimMismatch`] if the shape is not `(n_obs, dim)`.
/// - [`OptError::InvalidGradient`] if any entry is non-finite; the index is
///   the parameter column.
pub fn validate_jacobian(jac: &Jacobian, n_obs: usize, dim: usize) -> OptResult<()> {
    if jac.nrows() != n_obs || jac.ncols() != dim {
        return Err(OptError::JacobianDimMismatch {
            expected: (n_obs, dim),
            found: (jac.nrows(), jac.ncols()),
        });
    }
    for ((_, col), &value) in jac.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index: col,
                value,
                reason: "Jacobian elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}

/// Validate that a scalar cost is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Tolerance validation (finite, positive).
    // - Shape and finiteness checks for residuals and Jacobians.
    // - `theta_hat` presence/finiteness.
    //
    // They intentionally DO NOT cover:
    // - Solver behavior; see `run` and `api`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Non-positive and non-finite tolerances are rejected; `None` passes.
    //
    // Given
    // -----
    // - Tolerances `0.0`, `-1.0`, `NaN`, and `None`.
    //
    // Expect
    // ------
    // - Errors for the first three, `Ok(())` for `None`.
    fn tolerances_must_be_positive_and_finite() {
        // Arrange / Act / Assert
        assert!(matches!(verify_tol_grad(Some(0.0)), Err(OptError::InvalidTolGrad { .. })));
        assert!(matches!(verify_tol_cost(Some(-1.0)), Err(OptError::InvalidTolCost { .. })));
        assert!(matches!(verify_tol_grad(Some(f64::NAN)), Err(OptError::InvalidTolGrad { .. })));
        assert!(verify_tol_cost(None).is_ok(), "Absent tolerance should be accepted");
    }

    #[test]
    // Purpose
    // -------
    // Residual validation reports both wrong length and the first bad entry.
    //
    // Given
    // -----
    // - A length-3 residual vector checked against 4 observations.
    // - A residual vector containing `NaN` at index 1.
    //
    // Expect
    // ------
    // - `ResidualDimMismatch` and `NonFiniteResidual { index: 1 }`.
    fn validate_residuals_flags_length_and_nan() {
        // Arrange
        let short = array![0.0, 1.0, 2.0];
        let bad = array![0.0, f64::NAN, 2.0];

        // Act
        let len_err = validate_residuals(&short, 4);
        let nan_err = validate_residuals(&bad, 3);

        // Assert
        assert_eq!(len_err, Err(OptError::ResidualDimMismatch { expected: 4, found: 3 }));
        assert!(
            matches!(nan_err, Err(OptError::NonFiniteResidual { index: 1, .. })),
            "NaN residual at index 1 should be reported, got {nan_err:?}"
        );
    }

    #[test]
    // Purpose
    // -------
    // A Jacobian with the wrong shape is rejected before use.
    //
    // Given
    // -----
    // - A 3×2 Jacobian checked against 3 observations and 3 parameters.
    //
    // Expect
    // ------
    // - `JacobianDimMismatch { expected: (3, 3), found: (3, 2) }`.
    fn validate_jacobian_checks_shape() {
        // Arrange
        let jac = Array2::<f64>::zeros((3, 2));

        // Act
        let result = validate_jacobian(&jac, 3, 3);

        // Assert
        assert_eq!(
            result,
            Err(OptError::JacobianDimMismatch { expected: (3, 3), found: (3, 2) })
        );
    }

    #[test]
    // Purpose
    // -------
    // Missing or non-finite estimates never leave the solver layer.
    //
    // Given
    // -----
    // - `None` and a vector containing `+∞`.
    //
    // Expect
    // ------
    // - `MissingThetaHat` and `InvalidThetaHat { index: 0 }`.
    fn validate_theta_hat_rejects_missing_and_infinite() {
        // Arrange / Act
        let missing = validate_theta_hat(None);
        let infinite = validate_theta_hat(Some(array![f64::INFINITY, 1.0]));

        // Assert
        assert_eq!(missing, Err(OptError::MissingThetaHat));
        assert!(matches!(infinite, Err(OptError::InvalidThetaHat { index: 0, .. })));
    }
}
