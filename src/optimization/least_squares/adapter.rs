//! Adapter that exposes a user `Residuals` model as an `argmin` problem.
//!
//! The cost is the half sum of squares `c(θ) = ½ Σ r_i(θ)²`. When the model
//! provides an analytic Jacobian the gradient is assembled as `Jᵀ r`;
//! otherwise the **cost** closure is finite-differenced.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    least_squares::{
        traits::Residuals,
        types::{Cost, Grad, Theta},
        validation::{validate_grad, validate_jacobian, validate_residuals},
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a user `Residuals` model to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `½ ‖r(θ)‖²`.
/// - `Gradient::gradient` returns:
///   - `J(θ)ᵀ r(θ)` if the model provides an analytic Jacobian, or
///   - a finite-difference gradient of the cost.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: Residuals> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: Residuals> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(θ) = ½ Σ r_i(θ)²`.
    ///
    /// # Errors
    /// - Propagates any `OptError` from the model's `residuals` via `?`.
    /// - `NonFiniteResidual` / `ResidualDimMismatch` from validation.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let r = self.f.residuals(theta, self.data)?;
        validate_residuals(&r, self.f.n_obs(self.data))?;
        let output = 0.5 * r.dot(&r);
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: Residuals> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `θ`.
    ///
    /// Behavior:
    /// - If the model implements `jacobian(θ, data)`, validate it and return
    ///   `Jᵀ r`.
    /// - Otherwise, finite-difference the cost: central differences first,
    ///   retrying with forward differences when a cost evaluation failed or
    ///   the central estimate is not finite.
    ///
    /// # Errors
    /// - Propagates model errors other than `JacobianNotImplemented`.
    /// - Propagates any error raised by cost evaluations performed during FD.
    /// - Returns validation errors for wrong shapes or non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.jacobian(theta, self.data) {
            Ok(jac) => {
                let r = self.f.residuals(theta, self.data)?;
                let n_obs = self.f.n_obs(self.data);
                validate_residuals(&r, n_obs)?;
                validate_jacobian(&jac, n_obs, dim)?;
                let g = jac.t().dot(&r);
                validate_grad(&g, dim)?;
                Ok(g)
            }
            Err(OptError::JacobianNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = theta.central_diff(&cost_func);
                if closure_err.borrow().is_some() {
                    return run_fd_diff(theta, &cost_func, &closure_err);
                }
                match validate_grad(&fd_grad, dim) {
                    Ok(()) => Ok(fd_grad),
                    Err(_) => run_fd_diff(theta, &cost_func, &closure_err),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: Residuals> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a residual model and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

/// Forward-difference gradient of `func` at `theta`, with error capture.
///
/// Clears `closure_err`, runs `forward_diff`, then surfaces any captured
/// error before validating the result.
fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> Result<Grad, Error> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptResult,
        least_squares::types::{Jacobian, ResidualVec},
    };
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Cost assembly as half the squared residual norm.
    // - Analytic `Jᵀ r` gradients and their agreement with the finite-
    //   difference fallback.
    //
    // They intentionally DO NOT cover:
    // - Solver execution; see `run` and `api`.
    // -------------------------------------------------------------------------

    /// Straight line `y = a + b x`; data is `(x, y)`.
    struct Line {
        analytic: bool,
    }

    impl Residuals for Line {
        type Data = (Array1<f64>, Array1<f64>);

        fn residuals(&self, theta: &Theta, data: &Self::Data) -> OptResult<ResidualVec> {
            let (x, y) = data;
            Ok(y - &x.mapv(|xi| theta[0] + theta[1] * xi))
        }

        fn n_obs(&self, data: &Self::Data) -> usize {
            data.0.len()
        }

        fn check(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<()> {
            Ok(())
        }

        fn jacobian(&self, _theta: &Theta, data: &Self::Data) -> OptResult<Jacobian> {
            if !self.analytic {
                return Err(OptError::JacobianNotImplemented);
            }
            let n = data.0.len();
            let mut jac = Array2::zeros((n, 2));
            for (i, &xi) in data.0.iter().enumerate() {
                jac[[i, 0]] = -1.0;
                jac[[i, 1]] = -xi;
            }
            Ok(jac)
        }
    }

    #[test]
    // Purpose
    // -------
    // The cost is ½‖r‖².
    //
    // Given
    // -----
    // - A line model at θ = (0, 0) with y = (1, 2, 3).
    //
    // Expect
    // ------
    // - cost = ½ (1 + 4 + 9) = 7.
    fn cost_is_half_squared_norm() {
        // Arrange
        let data = (array![0.0, 1.0, 2.0], array![1.0, 2.0, 3.0]);
        let model = Line { analytic: true };
        let adapter = ArgMinAdapter::new(&model, &data);

        // Act
        let cost = adapter.cost(&array![0.0, 0.0]).expect("cost should evaluate");

        // Assert
        assert_relative_eq!(cost, 7.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Analytic and finite-difference gradients agree.
    //
    // Given
    // -----
    // - The same line model with and without an analytic Jacobian.
    //
    // Expect
    // ------
    // - Gradients agree to ~1e-6.
    fn analytic_and_fd_gradients_agree() {
        // Arrange
        let data = (array![0.0, 0.5, 1.0, 1.5], array![0.3, 1.1, 1.8, 2.9]);
        let analytic = Line { analytic: true };
        let numeric = Line { analytic: false };
        let theta = array![0.2, 1.1];

        // Act
        let g_a = ArgMinAdapter::new(&analytic, &data).gradient(&theta).expect("analytic grad");
        let g_n = ArgMinAdapter::new(&numeric, &data).gradient(&theta).expect("fd grad");

        // Assert
        for k in 0..2 {
            assert_relative_eq!(g_a[k], g_n[k], epsilon = 1e-6);
        }
    }
}
