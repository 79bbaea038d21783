//! least_squares::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and solver aliases used by the
//! least-squares primitive so the rest of the module stays agnostic to
//! `ndarray` and Argmin generics.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for parameter vectors, residual vectors,
//!   Jacobians, gradients and scalar costs.
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Expose pre-wired L-BFGS solver aliases for both line searches.
//!
//! Invariants & assumptions
//! ------------------------
//! - All vectors and matrices are `ndarray` containers over `f64`.
//! - `Cost` is always the half sum of squared residuals, `½‖r(θ)‖²`.
//!
//! Testing notes
//! -------------
//! - Only aliases and constants live here; they are exercised by the
//!   surrounding optimizer tests.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ` of a residual model.
pub type Theta = Array1<f64>;

/// Gradient of the cost, `∇c(θ) = Jᵀ r`.
pub type Grad = Array1<f64>;

/// Residual vector `r(θ)`, one entry per observation.
pub type ResidualVec = Array1<f64>;

/// Jacobian `∂r_i/∂θ_j`, shape `(observations, parameters)`.
pub type Jacobian = Array2<f64>;

/// Scalar objective, `c(θ) = ½ Σ r_i(θ)²`.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search specialized to this crate’s numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
/// More–Thuente line search specialized to this crate’s numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
