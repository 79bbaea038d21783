//! least_squares — argmin-powered nonlinear least-squares primitive.
//!
//! Purpose
//! -------
//! Provide the single "solve least squares" primitive the peak engine and
//! the onset-response fits rely on: callers implement [`Residuals`] for a
//! model, hand over an initial parameter vector, and receive a fitted
//! vector or an [`OptError`].
//!
//! Key behaviors
//! -------------
//! - Convert residual models into Argmin cost functions
//!   `c(θ) = ½ Σ r_i(θ)²` via [`adapter::ArgMinAdapter`], with gradients
//!   `Jᵀ r` from an analytic Jacobian or finite differences of the cost.
//! - Expose one entrypoint, [`solve_least_squares`], that validates the
//!   start, builds an L-BFGS solver through [`builders`], runs it with a
//!   bounded iteration budget through [`run::run_lbfgs`], and normalizes the
//!   result into an [`LsqOutcome`].
//! - Report a run that stops without converging as
//!   [`OptError::NumericalFailure`] rather than as a weak outcome.
//!
//! Invariants & assumptions
//! ------------------------
//! - Residual models must treat invalid inputs as recoverable [`OptError`]
//!   values, not panics.
//! - Every run is bounded: when `max_iter` is not configured the runner
//!   applies [`DEFAULT_MAX_ITER`].
//!
//! Conventions
//! -----------
//! - Residuals are `r(θ) = y − f(x; θ)`; Jacobians are `∂r/∂θ`, shape
//!   `(observations, parameters)`.
//! - Errors bubble up as [`OptResult<T>`]; this module never intentionally
//!   panics.
//!
//! Downstream usage
//! ----------------
//! - `peaks::gaussian` implements [`Residuals`] for the symmetric Gaussian
//!   and calls [`solve_least_squares`] from the refinement chain.
//! - `signal::onset` fits rise-time and trapezoid responses without an
//!   analytic Jacobian.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover cost/gradient assembly, builders,
//!   option validation, outcome mapping and small end-to-end solves.
//!
//! [`OptError`]: crate::optimization::errors::OptError
//! [`OptError::NumericalFailure`]: crate::optimization::errors::OptError::NumericalFailure
//! [`OptResult<T>`]: crate::optimization::errors::OptResult

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::solve_least_squares;
pub use self::traits::{
    DEFAULT_MAX_ITER, DEFAULT_TOL_COST, DEFAULT_TOL_GRAD, LineSearcher, LsqOptions, LsqOutcome,
    Residuals, Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Jacobian, ResidualVec, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_peakfit::optimization::least_squares::prelude::*;
//
// to import the main solver surface in a single line.

pub mod prelude {
    pub use super::api::solve_least_squares;
    pub use super::traits::{LineSearcher, LsqOptions, LsqOutcome, Residuals, Tolerances};
    pub use super::types::{Jacobian, ResidualVec, Theta};
}
