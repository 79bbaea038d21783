//! optimization — nonlinear least-squares stack and unified error surface.
//!
//! Purpose
//! -------
//! Provide the solver layer used for model fitting: an Argmin-backed
//! least-squares primitive and a single error/result surface. Callers
//! implement a residual model, choose tolerances, and obtain fitted
//! parameters and diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose [`least_squares::solve_least_squares`] for minimizing
//!   `½‖r(θ)‖²` with L-BFGS.
//! - Normalize configuration issues, numerical failures, and backend
//!   solver errors into [`errors::OptError`] with the common alias
//!   `OptResult<T>`.
//!
//! Conventions
//! -----------
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - This module emits no logs; the peak engine decides what a failed fit
//!   means and reports it.
//!
//! Testing notes
//! -------------
//! - `errors`: conversions from backend errors into `OptError`.
//! - `least_squares`: solver wiring, tolerance handling and toy fits.

pub mod errors;
pub mod least_squares;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_peakfit::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::least_squares::prelude::*;
}
