//! peaks::refine — ordered refinement strategy chain.
//!
//! Purpose
//! -------
//! Replace a seed estimate by a refined one using the first
//! [`RefineStrategy`] that succeeds. Strategies are tried strictly in the
//! configured order; the chain is explicit data rather than nested flags.
//!
//! Key behaviors
//! -------------
//! - `LeastSquares` fails on any solver error, including non-convergence
//!   within the iteration budget.
//! - `Moments` fails when the window has a non-positive value sum.
//! - `InitialGuess` always succeeds with the seed.
//! - Each failure is logged at `debug` and the next strategy is tried.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x` and `y` are the fit window, already sign-corrected.
//! - A successful refinement has finite parameters; screening the result
//!   is the caller's job.

use crate::{
    optimization::least_squares::LsqOptions,
    peaks::{
        gaussian::{GaussianPeak, fit_gaussian, moment_estimate},
        options::RefineStrategy,
    },
};

/// A refined estimate and the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refinement {
    pub peak: GaussianPeak,
    pub strategy: RefineStrategy,
}

/// Run `strategies` in order over the window `(x, y)`.
///
/// Returns `None` when every strategy failed (or the list is empty).
pub fn refine_peak(
    x: &[f64], y: &[f64], seed: GaussianPeak, strategies: &[RefineStrategy], solver: &LsqOptions,
) -> Option<Refinement> {
    strategies.iter().find_map(|&strategy| {
        let attempt = match strategy {
            RefineStrategy::LeastSquares => {
                fit_gaussian(x, y, seed, solver).map_err(|err| err.to_string())
            }
            RefineStrategy::Moments => {
                moment_estimate(x, y).ok_or_else(|| "window has no positive mass".to_string())
            }
            RefineStrategy::InitialGuess => Ok(seed),
        };
        match attempt {
            Ok(peak) if is_finite(&peak) => Some(Refinement { peak, strategy }),
            Ok(peak) => {
                log::debug!("refinement strategy {strategy} produced non-finite {peak:?}");
                None
            }
            Err(reason) => {
                log::debug!("refinement strategy {strategy} failed: {reason}");
                None
            }
        }
    })
}

fn is_finite(peak: &GaussianPeak) -> bool {
    peak.amplitude.is_finite() && peak.center.is_finite() && peak.sigma.is_finite()
}
