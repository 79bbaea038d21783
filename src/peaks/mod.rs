//! peaks — peak/lag estimation engine for sampled correlation functions.
//!
//! Purpose
//! -------
//! Estimate the location, amplitude and width of the dominant peak of a
//! sampled correlation function, with a validity flag and a symbolic
//! failure mask explaining any rejection. Also hosts a general look-ahead
//! extrema detector and a just-passed pulse detector for streaming data.
//!
//! Key behaviors
//! -------------
//! - [`extremum`]: edge-safe (optionally bipolar) seed search.
//! - [`window`]: search-range trimming and the forward-search / gradient
//!   window estimators.
//! - [`screen`]: independent validity predicates, one [`FailureMask`] bit
//!   each.
//! - [`gaussian`], [`quadratic`], [`refine`]: Gaussian least-squares and
//!   moment fits, the parabolic vertex fit and the ordered strategy chain.
//! - [`estimator`]: the three interchangeable estimator variants returning
//!   [`FitResult`].
//! - [`extrema`]: [`detect_extrema`] over arbitrary sequences.
//! - [`streaming`]: [`locate_recent_peak`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every call is pure and re-entrant: no caches, no global toggles; all
//!   configuration arrives in [`SearchLimits`] / [`PeakFitOptions`].
//! - `Err(PeakError)` means malformed input. A poor fit is an `Ok` result
//!   with `is_valid == false` and a non-empty mask.
//! - Solver non-convergence is bounded by the iteration budget and folded
//!   into `FIT_FAIL`.
//!
//! Conventions
//! -----------
//! - `x` is the lag axis (uniformly increasing), `y` the correlation
//!   values; both are borrowed and never mutated.
//! - Diagnostics go through the `log` facade at `debug` level; the crate
//!   installs no logger.
//!
//! Downstream usage
//! ----------------
//! ```
//! use rust_peakfit::peaks::prelude::*;
//!
//! let x: Vec<f64> = (0..201).map(|k| -5.0 + 0.05 * k as f64).collect();
//! let y: Vec<f64> = x.iter().map(|&v| gauss_eval(v, 0.8, 1.0, 0.5)).collect();
//! let limits = SearchLimits::new(-3.0, 3.0, 2.0).unwrap();
//! let opts = PeakFitOptions { refine: true, ..PeakFitOptions::default() };
//!
//! let fit = estimate_peak(PeakEstimator::ForwardSearch, &x, &y, &limits, &opts).unwrap();
//! assert!(fit.is_valid);
//! assert!((fit.lag - 1.0).abs() < 1e-6);
//! ```
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own contract; end-to-end
//!   properties live in `tests/integration_peak_pipeline.rs`.

pub mod correlation;
pub mod errors;
pub mod estimator;
pub mod extrema;
pub mod extremum;
pub mod failure;
pub mod gaussian;
pub mod options;
pub mod quadratic;
pub mod refine;
pub mod screen;
pub mod streaming;
pub mod validation;
pub mod window;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::correlation::{CorrelationFunction, val_to_index};
pub use self::errors::{PeakError, PeakResult};
pub use self::estimator::{
    FitResult, PeakEstimator, estimate_peak, fit_peak_forward, fit_peak_gradient,
    fit_peak_quadratic,
};
pub use self::extrema::{Extremum, PeakList, detect_extrema};
pub use self::extremum::{PeakSign, max_index_noedge};
pub use self::failure::FailureMask;
pub use self::gaussian::{GaussianPeak, fit_gaussian, gauss_eval, moment_estimate};
pub use self::options::{LagRangePolicy, PeakFitOptions, RefineStrategy, SearchLimits};
pub use self::streaming::{RecentPeakOptions, locate_recent_peak};

pub mod prelude {
    pub use super::errors::{PeakError, PeakResult};
    pub use super::estimator::{
        FitResult, PeakEstimator, estimate_peak, fit_peak_forward, fit_peak_gradient,
        fit_peak_quadratic,
    };
    pub use super::extrema::{PeakList, detect_extrema};
    pub use super::failure::FailureMask;
    pub use super::gaussian::{GaussianPeak, gauss_eval};
    pub use super::options::{LagRangePolicy, PeakFitOptions, RefineStrategy, SearchLimits};
}
