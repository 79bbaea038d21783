//! peaks::estimator — peak/lag estimation with failure diagnostics.
//!
//! Purpose
//! -------
//! Compose the extremum locator, window estimators, validity screen and
//! refinement chain into one call returning a [`FitResult`]. Three
//! interchangeable variants share the return contract and the failure
//! vocabulary:
//!
//! - [`fit_peak_forward`]: seed at the maximum of the search range, grow
//!   the window by the fractional-height walk, refine with the configured
//!   strategy chain.
//! - [`fit_peak_gradient`]: decide the sign from the (optionally bipolar)
//!   extremum, seed on the edge-trimmed sign-corrected data, grow the
//!   window while the slope points at the peak, refine the corrected data.
//! - [`fit_peak_quadratic`]: grow a 75%-height window and always fit a
//!   parabola; the vertex is the estimate.
//!
//! Key behaviors
//! -------------
//! - The seed estimate is screened first; any failure sets `INIT_FAIL` and
//!   skips refinement.
//! - Refinement runs only when requested (the quadratic variant always
//!   fits); a refined estimate is screened again and every rejection sets
//!   `FIT_FAIL`.
//! - Accepted lags are reduced with `lag % lag_modulus`.
//! - Rejected results are zeroed under `zero_on_reject`, otherwise they
//!   report the seed estimate.
//!
//! Invariants & assumptions
//! ------------------------
//! - `is_valid == failure.is_empty()` for every result.
//! - Caller data is never mutated; the gradient variant works on a
//!   sign-corrected copy and reports `sign · amplitude`.
//! - Fit-quality problems never surface as `Err`. `Err` means malformed
//!   input or options.
//!
//! Conventions
//! -----------
//! - `window_start`/`window_end` delimit the half-open fit window in
//!   sample indices; `index` is the seed sample.
//!
//! Downstream usage
//! ----------------
//! - Use [`estimate_peak`] with a [`PeakEstimator`] when the variant is a
//!   runtime choice; call the variant functions directly otherwise.
//!
//! Testing notes
//! -------------
//! - Unit tests below pin the control flow per variant; recovery accuracy
//!   and policy properties are covered by the integration tests.

use std::fmt;
use std::str::FromStr;

use crate::peaks::{
    correlation::CorrelationFunction,
    errors::{PeakError, PeakResult},
    extremum::{PeakSign, max_index_noedge_within},
    failure::FailureMask,
    gaussian::GaussianPeak,
    options::{PeakFitOptions, SearchLimits},
    quadratic::{Parabola, log_curvature_width, second_moment_width},
    refine::refine_peak,
    screen::ValidityScreen,
    window::{PeakWindow, forward_search_window, gradient_window, search_range},
};

/// Height fraction bounding the quadratic estimator's window.
pub const QUADRATIC_SEARCH_FRACTION: f64 = 0.75;

/// FWHM of a unit Gaussian, `2·√(2 ln 2)`, rounded as calibrated.
const GAUSSIAN_FWHM: f64 = 2.355;

/// Outcome of one peak estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    pub index: usize,
    pub lag: f64,
    pub amplitude: f64,
    pub width: f64,
    pub is_valid: bool,
    pub failure: FailureMask,
    pub window_start: usize,
    pub window_end: usize,
}

impl FitResult {
    /// The estimate as Gaussian parameters.
    pub fn peak(&self) -> GaussianPeak {
        GaussianPeak::new(self.amplitude, self.lag, self.width)
    }
}

/// Estimator variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakEstimator {
    #[default]
    ForwardSearch,
    Gradient,
    Quadratic,
}

impl PeakEstimator {
    pub fn name(self) -> &'static str {
        match self {
            PeakEstimator::ForwardSearch => "forward",
            PeakEstimator::Gradient => "gradient",
            PeakEstimator::Quadratic => "quadratic",
        }
    }
}

impl fmt::Display for PeakEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PeakEstimator {
    type Err = PeakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" | "forward_search" | "gauss" => Ok(PeakEstimator::ForwardSearch),
            "gradient" | "bipolar" | "gauss_rev" => Ok(PeakEstimator::Gradient),
            "quadratic" | "quad" => Ok(PeakEstimator::Quadratic),
            _ => Err(PeakError::InvalidOption {
                name: "method",
                value: f64::NAN,
                reason: "Valid estimators are 'forward', 'gradient' or 'quadratic'.",
            }),
        }
    }
}

/// Estimate the dominant peak of `(x, y)` with the selected variant.
///
/// Errors
/// ------
/// - Malformed input or options; see the variant functions.
pub fn estimate_peak(
    method: PeakEstimator, x: &[f64], y: &[f64], limits: &SearchLimits, opts: &PeakFitOptions,
) -> PeakResult<FitResult> {
    match method {
        PeakEstimator::ForwardSearch => fit_peak_forward(x, y, limits, opts),
        PeakEstimator::Gradient => fit_peak_gradient(x, y, limits, opts),
        PeakEstimator::Quadratic => fit_peak_quadratic(x, y, limits, opts),
    }
}

/// Forward-search estimator.
///
/// Parameters
/// ----------
/// - `x`, `y`: correlation function, equal lengths ≥ 3, uniformly
///   increasing `x`, finite values.
/// - `limits`: admissible lag range and width ceiling.
/// - `opts`: see [`PeakFitOptions`]; `bipolar` and `abs_max_sigma` are
///   not used by this variant.
///
/// Returns
/// -------
/// A [`FitResult`]. The seed screen raises `LAG` outside the lag range,
/// `HIT_EDGE` within one bin of either limit, `WIDTH` above
/// `width_limit`, `SEARCH_WINDOW` for fewer than three samples in the
/// window and the amplitude bits.
///
/// Errors
/// ------
/// - `PeakError` for malformed input or invalid options.
pub fn fit_peak_forward(
    x: &[f64], y: &[f64], limits: &SearchLimits, opts: &PeakFitOptions,
) -> PeakResult<FitResult> {
    let corr = prepare(x, y, opts)?;
    let bin_width = corr.bin_width();
    let range = search_range(y, opts.edge_buffer_fraction, opts.tweak_edges);
    let index = match opts.lag_guess {
        Some(guess) => corr.val_to_index(guess),
        None => range.argmax(y),
    };
    let max_steps = step_budget(limits.width_limit, bin_width);
    let window = forward_search_window(y, index, range, opts.search_fraction, max_steps, bin_width);
    let seed = GaussianPeak::new(y[index], x[index], window.width);

    let screen = ValidityScreen::new(limits, opts, bin_width, limits.width_limit);
    let failure = screen.initial(&seed, &window, 0.0, true);
    let start = SeedEstimate { index, sign: PeakSign::Positive, peak: seed, window, failure };

    Ok(conclude(start, &screen, opts, opts.refine, |seed| {
        let (wx, wy) = (window_slice(x, &window), window_slice(y, &window));
        refine_peak(wx, wy, *seed, &opts.refine_strategies, &opts.solver).map(|r| r.peak)
    }))
}

/// Gradient-bounded (optionally bipolar) estimator.
///
/// The sign is decided first, over the edge-buffered range without edge
/// trimming: negative when `bipolar` and the largest-magnitude sample is a
/// trough. The data are multiplied by that sign, and the edge trim and
/// the edge-safe argmax then run on the oriented copy, so a dominant
/// trough is seeded on its own sample. `lag_guess` forces a positive sign
/// and seeds at the nearest sample. The reported amplitude of a negative
/// peak is negative.
///
/// The seed lag check is widened by one bin and, under the soft policy,
/// by 75% of the lag span; the width ceiling is `abs_max_sigma`.
///
/// Errors
/// ------
/// - `PeakError` for malformed input or invalid options.
pub fn fit_peak_gradient(
    x: &[f64], y: &[f64], limits: &SearchLimits, opts: &PeakFitOptions,
) -> PeakResult<FitResult> {
    let corr = prepare(x, y, opts)?;
    let bin_width = corr.bin_width();
    let sign = match opts.lag_guess {
        Some(_) => PeakSign::Positive,
        None => {
            let buffered = search_range(y, opts.edge_buffer_fraction, false);
            max_index_noedge_within(y, buffered.lower, buffered.upper, opts.bipolar).1
        }
    };
    let oriented: Vec<f64> = y.iter().map(|&v| sign.factor() * v).collect();
    let range = search_range(&oriented, opts.edge_buffer_fraction, opts.tweak_edges);
    let index = match opts.lag_guess {
        Some(guess) => corr.val_to_index(guess),
        None => max_index_noedge_within(&oriented, range.lower, range.upper, false).0,
    };
    let window = gradient_window(&oriented, index, range, opts.search_fraction, bin_width);
    let seed = GaussianPeak::new(oriented[index], x[index], window.width);

    let screen = ValidityScreen::new(limits, opts, bin_width, opts.abs_max_sigma);
    let failure = screen.initial(&seed, &window, bin_width, false);
    let start = SeedEstimate { index, sign, peak: seed, window, failure };

    Ok(conclude(start, &screen, opts, opts.refine, |seed| {
        let (wx, wy) = (window_slice(x, &window), window_slice(&oriented, &window));
        refine_peak(wx, wy, *seed, &opts.refine_strategies, &opts.solver).map(|r| r.peak)
    }))
}

/// Quadratic-vertex estimator.
///
/// Grows a window over the samples above 75% of the seed height, fits
/// `a·x² + b·x + c` there and reports the vertex. The fit runs whatever
/// `refine` says; `refine_strategies` are not used. The seed passes the
/// same amplitude and lag predicates as the other variants before any fit
/// is attempted. The parabola must be concave and its vertex strictly
/// inside `(lag_min, lag_max)`.
///
/// The width is the Gaussian sigma implied by the curvature of `ln y`
/// over the window, falling back to the value-weighted second moment
/// about the vertex.
///
/// Errors
/// ------
/// - `PeakError` for malformed input or invalid options.
pub fn fit_peak_quadratic(
    x: &[f64], y: &[f64], limits: &SearchLimits, opts: &PeakFitOptions,
) -> PeakResult<FitResult> {
    let corr = prepare(x, y, opts)?;
    let bin_width = corr.bin_width();
    let range = search_range(y, opts.edge_buffer_fraction, opts.tweak_edges);
    let index = match opts.lag_guess {
        Some(guess) => corr.val_to_index(guess),
        None => range.argmax(y),
    };
    let max_steps = step_budget(limits.width_limit, bin_width);
    let mut window =
        forward_search_window(y, index, range, QUADRATIC_SEARCH_FRACTION, max_steps, bin_width);
    window.width = 2.0 * bin_width * window.support as f64 / GAUSSIAN_FWHM;
    let seed = GaussianPeak::new(y[index], x[index], window.width);

    let screen = ValidityScreen::new(limits, opts, bin_width, limits.width_limit).with_strict_lag();
    let mut failure =
        screen.window(&window) | screen.amplitude(seed.amplitude) | screen.lag(seed.center, 0.0);
    if !failure.is_empty() {
        failure |= FailureMask::INIT_FAIL;
    }
    let start = SeedEstimate { index, sign: PeakSign::Positive, peak: seed, window, failure };

    Ok(conclude(start, &screen, opts, true, |seed| {
        let (wx, wy) = (window_slice(x, &window), window_slice(y, &window));
        let parabola = match Parabola::fit(wx, wy) {
            Ok(p) => p,
            Err(err) => {
                log::debug!("quadratic fit failed: {err}");
                return None;
            }
        };
        if !parabola.is_concave() {
            log::debug!("quadratic fit is not concave: a = {}", parabola.a);
            return None;
        }
        let (center, amplitude) = parabola.vertex()?;
        let sigma = log_curvature_width(wx, wy)
            .or_else(|| second_moment_width(wx, wy, center))
            .unwrap_or(seed.sigma);
        Some(GaussianPeak::new(amplitude, center, sigma))
    }))
}

// ---- Helper methods ----

/// Seed estimate and its initial screen, prior to refinement.
#[derive(Debug, Clone, Copy)]
struct SeedEstimate {
    index: usize,
    sign: PeakSign,
    peak: GaussianPeak,
    window: PeakWindow,
    failure: FailureMask,
}

fn prepare<'a>(
    x: &'a [f64], y: &'a [f64], opts: &PeakFitOptions,
) -> PeakResult<CorrelationFunction<'a>> {
    let corr = CorrelationFunction::new(x, y)?;
    opts.validate()?;
    Ok(corr)
}

/// Steps per side allowed by the width limit, `floor(width_limit / bin)`.
fn step_budget(width_limit: f64, bin_width: f64) -> usize {
    (width_limit / bin_width).floor() as usize
}

fn window_slice<'a>(data: &'a [f64], window: &PeakWindow) -> &'a [f64] {
    let end = window.end.min(data.len());
    &data[window.start.min(end)..end]
}

/// Refine (when allowed and the seed passed), screen and apply the
/// rejection policy.
fn conclude<F>(
    seed: SeedEstimate, screen: &ValidityScreen, opts: &PeakFitOptions, attempt_refine: bool,
    refine: F,
) -> FitResult
where
    F: FnOnce(&GaussianPeak) -> Option<GaussianPeak>,
{
    let mut failure = seed.failure;
    let mut estimate = seed.peak;
    if !failure.is_empty() {
        log::debug!(
            "seed at index {} (lag {}, amplitude {}) rejected: {failure}",
            seed.index,
            seed.peak.center,
            seed.peak.amplitude
        );
    } else if attempt_refine {
        match refine(&seed.peak) {
            Some(refined) => {
                estimate = GaussianPeak { center: refined.center % opts.lag_modulus, ..refined };
                failure = screen.refined(&estimate);
                if !failure.is_empty() {
                    log::debug!("refined estimate {estimate:?} rejected: {failure}");
                }
            }
            None => {
                log::debug!("every refinement strategy failed for seed index {}", seed.index);
                failure = FailureMask::FIT_FAIL;
            }
        }
    } else {
        estimate.center %= opts.lag_modulus;
    }

    let is_valid = failure.is_empty();
    let reported = match (is_valid, opts.zero_on_reject) {
        (true, _) => estimate,
        (false, true) => GaussianPeak::new(0.0, 0.0, 0.0),
        (false, false) => seed.peak,
    };
    FitResult {
        index: seed.index,
        lag: reported.center,
        amplitude: seed.sign.factor() * reported.amplitude,
        width: reported.sigma,
        is_valid,
        failure,
        window_start: seed.window.start,
        window_end: seed.window.end,
    }
}
