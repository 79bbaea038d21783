//! peaks::options — search constraints and estimator configuration.
//!
//! Purpose
//! -------
//! Carry every knob of a peak estimate in explicit, validated values passed
//! to each call. Nothing here is process-wide; two calls with different
//! options never interact.
//!
//! Key behaviors
//! -------------
//! - [`SearchLimits`]: admissible lag range and maximum peak width.
//! - [`PeakFitOptions`]: edge handling, thresholds, rejection policy,
//!   refinement strategies and solver settings, with defaults matching the
//!   usual time-delay workflow.
//! - [`LagRangePolicy`]: hard lag range or the soft range widened by 75%
//!   of its span on each side.
//! - [`RefineStrategy`]: the named refinement steps tried in order.
//!
//! Conventions
//! -----------
//! - `lag_guess = Some(v)` seeds the search at the sample nearest to `v`
//!   instead of the maximum.
//! - Construction of `SearchLimits` validates immediately;
//!   `PeakFitOptions` is validated by every estimator through
//!   [`PeakFitOptions::validate`].

use std::fmt;
use std::str::FromStr;

use crate::{
    optimization::least_squares::LsqOptions,
    peaks::{
        errors::{PeakError, PeakResult},
        validation::validate_unit_interval,
    },
};

/// Fraction of the nominal lag span added on each side under
/// [`LagRangePolicy::Soft`].
pub const SOFT_LIMIT_EXTENSION: f64 = 0.75;

/// Admissible lag range and width ceiling for one estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    pub lag_min: f64,
    pub lag_max: f64,
    pub width_limit: f64,
}

impl SearchLimits {
    /// Errors
    /// ------
    /// - `InvalidLagRange` if a bound is not finite or `lag_min > lag_max`.
    /// - `InvalidWidthLimit` unless `width_limit` is finite and `> 0`.
    pub fn new(lag_min: f64, lag_max: f64, width_limit: f64) -> PeakResult<Self> {
        if !lag_min.is_finite() || !lag_max.is_finite() || lag_min > lag_max {
            return Err(PeakError::InvalidLagRange { lag_min, lag_max });
        }
        if !width_limit.is_finite() || width_limit <= 0.0 {
            return Err(PeakError::InvalidWidthLimit { value: width_limit });
        }
        Ok(Self { lag_min, lag_max, width_limit })
    }

    /// Lag bounds widened by `slack` and, under the soft policy, by
    /// [`SOFT_LIMIT_EXTENSION`] of the span.
    pub fn admissible_lags(&self, policy: LagRangePolicy, slack: f64) -> (f64, f64) {
        let extension = match policy {
            LagRangePolicy::Hard => 0.0,
            LagRangePolicy::Soft => SOFT_LIMIT_EXTENSION * (self.lag_max - self.lag_min),
        };
        (self.lag_min - extension - slack, self.lag_max + extension + slack)
    }
}

/// How strictly the seed lag is held to `[lag_min, lag_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LagRangePolicy {
    #[default]
    Hard,
    Soft,
}

impl FromStr for LagRangePolicy {
    type Err = PeakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hard" => Ok(LagRangePolicy::Hard),
            "soft" => Ok(LagRangePolicy::Soft),
            _ => Err(PeakError::InvalidOption {
                name: "lag_range_policy",
                value: f64::NAN,
                reason: "Valid options are case insensitive 'hard' or 'soft'.",
            }),
        }
    }
}

/// One named step of the refinement chain.
///
/// - `LeastSquares`: iterative Gaussian fit (L-BFGS) over the window.
/// - `Moments`: closed-form centroid / second-moment estimate; cheap but
///   biased toward quantized lags.
/// - `InitialGuess`: accept the seed estimate unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineStrategy {
    LeastSquares,
    Moments,
    InitialGuess,
}

impl RefineStrategy {
    pub fn name(self) -> &'static str {
        match self {
            RefineStrategy::LeastSquares => "least_squares",
            RefineStrategy::Moments => "moments",
            RefineStrategy::InitialGuess => "initial_guess",
        }
    }
}

impl fmt::Display for RefineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RefineStrategy {
    type Err = PeakError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "least_squares" | "leastsquares" => Ok(RefineStrategy::LeastSquares),
            "moments" | "fast" => Ok(RefineStrategy::Moments),
            "initial_guess" | "initialguess" => Ok(RefineStrategy::InitialGuess),
            _ => Err(PeakError::InvalidOption {
                name: "refine_strategies",
                value: f64::NAN,
                reason: "Valid strategies are 'least_squares', 'moments' or 'initial_guess'.",
            }),
        }
    }
}

/// Estimator configuration.
///
/// Fields (defaults in brackets)
/// ------
/// - `edge_buffer_fraction` [0.0]: fraction of samples excluded at each end
///   before searching; in `[0, 1)`. Fractions of one half or more
///   collapse the search range to a single sample.
/// - `thresh_val` [0.0] / `uthresh_val` [1.0]: amplitude band enforced when
///   `enforce_threshold` [true].
/// - `tweak_edges` [true]: trim samples that fall monotonically into either
///   boundary before seeding.
/// - `zero_on_reject` [true]: zero lag/amplitude/width of rejected fits;
///   otherwise report the seed estimate.
/// - `refine` [false]: run the refinement chain.
/// - `lag_guess` [None]: seed at this lag instead of the maximum.
/// - `search_fraction` [0.5]: fractional height bounding the fit window.
/// - `bipolar` [false]: let the gradient estimator pick a negative extremum.
/// - `lag_modulus` [1000.0]: fitted lags are reduced modulo this period.
/// - `lag_range_policy` [Hard]: see [`LagRangePolicy`].
/// - `abs_max_sigma` [1000.0]: width ceiling of the gradient estimator.
/// - `refine_strategies` [LeastSquares]: tried in order until one succeeds.
/// - `solver`: least-squares solver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakFitOptions {
    pub edge_buffer_fraction: f64,
    pub thresh_val: f64,
    pub uthresh_val: f64,
    pub tweak_edges: bool,
    pub zero_on_reject: bool,
    pub refine: bool,
    pub lag_guess: Option<f64>,
    pub search_fraction: f64,
    pub bipolar: bool,
    pub lag_modulus: f64,
    pub enforce_threshold: bool,
    pub lag_range_policy: LagRangePolicy,
    pub abs_max_sigma: f64,
    pub refine_strategies: Vec<RefineStrategy>,
    pub solver: LsqOptions,
}

impl Default for PeakFitOptions {
    fn default() -> Self {
        Self {
            edge_buffer_fraction: 0.0,
            thresh_val: 0.0,
            uthresh_val: 1.0,
            tweak_edges: true,
            zero_on_reject: true,
            refine: false,
            lag_guess: None,
            search_fraction: 0.5,
            bipolar: false,
            lag_modulus: 1000.0,
            enforce_threshold: true,
            lag_range_policy: LagRangePolicy::Hard,
            abs_max_sigma: 1000.0,
            refine_strategies: vec![RefineStrategy::LeastSquares],
            solver: LsqOptions::default(),
        }
    }
}

impl PeakFitOptions {
    /// Check every numeric option against its domain.
    ///
    /// Errors
    /// ------
    /// - `InvalidOption` naming the offending field.
    /// - `NoRefineStrategies` when `refine` is set with an empty chain.
    pub fn validate(&self) -> PeakResult<()> {
        validate_unit_interval(
            "edge_buffer_fraction",
            self.edge_buffer_fraction,
            0.0,
            1.0,
            "Edge buffer fraction must lie in [0, 1).",
        )?;
        if !(self.search_fraction > 0.0 && self.search_fraction < 1.0) {
            return Err(PeakError::InvalidOption {
                name: "search_fraction",
                value: self.search_fraction,
                reason: "Search fraction must lie in (0, 1).",
            });
        }
        if !self.thresh_val.is_finite() || !self.uthresh_val.is_finite() {
            return Err(PeakError::InvalidOption {
                name: "thresh_val",
                value: if self.thresh_val.is_finite() { self.uthresh_val } else { self.thresh_val },
                reason: "Amplitude thresholds must be finite.",
            });
        }
        if self.thresh_val > self.uthresh_val {
            return Err(PeakError::InvalidOption {
                name: "uthresh_val",
                value: self.uthresh_val,
                reason: "Upper amplitude threshold must not be below the lower one.",
            });
        }
        if !self.lag_modulus.is_finite() || self.lag_modulus <= 0.0 {
            return Err(PeakError::InvalidOption {
                name: "lag_modulus",
                value: self.lag_modulus,
                reason: "Lag modulus must be finite and positive.",
            });
        }
        if !self.abs_max_sigma.is_finite() || self.abs_max_sigma <= 0.0 {
            return Err(PeakError::InvalidOption {
                name: "abs_max_sigma",
                value: self.abs_max_sigma,
                reason: "Absolute sigma ceiling must be finite and positive.",
            });
        }
        if let Some(guess) = self.lag_guess {
            if !guess.is_finite() {
                return Err(PeakError::InvalidOption {
                    name: "lag_guess",
                    value: guess,
                    reason: "Lag guess must be finite.",
                });
            }
        }
        if self.refine && self.refine_strategies.is_empty() {
            return Err(PeakError::NoRefineStrategies);
        }
        Ok(())
    }
}
