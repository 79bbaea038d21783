//! peaks::screen — independent validity predicates for peak estimates.
//!
//! Purpose
//! -------
//! Decide whether a seed or refined estimate is acceptable. Each predicate
//! inspects one property and contributes one bit of [`FailureMask`];
//! predicates never short-circuit each other, so a rejected estimate
//! carries every reason that applies.
//!
//! Key behaviors
//! -------------
//! - [`ValidityScreen::initial`] screens the unrefined seed and tags any
//!   rejection with `INIT_FAIL`.
//! - [`ValidityScreen::refined`] screens a refined estimate and tags any
//!   rejection with `FIT_FAIL`.
//!
//! Invariants & assumptions
//! ------------------------
//! - An empty mask means accepted. Non-finite values always fail the
//!   predicate they are tested against.
//! - The refined screen uses the hard lag range whatever the lag policy;
//!   the soft extension only widens the seed check.

use crate::peaks::{
    failure::FailureMask,
    gaussian::GaussianPeak,
    options::{LagRangePolicy, PeakFitOptions, SearchLimits},
    window::PeakWindow,
};

/// Largest amplitude magnitude a refined fit may report; correlation values
/// are assumed normalized.
pub const MAX_REFINED_AMPLITUDE: f64 = 1.0;

/// Screening configuration for one estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityScreen {
    limits: SearchLimits,
    policy: LagRangePolicy,
    thresh_val: f64,
    uthresh_val: f64,
    enforce_threshold: bool,
    width_ceiling: f64,
    bin_width: f64,
    strict_lag: bool,
}

impl ValidityScreen {
    /// Screen against `limits` and the thresholds in `opts`, rejecting
    /// widths above `width_ceiling`.
    pub fn new(
        limits: &SearchLimits, opts: &PeakFitOptions, bin_width: f64, width_ceiling: f64,
    ) -> Self {
        Self {
            limits: *limits,
            policy: opts.lag_range_policy,
            thresh_val: opts.thresh_val,
            uthresh_val: opts.uthresh_val,
            enforce_threshold: opts.enforce_threshold,
            width_ceiling,
            bin_width,
            strict_lag: false,
        }
    }

    /// Require refined lags to lie strictly inside `(lag_min, lag_max)`.
    pub fn with_strict_lag(mut self) -> Self {
        self.strict_lag = true;
        self
    }

    /// `LAG` unless `lag` lies in the admissible range widened by `slack`.
    pub fn lag(&self, lag: f64, slack: f64) -> FailureMask {
        let (lo, hi) = self.limits.admissible_lags(self.policy, slack);
        if lo <= lag && lag <= hi { FailureMask::NONE } else { FailureMask::LAG }
    }

    /// `HIT_EDGE` when `lag` is within one bin of either range limit.
    pub fn edge(&self, lag: f64) -> FailureMask {
        let lo = self.limits.lag_min + self.bin_width;
        let hi = self.limits.lag_max - self.bin_width;
        if lo <= lag && lag <= hi { FailureMask::NONE } else { FailureMask::HIT_EDGE }
    }

    /// `AMP_LOW` outside `[thresh_val, uthresh_val]` (when enforced),
    /// `AMP_NEGATIVE` below zero.
    pub fn amplitude(&self, amplitude: f64) -> FailureMask {
        let mut mask = FailureMask::NONE;
        let in_band = self.thresh_val <= amplitude && amplitude <= self.uthresh_val;
        if self.enforce_threshold && !in_band {
            mask |= FailureMask::AMP_LOW;
        }
        if amplitude < 0.0 || amplitude.is_nan() {
            mask |= FailureMask::AMP_NEGATIVE;
        }
        mask
    }

    /// `WIDTH` above the ceiling.
    pub fn width(&self, width: f64) -> FailureMask {
        if width <= self.width_ceiling { FailureMask::NONE } else { FailureMask::WIDTH }
    }

    /// `SEARCH_WINDOW` when the window holds too few samples to fit.
    pub fn window(&self, window: &PeakWindow) -> FailureMask {
        if window.is_too_narrow() { FailureMask::SEARCH_WINDOW } else { FailureMask::NONE }
    }

    /// Screen a seed estimate.
    ///
    /// Parameters
    /// ----------
    /// - `seed`: amplitude, lag and width before refinement.
    /// - `window`: the fit window grown around the seed.
    /// - `lag_slack`: extra tolerance on the lag range, in lag units.
    /// - `check_edge`: also raise `HIT_EDGE` for lags at the range limits.
    ///
    /// Returns
    /// -------
    /// Every failed predicate, plus `INIT_FAIL` when any failed.
    pub fn initial(
        &self, seed: &GaussianPeak, window: &PeakWindow, lag_slack: f64, check_edge: bool,
    ) -> FailureMask {
        let mut mask = self.lag(seed.center, lag_slack)
            | self.width(seed.sigma)
            | self.window(window)
            | self.amplitude(seed.amplitude);
        if check_edge {
            mask |= self.edge(seed.center);
        }
        if !mask.is_empty() {
            mask |= FailureMask::INIT_FAIL;
        }
        mask
    }

    /// Screen a refined estimate.
    ///
    /// - `|A| > 1` or non-finite amplitude → `AMP_LOW`.
    /// - lag outside the hard range → `LAG`.
    /// - width above the ceiling → `WIDTH`; non-positive width →
    ///   `SEARCH_WINDOW`.
    /// - amplitude exactly zero → `FIT_FAIL` alone.
    ///
    /// `FIT_FAIL` accompanies every rejection.
    pub fn refined(&self, fit: &GaussianPeak) -> FailureMask {
        let mut mask = FailureMask::NONE;
        if !(fit.amplitude.abs() <= MAX_REFINED_AMPLITUDE) {
            mask |= FailureMask::AMP_LOW;
        }
        let (lo, hi) = (self.limits.lag_min, self.limits.lag_max);
        let lag_ok = if self.strict_lag {
            lo < fit.center && fit.center < hi
        } else {
            lo <= fit.center && fit.center <= hi
        };
        if !lag_ok {
            mask |= FailureMask::LAG;
        }
        if fit.sigma > self.width_ceiling {
            mask |= FailureMask::WIDTH;
        }
        if !(fit.sigma > 0.0) {
            mask |= FailureMask::SEARCH_WINDOW;
        }
        if !mask.is_empty() || fit.amplitude == 0.0 {
            mask |= FailureMask::FIT_FAIL;
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Each predicate in isolation, including the soft lag policy and the
    //   threshold toggle.
    // - Accumulation of every failing bit plus INIT_FAIL / FIT_FAIL tags.
    //
    // They intentionally DO NOT cover:
    // - How estimators act on a mask (zeroing / holding); see `estimator`.
    // -------------------------------------------------------------------------

    fn screen(opts: &PeakFitOptions) -> ValidityScreen {
        let limits = SearchLimits::new(-5.0, 5.0, 2.0).expect("valid limits");
        ValidityScreen::new(&limits, opts, 0.1, 2.0)
    }

    fn window(support: usize) -> PeakWindow {
        PeakWindow { start: 10, end: 10 + support, support, width: 0.5 }
    }

    #[test]
    // Purpose
    // -------
    // The soft policy widens the seed lag range by 75% of its span.
    //
    // Given
    // -----
    // - Range [−5, 5], lag 11.0.
    //
    // Expect
    // ------
    // - LAG under the hard policy; accepted under soft (limit 12.5).
    fn lag_predicate_honours_soft_policy() {
        // Arrange
        let hard = screen(&PeakFitOptions::default());
        let soft = screen(&PeakFitOptions {
            lag_range_policy: LagRangePolicy::Soft,
            ..PeakFitOptions::default()
        });

        // Assert
        assert_eq!(hard.lag(11.0, 0.0), FailureMask::LAG);
        assert!(soft.lag(11.0, 0.0).is_empty());
        assert!(hard.lag(5.05, 0.1).is_empty());
        assert_eq!(hard.lag(f64::NAN, 0.0), FailureMask::LAG);
    }

    #[test]
    // Purpose
    // -------
    // Amplitude thresholds apply only when enforced; negativity always
    // applies.
    //
    // Given
    // -----
    // - Band [0, 1]; amplitudes 1.5 and −0.2.
    //
    // Expect
    // ------
    // - 1.5: AMP_LOW when enforced, clean otherwise.
    // - −0.2: AMP_LOW|AMP_NEGATIVE when enforced, AMP_NEGATIVE otherwise.
    fn amplitude_predicate_respects_enforcement() {
        // Arrange
        let enforced = screen(&PeakFitOptions::default());
        let relaxed =
            screen(&PeakFitOptions { enforce_threshold: false, ..PeakFitOptions::default() });

        // Assert
        assert_eq!(enforced.amplitude(1.5), FailureMask::AMP_LOW);
        assert!(relaxed.amplitude(1.5).is_empty());
        assert_eq!(enforced.amplitude(-0.2), FailureMask::AMP_LOW | FailureMask::AMP_NEGATIVE);
        assert_eq!(relaxed.amplitude(-0.2), FailureMask::AMP_NEGATIVE);
    }

    #[test]
    // Purpose
    // -------
    // The initial screen collects every failing predicate and tags the
    // result with INIT_FAIL; a clean seed stays clean.
    //
    // Given
    // -----
    // - Seed with lag 4.95 (edge), width 3.0 (> 2.0), 2-sample window.
    //
    // Expect
    // ------
    // - HIT_EDGE|WIDTH|SEARCH_WINDOW|INIT_FAIL; empty mask for a good seed.
    fn initial_screen_accumulates_bits() {
        // Arrange
        let s = screen(&PeakFitOptions::default());
        let bad = GaussianPeak::new(0.5, 4.95, 3.0);
        let good = GaussianPeak::new(0.5, 0.0, 0.5);

        // Act
        let bad_mask = s.initial(&bad, &window(2), 0.0, true);
        let good_mask = s.initial(&good, &window(9), 0.0, true);

        // Assert
        assert_eq!(
            bad_mask,
            FailureMask::HIT_EDGE
                | FailureMask::WIDTH
                | FailureMask::SEARCH_WINDOW
                | FailureMask::INIT_FAIL
        );
        assert!(good_mask.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // The refined screen tags every rejection with FIT_FAIL, including the
    // zero-amplitude case that has no other bit.
    //
    // Given
    // -----
    // - |A| = 1.2, lag 7, width −0.1; and a zero-amplitude fit.
    //
    // Expect
    // ------
    // - AMP_LOW|LAG|SEARCH_WINDOW|FIT_FAIL; FIT_FAIL alone for A = 0.
    fn refined_screen_tags_fit_fail() {
        // Arrange
        let s = screen(&PeakFitOptions::default());

        // Act
        let wild = s.refined(&GaussianPeak::new(-1.2, 7.0, -0.1));
        let zero = s.refined(&GaussianPeak::new(0.0, 0.0, 0.5));
        let good = s.refined(&GaussianPeak::new(0.9, 0.0, 0.5));

        // Assert
        assert_eq!(
            wild,
            FailureMask::AMP_LOW
                | FailureMask::LAG
                | FailureMask::SEARCH_WINDOW
                | FailureMask::FIT_FAIL
        );
        assert_eq!(zero, FailureMask::FIT_FAIL);
        assert!(good.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Strict lag screening rejects a vertex sitting exactly on a limit.
    //
    // Given
    // -----
    // - Refined lag exactly 5.0 = lag_max.
    //
    // Expect
    // ------
    // - Accepted by the inclusive screen, LAG|FIT_FAIL by the strict one.
    fn strict_lag_rejects_boundary() {
        // Arrange
        let s = screen(&PeakFitOptions::default());
        let fit = GaussianPeak::new(0.5, 5.0, 0.5);

        // Assert
        assert!(s.refined(&fit).is_empty());
        assert_eq!(s.with_strict_lag().refined(&fit), FailureMask::LAG | FailureMask::FIT_FAIL);
    }
}
