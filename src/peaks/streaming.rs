//! peaks::streaming — detect a pulse peak that has just passed.
//!
//! Purpose
//! -------
//! Decide, on every new sample of a streaming signal, whether the signal
//! has just gone over a peak, and if so when that peak occurred. Used for
//! pulse-like signals (e.g. cardiac traces) sampled at a fixed rate.
//!
//! Key behaviors
//! -------------
//! - Only the trailing `window_secs` of data set the normative range.
//! - A peak is reported only when the newest sample is above
//!   `min + thresh · range`, at least `hysteresis_secs` have passed since
//!   the previous peak, and the last two steps descend.
//! - The peak time comes from a Gaussian fit over the newest five samples,
//!   seeded by the centroid and second moment (strategy chain
//!   LeastSquares → Moments).

use crate::{
    optimization::least_squares::LsqOptions,
    peaks::{
        errors::{PeakError, PeakResult},
        extremum::argmax_by,
        gaussian::{GaussianPeak, moment_estimate},
        options::RefineStrategy,
        refine::refine_peak,
        validation::validate_values,
    },
};

/// Samples fitted around a just-passed peak.
pub const RECENT_FIT_LEN: usize = 5;

/// Windowing and gating for [`locate_recent_peak`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentPeakOptions {
    pub window_secs: f64,
    pub thresh: f64,
    pub hysteresis_secs: f64,
}

impl Default for RecentPeakOptions {
    fn default() -> Self {
        Self { window_secs: 5.0, thresh: 0.75, hysteresis_secs: 0.4 }
    }
}

impl RecentPeakOptions {
    /// Errors
    /// ------
    /// - `InvalidOption` unless `window_secs > 0`, `thresh ∈ [0, 1]` and
    ///   `hysteresis_secs ≥ 0`, all finite.
    pub fn validate(&self) -> PeakResult<()> {
        if !(self.window_secs.is_finite() && self.window_secs > 0.0) {
            return Err(PeakError::InvalidOption {
                name: "window_secs",
                value: self.window_secs,
                reason: "Window length must be finite and positive.",
            });
        }
        if !(0.0..=1.0).contains(&self.thresh) {
            return Err(PeakError::InvalidOption {
                name: "thresh",
                value: self.thresh,
                reason: "Threshold must lie in [0, 1].",
            });
        }
        if !(self.hysteresis_secs.is_finite() && self.hysteresis_secs >= 0.0) {
            return Err(PeakError::InvalidOption {
                name: "hysteresis_secs",
                value: self.hysteresis_secs,
                reason: "Hysteresis must be finite and non-negative.",
            });
        }
        Ok(())
    }
}

/// Time of a peak the signal has just passed, if any.
///
/// Parameters
/// ----------
/// - `data`: samples so far, oldest first; sample `i` is at `i / rate`.
/// - `sample_rate`: samples per second.
/// - `last_peak_time`: time of the previously reported peak, seconds.
/// - `opts`: see [`RecentPeakOptions`].
///
/// Returns
/// -------
/// `Ok(Some(t))` with the fitted peak time, `Ok(None)` when no peak has
/// just passed or the fit failed.
///
/// Errors
/// ------
/// - `TooFewSamples` for fewer than five samples.
/// - `NonFiniteSample`, `InvalidSampleRate`, `InvalidOption` for malformed
///   input.
pub fn locate_recent_peak(
    data: &[f64], sample_rate: f64, last_peak_time: f64, opts: &RecentPeakOptions,
) -> PeakResult<Option<f64>> {
    if data.len() < RECENT_FIT_LEN {
        return Err(PeakError::TooFewSamples { len: data.len(), min: RECENT_FIT_LEN });
    }
    validate_values(data)?;
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(PeakError::InvalidSampleRate { value: sample_rate });
    }
    opts.validate()?;

    let n = data.len();
    let span = ((opts.window_secs * sample_rate) as usize).max(1);
    let recent = &data[n.saturating_sub(span)..];
    let current_time = (n - 1) as f64 / sample_rate;
    let lo = recent.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if data[n - 1] < lo + (hi - lo) * opts.thresh {
        return Ok(None);
    }
    if current_time - last_peak_time < opts.hysteresis_secs {
        return Ok(None);
    }
    if !(data[n - 1] < data[n - 2] && data[n - 2] <= data[n - 3]) {
        return Ok(None);
    }

    let fit_y = &data[n - RECENT_FIT_LEN..];
    let fit_x: Vec<f64> = (0..RECENT_FIT_LEN)
        .map(|k| current_time + (k as f64 + 1.0 - RECENT_FIT_LEN as f64) / sample_rate)
        .collect();
    let seed = moment_estimate(&fit_x, fit_y).unwrap_or_else(|| {
        let top = argmax_by(fit_y, 0, RECENT_FIT_LEN, |v| v);
        GaussianPeak::new(fit_y[top], fit_x[top], 1.0 / sample_rate)
    });
    let chain = [RefineStrategy::LeastSquares, RefineStrategy::Moments];
    Ok(refine_peak(&fit_x, fit_y, seed, &chain, &LsqOptions::default()).map(|r| r.peak.center))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peaks::gaussian::gauss_eval;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Locating a pulse two samples after it peaked.
    // - The gates: still rising, too soon after the previous peak.
    // - Malformed input.
    //
    // They intentionally DO NOT cover:
    // - Long-running streams; each call is independent.
    // -------------------------------------------------------------------------

    /// Pulse at `t = 2.0 s`, σ = 0.3 s, sampled at 10 Hz up to `end`.
    fn pulse(end_index: usize) -> Vec<f64> {
        (0..=end_index).map(|i| gauss_eval(i as f64 / 10.0, 1.0, 2.0, 0.3)).collect()
    }

    #[test]
    // Purpose
    // -------
    // A pulse that peaked two samples ago is located by the fit.
    //
    // Given
    // -----
    // - Samples up to t = 2.2 s; previous peak at t = 0.
    //
    // Expect
    // ------
    // - Peak time 2.0 s within 1e-4.
    fn locates_just_passed_pulse() {
        // Arrange
        let data = pulse(22);

        // Act
        let t = locate_recent_peak(&data, 10.0, 0.0, &RecentPeakOptions::default())
            .expect("well-formed input");

        // Assert
        assert_relative_eq!(t.expect("peak should be found"), 2.0, epsilon = 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // No peak is reported while rising or inside the hysteresis interval.
    //
    // Given
    // -----
    // - Samples up to t = 1.9 s (still rising).
    // - Samples up to t = 2.2 s with the previous peak at t = 2.0 s.
    //
    // Expect
    // ------
    // - `None` in both cases.
    fn gates_suppress_peaks() {
        // Arrange
        let rising = pulse(19);
        let passed = pulse(22);

        // Act
        let opts = RecentPeakOptions::default();
        let early = locate_recent_peak(&rising, 10.0, 0.0, &opts).expect("well-formed input");
        let soon = locate_recent_peak(&passed, 10.0, 2.0, &opts).expect("well-formed input");

        // Assert
        assert!(early.is_none());
        assert!(soon.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Malformed input is an error, not a missing peak.
    //
    // Given
    // -----
    // - Four samples; a zero sample rate.
    //
    // Expect
    // ------
    // - `TooFewSamples` and `InvalidSampleRate`.
    fn malformed_input_is_error() {
        // Arrange
        let opts = RecentPeakOptions::default();

        // Assert
        assert_eq!(
            locate_recent_peak(&[0.0; 4], 10.0, 0.0, &opts),
            Err(PeakError::TooFewSamples { len: 4, min: 5 })
        );
        assert_eq!(
            locate_recent_peak(&pulse(22), 0.0, 0.0, &opts),
            Err(PeakError::InvalidSampleRate { value: 0.0 })
        );
    }
}
