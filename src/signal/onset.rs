//! signal::onset — rise-time and trapezoid response fits.
//!
//! Purpose
//! -------
//! Fit the onset of a step-like response with one of two piecewise models
//! and accept the fit only when its timing parameters are plausible.
//!
//! Key behaviors
//! -------------
//! - Rise-time model: `0` before the start `s`, then `A·(1 − e^{−(x−s)/τ})`.
//! - Trapezoid model: the same rise for `0 ≤ x − s < top`, then an
//!   exponential fall `A·e^{−(x−s−top)/τ_f}` (no continuity is imposed at
//!   `top`).
//! - Both fits run through [`solve_least_squares`] with finite-difference
//!   gradients and are screened against [`OnsetBounds`]; an out-of-bounds
//!   or non-converged fit comes back rejected with zeroed parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - Time constants enter the models as `|τ|`, so a line-search probe at a
//!   negative constant cannot overflow. A zero constant is an
//!   instantaneous step. Reported constants are non-negative.
//! - Without a guess, fits start from `(0, mean of the samples before the
//!   last one (up to nine), 5, 5)`.

use ndarray::Array1;

use crate::{
    optimization::{
        errors::{OptError, OptResult},
        least_squares::{LsqOptions, ResidualVec, Residuals, Theta, solve_least_squares},
    },
    peaks::{
        errors::{PeakError, PeakResult},
        validation::validate_values,
    },
};

/// Default initial rise/fall time constant.
pub const DEFAULT_TIME_CONSTANT: f64 = 5.0;

/// Samples preceding the last one averaged for the default amplitude.
const AMPLITUDE_SEED_LEN: usize = 9;

/// Rise-time model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiseTimeParams {
    pub start: f64,
    pub amplitude: f64,
    pub rise_time: f64,
}

/// Trapezoid model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrapezoidParams {
    pub start: f64,
    pub amplitude: f64,
    pub rise_time: f64,
    pub fall_time: f64,
}

/// Admissible ranges for fitted onset parameters (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnsetBounds {
    pub min_rise: f64,
    pub max_rise: f64,
    pub min_fall: f64,
    pub max_fall: f64,
    pub min_start: f64,
    pub max_start: f64,
}

impl Default for OnsetBounds {
    fn default() -> Self {
        Self {
            min_rise: 0.0,
            max_rise: 200.0,
            min_fall: 0.0,
            max_fall: 200.0,
            min_start: -100.0,
            max_start: 100.0,
        }
    }
}

impl OnsetBounds {
    fn admits_rise(&self, start: f64, rise_time: f64) -> bool {
        (self.min_start..=self.max_start).contains(&start)
            && (self.min_rise..=self.max_rise).contains(&rise_time)
    }

    fn admits_fall(&self, fall_time: f64) -> bool {
        (self.min_fall..=self.max_fall).contains(&fall_time)
    }
}

/// A fitted onset model and whether it passed the bounds.
///
/// Rejected fits carry `P::default()` (all zeros).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnsetFit<P> {
    pub params: P,
    pub accepted: bool,
}

impl<P: Default> OnsetFit<P> {
    fn rejected() -> Self {
        Self { params: P::default(), accepted: false }
    }
}

/// `0` before `start`, `A·(1 − e^{−(x−s)/|τ|})` after.
pub fn risetime_eval(x: f64, p: &RiseTimeParams) -> f64 {
    let dx = x - p.start;
    if dx < 0.0 { 0.0 } else { p.amplitude * (1.0 - decay(dx, p.rise_time)) }
}

/// Rise for `0 ≤ x − s < top_length`, exponential fall afterwards.
pub fn trapezoid_eval(x: f64, top_length: f64, p: &TrapezoidParams) -> f64 {
    let dx = x - p.start;
    if dx < 0.0 {
        0.0
    } else if dx < top_length {
        p.amplitude * (1.0 - decay(dx, p.rise_time))
    } else {
        p.amplitude * decay(dx - top_length, p.fall_time)
    }
}

/// `e^{−t/|τ|}`, a unit step when `τ == 0`.
fn decay(t: f64, tau: f64) -> f64 {
    let tau = tau.abs();
    if tau == 0.0 { if t > 0.0 { 0.0 } else { 1.0 } } else { (-t / tau).exp() }
}

/// Observations for an onset fit.
#[derive(Debug, Clone, PartialEq)]
pub struct OnsetData {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
}

/// Residuals of the rise-time model, `θ = (s, A, τ)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiseTimeModel;

impl Residuals for RiseTimeModel {
    type Data = OnsetData;

    fn residuals(&self, theta: &Theta, data: &OnsetData) -> OptResult<ResidualVec> {
        let p = RiseTimeParams { start: theta[0], amplitude: theta[1], rise_time: theta[2] };
        Ok(&data.y - &data.x.mapv(|x| risetime_eval(x, &p)))
    }

    fn n_obs(&self, data: &OnsetData) -> usize {
        data.x.len()
    }

    fn check(&self, theta: &Theta, _data: &OnsetData) -> OptResult<()> {
        expect_len(theta, 3)
    }
}

/// Residuals of the trapezoid model, `θ = (s, A, τ_rise, τ_fall)`.
#[derive(Debug, Clone, Copy)]
pub struct TrapezoidModel {
    pub top_length: f64,
}

impl Residuals for TrapezoidModel {
    type Data = OnsetData;

    fn residuals(&self, theta: &Theta, data: &OnsetData) -> OptResult<ResidualVec> {
        let p = TrapezoidParams {
            start: theta[0],
            amplitude: theta[1],
            rise_time: theta[2],
            fall_time: theta[3],
        };
        Ok(&data.y - &data.x.mapv(|x| trapezoid_eval(x, self.top_length, &p)))
    }

    fn n_obs(&self, data: &OnsetData) -> usize {
        data.x.len()
    }

    fn check(&self, theta: &Theta, _data: &OnsetData) -> OptResult<()> {
        expect_len(theta, 4)
    }
}

fn expect_len(theta: &Theta, expected: usize) -> OptResult<()> {
    if theta.len() != expected {
        return Err(OptError::ThetaLengthMismatch { expected, actual: theta.len() });
    }
    Ok(())
}

/// Fit the rise-time model to `(x, y)`.
///
/// Parameters
/// ----------
/// - `x`, `y`: equal-length finite samples, at least four.
/// - `guess`: starting parameters; `None` uses the default seed.
/// - `bounds`: admissible start and rise time.
/// - `solver`: least-squares settings.
///
/// Returns
/// -------
/// An accepted fit, or a rejected one with zeroed parameters when the
/// solver fails or the parameters leave `bounds`.
///
/// Errors
/// ------
/// - `LengthMismatch`, `TooFewSamples`, `NonFiniteSample` for malformed
///   input.
pub fn fit_risetime(
    x: &[f64], y: &[f64], guess: Option<RiseTimeParams>, bounds: &OnsetBounds,
    solver: &LsqOptions,
) -> PeakResult<OnsetFit<RiseTimeParams>> {
    let data = onset_data(x, y, 4)?;
    let p0 = guess.unwrap_or(RiseTimeParams {
        start: 0.0,
        amplitude: amplitude_seed(y),
        rise_time: DEFAULT_TIME_CONSTANT,
    });
    let theta0 = Array1::from(vec![p0.start, p0.amplitude, p0.rise_time]);
    let theta = match solve_least_squares(&RiseTimeModel, theta0, &data, solver) {
        Ok(outcome) => outcome.theta_hat,
        Err(err) => {
            log::debug!("rise-time fit failed: {err}");
            return Ok(OnsetFit::rejected());
        }
    };
    let params = RiseTimeParams { start: theta[0], amplitude: theta[1], rise_time: theta[2].abs() };
    if !bounds.admits_rise(params.start, params.rise_time) {
        log::debug!("rise-time fit {params:?} outside bounds");
        return Ok(OnsetFit::rejected());
    }
    Ok(OnsetFit { params, accepted: true })
}

/// Fit the trapezoid model with plateau length `top_length` to `(x, y)`.
///
/// As [`fit_risetime`], with the fall time also screened against
/// `bounds`. Requires at least five samples.
///
/// Errors
/// ------
/// - `LengthMismatch`, `TooFewSamples`, `NonFiniteSample` for malformed
///   input; `InvalidOption` for a negative or non-finite `top_length`.
pub fn fit_trapezoid(
    x: &[f64], y: &[f64], top_length: f64, guess: Option<TrapezoidParams>, bounds: &OnsetBounds,
    solver: &LsqOptions,
) -> PeakResult<OnsetFit<TrapezoidParams>> {
    if !(top_length.is_finite() && top_length >= 0.0) {
        return Err(PeakError::InvalidOption {
            name: "top_length",
            value: top_length,
            reason: "Plateau length must be finite and non-negative.",
        });
    }
    let data = onset_data(x, y, 5)?;
    let p0 = guess.unwrap_or(TrapezoidParams {
        start: 0.0,
        amplitude: amplitude_seed(y),
        rise_time: DEFAULT_TIME_CONSTANT,
        fall_time: DEFAULT_TIME_CONSTANT,
    });
    let theta0 = Array1::from(vec![p0.start, p0.amplitude, p0.rise_time, p0.fall_time]);
    let model = TrapezoidModel { top_length };
    let theta = match solve_least_squares(&model, theta0, &data, solver) {
        Ok(outcome) => outcome.theta_hat,
        Err(err) => {
            log::debug!("trapezoid fit failed: {err}");
            return Ok(OnsetFit::rejected());
        }
    };
    let params = TrapezoidParams {
        start: theta[0],
        amplitude: theta[1],
        rise_time: theta[2].abs(),
        fall_time: theta[3].abs(),
    };
    if !(bounds.admits_rise(params.start, params.rise_time) && bounds.admits_fall(params.fall_time))
    {
        log::debug!("trapezoid fit {params:?} outside bounds");
        return Ok(OnsetFit::rejected());
    }
    Ok(OnsetFit { params, accepted: true })
}

// ---- Helper methods ----

fn onset_data(x: &[f64], y: &[f64], min: usize) -> PeakResult<OnsetData> {
    if x.len() != y.len() {
        return Err(PeakError::LengthMismatch { x_len: x.len(), y_len: y.len() });
    }
    if y.len() < min {
        return Err(PeakError::TooFewSamples { len: y.len(), min });
    }
    validate_values(x)?;
    validate_values(y)?;
    Ok(OnsetData { x: Array1::from(x.to_vec()), y: Array1::from(y.to_vec()) })
}

/// Mean of up to nine samples preceding the last one.
fn amplitude_seed(y: &[f64]) -> f64 {
    let end = y.len() - 1;
    let tail = &y[end.saturating_sub(AMPLITUDE_SEED_LEN)..end];
    tail.iter().sum::<f64>() / tail.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Piecewise model evaluation.
    // - Recovery of rise-time and trapezoid parameters from the default
    //   seed.
    // - Rejection through bounds and malformed-input errors.
    //
    // They intentionally DO NOT cover:
    // - Noisy data; the fits are plain least squares.
    // -------------------------------------------------------------------------

    fn grid() -> Vec<f64> {
        (0..81).map(|k| 0.5 * k as f64).collect()
    }

    #[test]
    // Purpose
    // -------
    // The piecewise models are zero before the start and follow their
    // exponential branches after it.
    //
    // Given
    // -----
    // - s = 1, A = 2, τ = 3, τ_f = 4, top = 5.
    //
    // Expect
    // ------
    // - Closed-form values on each branch.
    fn models_follow_their_branches() {
        // Arrange
        let r = RiseTimeParams { start: 1.0, amplitude: 2.0, rise_time: 3.0 };
        let t = TrapezoidParams { start: 1.0, amplitude: 2.0, rise_time: 3.0, fall_time: 4.0 };

        // Assert
        assert_eq!(risetime_eval(0.5, &r), 0.0);
        assert_relative_eq!(risetime_eval(4.0, &r), 2.0 * (1.0 - (-1.0f64).exp()), epsilon = 1e-15);
        assert_relative_eq!(trapezoid_eval(4.0, 5.0, &t), 2.0 * (1.0 - (-1.0f64).exp()));
        assert_relative_eq!(trapezoid_eval(10.0, 5.0, &t), 2.0 * (-1.0f64).exp(), epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // A noiseless rise is recovered from a nearby guess.
    //
    // Given
    // -----
    // - s = 2.25, A = 3, τ = 4 on x = 0..40 step 0.5.
    // - Guess (2.3, 2.8, 4.5); the start stays between the same two samples,
    //   where the cost is smooth in `s`.
    //
    // Expect
    // ------
    // - Accepted; start within 0.01, amplitude and rise time within 1%.
    fn risetime_fit_recovers_parameters() {
        // Arrange
        let truth = RiseTimeParams { start: 2.25, amplitude: 3.0, rise_time: 4.0 };
        let guess = RiseTimeParams { start: 2.3, amplitude: 2.8, rise_time: 4.5 };
        let x = grid();
        let y: Vec<f64> = x.iter().map(|&v| risetime_eval(v, &truth)).collect();

        // Act
        let fit =
            fit_risetime(&x, &y, Some(guess), &OnsetBounds::default(), &LsqOptions::default())
                .expect("well-formed input");

        // Assert
        assert!(fit.accepted);
        assert_relative_eq!(fit.params.start, 2.25, epsilon = 1e-2);
        assert_relative_eq!(fit.params.amplitude, 3.0, max_relative = 1e-2);
        assert_relative_eq!(fit.params.rise_time, 4.0, max_relative = 1e-2);
    }

    #[test]
    // Purpose
    // -------
    // A trapezoid response is recovered when seeded near the truth.
    //
    // Given
    // -----
    // - s = 3.25, A = 1.5, τ = 2, τ_f = 6, top = 12.
    // - Guess (3.1, 1.4, 2.5, 5).
    //
    // Expect
    // ------
    // - Accepted; every parameter within 2%.
    fn trapezoid_fit_recovers_parameters() {
        // Arrange
        let truth = TrapezoidParams { start: 3.25, amplitude: 1.5, rise_time: 2.0, fall_time: 6.0 };
        let guess = TrapezoidParams { start: 3.1, amplitude: 1.4, rise_time: 2.5, fall_time: 5.0 };
        let x = grid();
        let y: Vec<f64> = x.iter().map(|&v| trapezoid_eval(v, 12.0, &truth)).collect();

        // Act
        let fit = fit_trapezoid(
            &x,
            &y,
            12.0,
            Some(guess),
            &OnsetBounds::default(),
            &LsqOptions::default(),
        )
        .expect("well-formed input");

        // Assert
        assert!(fit.accepted);
        assert_relative_eq!(fit.params.start, 3.25, max_relative = 2e-2);
        assert_relative_eq!(fit.params.amplitude, 1.5, max_relative = 2e-2);
        assert_relative_eq!(fit.params.rise_time, 2.0, max_relative = 2e-2);
        assert_relative_eq!(fit.params.fall_time, 6.0, max_relative = 2e-2);
    }

    #[test]
    // Purpose
    // -------
    // Fits outside the bounds come back rejected and zeroed; malformed input
    // is an error.
    //
    // Given
    // -----
    // - The rise-time data and guess with `max_rise = 1`.
    // - Mismatched lengths.
    //
    // Expect
    // ------
    // - `accepted == false` with default parameters; `LengthMismatch`.
    fn out_of_bounds_fit_is_rejected() {
        // Arrange
        let truth = RiseTimeParams { start: 2.25, amplitude: 3.0, rise_time: 4.0 };
        let x = grid();
        let y: Vec<f64> = x.iter().map(|&v| risetime_eval(v, &truth)).collect();
        let guess = RiseTimeParams { start: 2.3, amplitude: 2.8, rise_time: 4.5 };
        let tight = OnsetBounds { max_rise: 1.0, ..OnsetBounds::default() };

        // Act
        let fit = fit_risetime(&x, &y, Some(guess), &tight, &LsqOptions::default())
            .expect("well-formed input");
        let bad = fit_risetime(&x[..10], &y, None, &tight, &LsqOptions::default());

        // Assert
        assert!(!fit.accepted);
        assert_eq!(fit.params, RiseTimeParams::default());
        assert_eq!(bad, Err(PeakError::LengthMismatch { x_len: 10, y_len: 81 }));
    }

    #[test]
    // Purpose
    // -------
    // The default amplitude seed averages the samples before the last one.
    //
    // Given
    // -----
    // - y = 0..12 (so the nine samples before the last are 2..10), and a
    //   three-sample series.
    //
    // Expect
    // ------
    // - 6.0 and the mean of the first two samples.
    fn amplitude_seed_skips_last_sample() {
        // Arrange
        let long: Vec<f64> = (0..12).map(f64::from).collect();

        // Assert
        assert_relative_eq!(amplitude_seed(&long), 6.0);
        assert_relative_eq!(amplitude_seed(&[1.0, 3.0, 100.0]), 2.0);
    }
}
