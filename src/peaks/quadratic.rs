//! peaks::quadratic — parabolic vertex fit for the quadratic estimator.
//!
//! Purpose
//! -------
//! Fit `y = a·u² + b·u + c` over a peak window (with `u = x − origin`
//! centered on the window) and read the peak off the vertex. No iteration
//! is involved, so the fit is fast and robust for flat-topped peaks, at
//! the cost of bias on sharply asymmetric ones.
//!
//! Key behaviors
//! -------------
//! - [`Parabola::fit`] solves the degree-2 least-squares problem through
//!   [`polyfit`].
//! - [`log_curvature_width`] recovers a Gaussian sigma from the curvature
//!   of `ln y`; exact for noiseless Gaussian peaks.
//! - [`second_moment_width`] is the value-weighted fallback.

use crate::{
    peaks::errors::{PeakError, PeakResult},
    signal::detrend::polyfit,
};

/// Parabola `a·(x − origin)² + b·(x − origin) + c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parabola {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub origin: f64,
}

impl Parabola {
    /// Least-squares parabola through `(x, y)`, centered on the middle
    /// sample.
    ///
    /// Errors
    /// ------
    /// - `TooFewSamples` for fewer than 3 points.
    /// - `SingularSystem` for degenerate abscissae.
    pub fn fit(x: &[f64], y: &[f64]) -> PeakResult<Self> {
        if x.len() < 3 {
            return Err(PeakError::TooFewSamples { len: x.len(), min: 3 });
        }
        let origin = x[x.len() / 2];
        let u: Vec<f64> = x.iter().map(|&v| v - origin).collect();
        let coeffs = polyfit(&u, y, 2)?;
        Ok(Self { a: coeffs[2], b: coeffs[1], c: coeffs[0], origin })
    }

    pub fn is_concave(&self) -> bool {
        self.a < 0.0
    }

    /// `(x, y)` of the vertex, or `None` for a degenerate (linear) fit.
    pub fn vertex(&self) -> Option<(f64, f64)> {
        if self.a == 0.0 {
            return None;
        }
        let u = -self.b / (2.0 * self.a);
        let value = self.a * u * u + self.b * u + self.c;
        let x = u + self.origin;
        (x.is_finite() && value.is_finite()).then_some((x, value))
    }
}

/// Gaussian sigma from the curvature of `ln y` over the positive samples.
///
/// For `y = A·exp(−(x − μ)²/(2σ²))`, `ln y` is a parabola with leading
/// coefficient `−1/(2σ²)`. Returns `None` with fewer than three positive
/// samples or a non-concave log profile.
pub fn log_curvature_width(x: &[f64], y: &[f64]) -> Option<f64> {
    let (lx, ly): (Vec<f64>, Vec<f64>) =
        x.iter().zip(y).filter(|(_, &v)| v > 0.0).map(|(&xi, &yi)| (xi, yi.ln())).unzip();
    let fit = Parabola::fit(&lx, &ly).ok()?;
    if !fit.is_concave() {
        return None;
    }
    let sigma = (-1.0 / (2.0 * fit.a)).sqrt();
    sigma.is_finite().then_some(sigma)
}

/// `sqrt(|Σ (x − center)² y / Σ y|)`, or `None` for a zero value sum.
pub fn second_moment_width(x: &[f64], y: &[f64], center: f64) -> Option<f64> {
    let total: f64 = y.iter().sum();
    if total == 0.0 {
        return None;
    }
    let moment: f64 = x.iter().zip(y).map(|(&xi, &yi)| (xi - center).powi(2) * yi).sum();
    let sigma = (moment / total).abs().sqrt();
    sigma.is_finite().then_some(sigma)
}
