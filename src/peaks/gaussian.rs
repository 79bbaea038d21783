//! peaks::gaussian — symmetric Gaussian peak model and its two fits.
//!
//! Purpose
//! -------
//! Model a correlation peak as `y = A · exp(−(x − μ)² / (2σ²))` and provide
//! the two ways of fitting it used by the refinement chain:
//! - [`fit_gaussian`]: iterative least squares seeded from an initial
//!   estimate, via [`solve_least_squares`] with an analytic Jacobian.
//! - [`moment_estimate`]: closed-form value-weighted centroid and second
//!   moment. Cheap, but biased toward quantized centers; not used unless
//!   requested.
//!
//! Conventions
//! -----------
//! - Parameter order is `θ = (A, μ, σ)`.
//! - The model is symmetric in `σ`; fitted widths are reported as `|σ|`.

use ndarray::{Array1, Array2};

use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::{Jacobian, LsqOptions, ResidualVec, Residuals, Theta, solve_least_squares},
};

/// Amplitude, center and width of a Gaussian peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianPeak {
    pub amplitude: f64,
    pub center: f64,
    pub sigma: f64,
}

impl GaussianPeak {
    pub fn new(amplitude: f64, center: f64, sigma: f64) -> Self {
        Self { amplitude, center, sigma }
    }

    /// Evaluate the model at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        gauss_eval(x, self.amplitude, self.center, self.sigma)
    }

    fn to_theta(self) -> Theta {
        Array1::from(vec![self.amplitude, self.center, self.sigma])
    }
}

/// `A · exp(−(x − μ)² / (2σ²))`.
#[inline]
pub fn gauss_eval(x: f64, amplitude: f64, center: f64, sigma: f64) -> f64 {
    let d = x - center;
    amplitude * (-(d * d) / (2.0 * sigma * sigma)).exp()
}

/// Observations for a Gaussian fit.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianData {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
}

/// Residual model `r_i = y_i − A · exp(−(x_i − μ)² / (2σ²))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianResiduals;

impl Residuals for GaussianResiduals {
    type Data = GaussianData;

    fn residuals(&self, theta: &Theta, data: &GaussianData) -> OptResult<ResidualVec> {
        let (a, mu, sigma) = (theta[0], theta[1], theta[2]);
        Ok(&data.y - &data.x.mapv(|x| gauss_eval(x, a, mu, sigma)))
    }

    fn n_obs(&self, data: &GaussianData) -> usize {
        data.x.len()
    }

    fn check(&self, theta: &Theta, data: &GaussianData) -> OptResult<()> {
        if theta.len() != 3 {
            return Err(OptError::ThetaLengthMismatch { expected: 3, actual: theta.len() });
        }
        if theta[2] == 0.0 {
            return Err(OptError::InvalidThetaInput { index: 2, value: theta[2] });
        }
        if data.x.len() != data.y.len() {
            return Err(OptError::ResidualDimMismatch {
                expected: data.x.len(),
                found: data.y.len(),
            });
        }
        Ok(())
    }

    fn jacobian(&self, theta: &Theta, data: &GaussianData) -> OptResult<Jacobian> {
        let (a, mu, sigma) = (theta[0], theta[1], theta[2]);
        let s2 = sigma * sigma;
        let mut jac = Array2::zeros((data.x.len(), 3));
        for (i, &x) in data.x.iter().enumerate() {
            let d = x - mu;
            let e = (-(d * d) / (2.0 * s2)).exp();
            jac[[i, 0]] = -e;
            jac[[i, 1]] = -a * e * d / s2;
            jac[[i, 2]] = -a * e * d * d / (s2 * sigma);
        }
        Ok(jac)
    }
}

/// Fit a Gaussian to `(x, y)` starting from `initial`.
///
/// Errors
/// ------
/// - Any [`OptError`] from the solver, including
///   [`OptError::NumericalFailure`] when the iteration budget runs out.
pub fn fit_gaussian(
    x: &[f64], y: &[f64], initial: GaussianPeak, opts: &LsqOptions,
) -> OptResult<GaussianPeak> {
    let data = GaussianData { x: Array1::from(x.to_vec()), y: Array1::from(y.to_vec()) };
    let outcome = solve_least_squares(&GaussianResiduals, initial.to_theta(), &data, opts)?;
    let theta = outcome.theta_hat;
    Ok(GaussianPeak::new(theta[0], theta[1], theta[2].abs()))
}

/// Closed-form centroid / second-moment estimate over `(x, y)`.
///
/// Returns `None` when the value sum is not strictly positive or the
/// result is not finite.
pub fn moment_estimate(x: &[f64], y: &[f64]) -> Option<GaussianPeak> {
    let total: f64 = y.iter().sum();
    if !(total > 0.0) {
        return None;
    }
    let center = x.iter().zip(y).map(|(&xi, &yi)| xi * yi).sum::<f64>() / total;
    let second = x.iter().zip(y).map(|(&xi, &yi)| (xi - center).powi(2) * yi).sum::<f64>() / total;
    let amplitude = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let peak = GaussianPeak::new(amplitude, center, second.abs().sqrt());
    let finite = peak.amplitude.is_finite() && peak.center.is_finite() && peak.sigma.is_finite();
    finite.then_some(peak)
}
