//! High-level entry point for fitting a user-provided `Residuals` model.
//!
//! This checks the problem shape, selects an L-BFGS solver with either
//! Hager–Zhang or More–Thuente line search, wraps the model in an
//! `ArgMinAdapter` (which minimizes `½‖r(θ)‖²`), and delegates the run to
//! `run_lbfgs`.
use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::{
        adapter::ArgMinAdapter,
        builders::{build_optimizer_hager_zhang, build_optimizer_more_thuente},
        run::run_lbfgs,
        traits::{LineSearcher, LsqOptions, LsqOutcome, Residuals},
        types::Theta,
        validation::validate_theta0,
    },
};

/// Solve `min_θ ½ Σ r_i(θ)²` by L-BFGS with the chosen line search.
///
/// # Behavior
/// - Rejects non-finite `theta0` and problems with fewer observations than
///   parameters.
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Builds the solver selected by `opts.line_searcher` and runs it with a
///   bounded iteration budget.
///
/// # Errors
/// - [`OptError::InvalidThetaInput`] / [`OptError::Underdetermined`].
/// - Propagates any error from `f.check`, the builders, or the runner.
/// - [`OptError::NumericalFailure`] when the solver does not converge
///   within the iteration cap.
///
/// # Example
/// ```no_run
/// use ndarray::{Array1, array};
/// use rust_peakfit::optimization::{
///     errors::OptResult,
///     least_squares::{LsqOptions, Residuals, ResidualVec, Theta, solve_least_squares},
/// };
///
/// struct Offset;
/// impl Residuals for Offset {
///     type Data = Array1<f64>;
///     fn residuals(&self, theta: &Theta, y: &Array1<f64>) -> OptResult<ResidualVec> {
///         Ok(y.mapv(|v| v - theta[0]))
///     }
///     fn n_obs(&self, y: &Array1<f64>) -> usize { y.len() }
///     fn check(&self, _: &Theta, _: &Array1<f64>) -> OptResult<()> { Ok(()) }
/// }
///
/// let y = array![1.0, 2.0, 3.0];
/// let out = solve_least_squares(&Offset, array![0.0], &y, &LsqOptions::default()).unwrap();
/// assert!((out.theta_hat[0] - 2.0).abs() < 1e-6);
/// ```
pub fn solve_least_squares<F: Residuals>(
    f: &F, theta0: Theta, data: &F::Data, opts: &LsqOptions,
) -> OptResult<LsqOutcome> {
    validate_theta0(&theta0)?;
    let observations = f.n_obs(data);
    if observations < theta0.len() {
        return Err(OptError::Underdetermined { observations, parameters: theta0.len() });
    }
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::HagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::MoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}
