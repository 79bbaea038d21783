//! Public API surface for nonlinear least squares.
//!
//! - [`Residuals`]: trait users implement for their model.
//! - [`LsqOptions`] and [`Tolerances`]: configuration for the solver.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`LsqOutcome`]: normalized result returned by [`solve_least_squares`].
//!
//! Convention: we minimize the cost `c(θ) = ½ Σ r_i(θ)²`. If an analytic
//! Jacobian is provided it must be the Jacobian of the residuals,
//! `J_ij = ∂r_i/∂θ_j`; the adapter forms `∇c(θ) = Jᵀ r`.
//!
//! [`solve_least_squares`]: crate::optimization::least_squares::api::solve_least_squares
use crate::optimization::{
    errors::{OptError, OptResult},
    least_squares::{
        types::{FnEvalMap, Grad, Jacobian, ResidualVec, Theta},
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented residual model.
///
/// - `type Data`: observations carried into `residuals`/`jacobian`/`check`.
///
/// Required:
/// - `residuals(&Theta, &Data) -> OptResult<ResidualVec>`: evaluate
///   `r(θ) = y − f(x; θ)`, one entry per observation.
/// - `n_obs(&Data) -> usize`: number of observations (length of `r`).
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook called once
///   before solving.
///
/// Optional:
/// - `jacobian(&Theta, &Data) -> OptResult<Jacobian>`: analytic `∂r/∂θ`.
///   If not implemented, finite differences of the cost are used.
pub trait Residuals {
    type Data: 'static;

    // Required methods
    fn residuals(&self, theta: &Theta, data: &Self::Data) -> OptResult<ResidualVec>;
    fn n_obs(&self, data: &Self::Data) -> usize;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn jacobian(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Jacobian> {
        Err(OptError::JacobianNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing is case-insensitive (`"MoreThuente"`, `"HagerZhang"`); unknown
/// names return `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `line_searcher: LineSearcher` — line-search algorithm used by L-BFGS.
/// - `lbfgs_mem: Option<usize>` — history size; `None` uses the default of 7.
///
/// Default:
/// - `tols`: `tol_grad = 1e-9`, `tol_cost = 1e-14`, `max_iter = 500`
/// - `line_searcher`: `MoreThuente`
/// - `lbfgs_mem`: `None`
#[derive(Debug, Clone, PartialEq)]
pub struct LsqOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl LsqOptions {
    /// Create a new set of solver options.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, lbfgs_mem })
    }
}

impl Default for LsqOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances {
                tol_grad: Some(DEFAULT_TOL_GRAD),
                tol_cost: Some(DEFAULT_TOL_COST),
                max_iter: Some(DEFAULT_MAX_ITER),
            },
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
        }
    }
}

/// Default gradient-norm tolerance.
pub const DEFAULT_TOL_GRAD: f64 = 1e-9;
/// Default absolute cost-change tolerance.
pub const DEFAULT_TOL_COST: f64 = 1e-14;
/// Default iteration cap; a bounded budget is always applied.
pub const DEFAULT_MAX_ITER: usize = 500;

/// Numerical tolerances and iteration limits used by the solver.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations; when `None` the
///   runner still applies [`DEFAULT_MAX_ITER`].
///
/// At least one of the three must be provided (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for bad tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `solve_least_squares`.
///
/// - `theta_hat`: best parameter vector found.
/// - `cost`: `½ Σ r_i(θ̂)²` at `theta_hat`.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of solver iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available gradient, if present.
///
/// An outcome only exists for converged runs; runs that hit the iteration
/// cap or never terminated are reported as [`OptError::NumericalFailure`].
#[derive(Debug, Clone, PartialEq)]
pub struct LsqOutcome {
    pub theta_hat: Theta,
    pub cost: f64,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl LsqOutcome {
    /// Build a validated [`LsqOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - [`OptError::NumericalFailure`] when the status is `NotTerminated` or
    ///   the iteration budget was exhausted.
    /// - Propagates validation errors for `theta_hat` or `cost`.
    pub fn new(
        theta_hat_opt: Option<Theta>, cost: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let iterations = iterations as usize;
        let status = match termination {
            TerminationStatus::NotTerminated
            | TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                return Err(OptError::NumericalFailure {
                    iterations,
                    status: format!("{termination:?}"),
                });
            }
            _ => format!("{termination:?}"),
        };
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(cost)?;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, cost, status, iterations, fn_evals, grad_norm })
    }
}
