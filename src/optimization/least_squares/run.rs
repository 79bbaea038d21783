//! Execution helper that runs an `argmin` solver on a residual model and
//! returns a crate-friendly [`LsqOutcome`].
use crate::optimization::{
    errors::OptResult,
    least_squares::{
        adapter::ArgMinAdapter,
        traits::{DEFAULT_MAX_ITER, LsqOptions, LsqOutcome, Residuals},
        types::{Grad, Theta},
    },
};
use argmin::core::{Executor, State};

/// Run an `argmin` optimization for a least-squares problem.
///
/// Wires the model via [`ArgMinAdapter`], the chosen solver, `theta0` and
/// the iteration cap (`opts.tols.max_iter`, or [`DEFAULT_MAX_ITER`] so a
/// run is always bounded), then converts the final state into
/// [`LsqOutcome`].
///
/// # Errors
/// - Propagates any `argmin` runtime error (line-search failures, model
///   errors raised inside the cost) via `From<argmin::core::Error>`.
/// - [`OptError::NumericalFailure`] if the cap was hit before convergence.
///
/// [`OptError::NumericalFailure`]: crate::optimization::errors::OptError::NumericalFailure
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &LsqOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<LsqOutcome>
where
    F: Residuals,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    let max_iter = opts.tols.max_iter.unwrap_or(DEFAULT_MAX_ITER);
    let optimizer = Executor::new(problem, solver)
        .configure(|state| state.param(theta0).max_iters(max_iter as u64));

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    LsqOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}
