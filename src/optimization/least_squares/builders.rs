//! least_squares::builders — L-BFGS solver construction helpers.
//!
//! Purpose
//! -------
//! Hide Argmin’s generic wiring behind two small builders that apply the
//! crate-level tolerances and memory size from [`LsqOptions`].
//!
//! Conventions
//! -----------
//! - Builders do **not** set an initial parameter vector or `max_iters`;
//!   those are runtime concerns applied by [`run_lbfgs`].
//! - Errors are always reported via [`OptResult`].
//!
//! [`run_lbfgs`]: crate::optimization::least_squares::run::run_lbfgs
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    least_squares::{
        traits::LsqOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// Construct L-BFGS with the Hager–Zhang line search.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when Argmin rejects a
///   tolerance.
pub fn build_optimizer_hager_zhang(opts: &LsqOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct L-BFGS with the More–Thuente line search.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when Argmin rejects a
///   tolerance.
pub fn build_optimizer_more_thuente(opts: &LsqOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply optional gradient and cost-change tolerances to an L-BFGS solver.
///
/// When a tolerance is `None` Argmin’s default stays in effect.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &LsqOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::least_squares::traits::{LineSearcher, Tolerances};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction of both L-BFGS variants with default and explicit
    //   memory.
    // - Tolerance application with and without values.
    //
    // They intentionally DO NOT cover:
    // - Executor behavior; see `run` and `api`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Both builders succeed with the default options.
    //
    // Given
    // -----
    // - `LsqOptions::default()`.
    //
    // Expect
    // ------
    // - Both builders return `Ok(_)`.
    fn builders_accept_default_options() {
        // Arrange
        let opts = LsqOptions::default();

        // Act / Assert
        assert!(build_optimizer_hager_zhang(&opts).is_ok(), "Hager–Zhang builder should succeed");
        assert!(build_optimizer_more_thuente(&opts).is_ok(), "More–Thuente builder should succeed");
    }

    #[test]
    // Purpose
    // -------
    // `configure_lbfgs` leaves Argmin defaults in place when no tolerances
    // are given.
    //
    // Given
    // -----
    // - Tolerances with only `max_iter` and an explicit memory of 11.
    //
    // Expect
    // ------
    // - `Ok(_)`.
    fn configure_lbfgs_respects_absent_tolerances() {
        // Arrange
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(50)).expect("Tolerances should be valid");
        let opts = LsqOptions::new(tols, LineSearcher::MoreThuente, Some(11))
            .expect("LsqOptions should be valid");

        // Act
        let configured = configure_lbfgs(raw, &opts);

        // Assert
        assert!(configured.is_ok(), "configure_lbfgs should succeed when both tolerances are None");
    }
}
