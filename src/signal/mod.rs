//! signal — collaborator fits built on the least-squares primitive.
//!
//! Purpose
//! -------
//! Host the small model fits that sit around the peak engine in a delay
//! estimation pipeline: onset-response fits and polynomial detrending.
//! None of them touch the validity machinery in [`crate::peaks`]; they share
//! only the solver stack and the `PeakError` surface for malformed input.
//!
//! Key behaviors
//! -------------
//! - [`onset`]: rise-time and trapezoid fits screened by [`OnsetBounds`].
//! - [`detrend`]: dense polynomial fits ([`polyfit`], [`polyval`]) and
//!   trend removal ([`detrend()`](detrend::detrend)).
//!
//! Downstream usage
//! ----------------
//! - `peaks::quadratic` reuses [`polyfit`] for the parabolic vertex fit.
//!
//! Testing notes
//! -------------
//! - Each submodule carries its own recovery and error-path tests.

pub mod detrend;
pub mod onset;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::detrend::{detrend, polyfit, polyval};
pub use self::onset::{
    OnsetBounds, OnsetFit, RiseTimeParams, TrapezoidParams, fit_risetime, fit_trapezoid,
    risetime_eval, trapezoid_eval,
};

pub mod prelude {
    pub use super::detrend::{detrend, polyfit, polyval};
    pub use super::onset::{
        OnsetBounds, OnsetFit, RiseTimeParams, TrapezoidParams, fit_risetime, fit_trapezoid,
    };
}
