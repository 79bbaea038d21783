//! peaks::errors — malformed-input errors for the peak engine.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias for everything in `peaks` and
//! `signal` that can be *rejected* rather than *diagnosed*. Fit-quality
//! problems never appear here: they are reported through
//! [`FailureMask`](crate::peaks::failure::FailureMask) on a successful
//! return.
//!
//! Key behaviors
//! -------------
//! - Define [`PeakError`] / [`PeakResult`] for mismatched lengths, empty or
//!   too-short inputs, non-finite samples, bad coordinates and invalid
//!   options.
//! - Wrap solver configuration errors (`OptError`) so option builders can
//!   use `?` across layers.
//! - Map every variant to `PyValueError` at the Python boundary.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of the violated constraint and embed the
//!   offending value.

use crate::optimization::errors::OptError;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type PeakResult<T> = Result<T, PeakError>;

/// PeakError — rejected calls into the peak engine.
///
/// Variants
/// --------
/// - `EmptyInput`: a sequence of length zero was supplied.
/// - `LengthMismatch`: coordinate and value sequences differ in length.
/// - `TooFewSamples`: fewer samples than the routine needs.
/// - `NonFiniteSample`: a coordinate or value is `NaN`/`±∞`.
/// - `NonIncreasingCoordinates`: the bin width `x[1] − x[0]` is not positive.
/// - `InvalidLagRange`: `lag_min > lag_max` or a bound is not finite.
/// - `InvalidWidthLimit`: `width_limit` is not finite and positive.
/// - `InvalidOption`: a numeric option violates its documented domain.
/// - `NoRefineStrategies`: refinement requested with an empty strategy list.
/// - `InvalidLookahead` / `InvalidDelta`: extrema detector parameters.
/// - `InvalidSampleRate`: streaming detector sample rate.
/// - `InvalidPolynomialOrder`: detrend order leaves too few samples.
/// - `SingularSystem`: a least-squares normal-equation solve failed.
/// - `Optimization`: solver configuration error.
#[derive(Debug, Clone, PartialEq)]
pub enum PeakError {
    EmptyInput,
    LengthMismatch { x_len: usize, y_len: usize },
    TooFewSamples { len: usize, min: usize },
    NonFiniteSample { index: usize, value: f64 },
    NonIncreasingCoordinates { bin_width: f64 },
    InvalidLagRange { lag_min: f64, lag_max: f64 },
    InvalidWidthLimit { value: f64 },
    InvalidOption { name: &'static str, value: f64, reason: &'static str },
    NoRefineStrategies,
    InvalidLookahead { lookahead: usize },
    InvalidDelta { delta: f64 },
    InvalidSampleRate { value: f64 },
    InvalidPolynomialOrder { order: usize, len: usize },
    SingularSystem,
    Optimization(OptError),
}

impl std::error::Error for PeakError {}

impl std::fmt::Display for PeakError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeakError::EmptyInput => write!(f, "Input sequence is empty"),
            PeakError::LengthMismatch { x_len, y_len } => {
                write!(f, "Coordinate and value lengths differ: {x_len} vs {y_len}")
            }
            PeakError::TooFewSamples { len, min } => {
                write!(f, "Too few samples: got {len}, need at least {min}")
            }
            PeakError::NonFiniteSample { index, value } => {
                write!(f, "Non-finite sample at index {index}: {value}")
            }
            PeakError::NonIncreasingCoordinates { bin_width } => {
                write!(f, "Coordinates must increase: bin width is {bin_width}")
            }
            PeakError::InvalidLagRange { lag_min, lag_max } => {
                write!(f, "Invalid lag range [{lag_min}, {lag_max}]: bounds must be finite and ordered")
            }
            PeakError::InvalidWidthLimit { value } => {
                write!(f, "Invalid width limit {value}: must be finite and > 0")
            }
            PeakError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid option {name} = {value}: {reason}")
            }
            PeakError::NoRefineStrategies => {
                write!(f, "Refinement requested but no refinement strategy configured")
            }
            PeakError::InvalidLookahead { lookahead } => {
                write!(f, "Invalid lookahead {lookahead}: must be at least 1")
            }
            PeakError::InvalidDelta { delta } => {
                write!(f, "Invalid delta {delta}: must be finite and non-negative")
            }
            PeakError::InvalidSampleRate { value } => {
                write!(f, "Invalid sample rate {value}: must be finite and > 0")
            }
            PeakError::InvalidPolynomialOrder { order, len } => {
                write!(f, "Polynomial order {order} needs more than {len} samples")
            }
            PeakError::SingularSystem => write!(f, "Least-squares system is singular"),
            PeakError::Optimization(err) => write!(f, "Solver configuration error: {err}"),
        }
    }
}

impl From<OptError> for PeakError {
    fn from(err: OptError) -> Self {
        PeakError::Optimization(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<PeakError> for PyErr {
    fn from(err: PeakError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
