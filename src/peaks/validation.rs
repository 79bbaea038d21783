//! peaks::validation — shared input guards for the peak engine.
//!
//! Purpose
//! -------
//! Centralize the malformed-input checks so every public entrypoint rejects
//! bad sequences the same way, before any search or fit runs.
//!
//! Invariants & assumptions
//! ------------------------
//! - A correlation function has `len(x) == len(y) ≥ 3`, finite samples and
//!   a positive bin width `x[1] − x[0]`.
//! - Plain value sequences (extrema detector, streaming detector) must be
//!   non-empty and finite.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each error branch and a success path.

use crate::peaks::errors::{PeakError, PeakResult};

/// Minimum number of samples a correlation function must carry.
pub const MIN_CORRELATION_LEN: usize = 3;

/// Validate a paired coordinate/value sequence and return its bin width.
///
/// Errors
/// ------
/// - `EmptyInput` when either sequence is empty.
/// - `LengthMismatch` when the lengths differ.
/// - `TooFewSamples` below [`MIN_CORRELATION_LEN`].
/// - `NonFiniteSample` for the first `NaN`/`±∞` (coordinates checked first).
/// - `NonIncreasingCoordinates` when `x[1] − x[0] ≤ 0`.
pub fn validate_correlation(x: &[f64], y: &[f64]) -> PeakResult<f64> {
    if x.is_empty() || y.is_empty() {
        return Err(PeakError::EmptyInput);
    }
    if x.len() != y.len() {
        return Err(PeakError::LengthMismatch { x_len: x.len(), y_len: y.len() });
    }
    if x.len() < MIN_CORRELATION_LEN {
        return Err(PeakError::TooFewSamples { len: x.len(), min: MIN_CORRELATION_LEN });
    }
    validate_finite(x)?;
    validate_finite(y)?;
    let bin_width = x[1] - x[0];
    if bin_width <= 0.0 {
        return Err(PeakError::NonIncreasingCoordinates { bin_width });
    }
    Ok(bin_width)
}

/// Validate that a sequence is non-empty and entirely finite.
pub fn validate_values(values: &[f64]) -> PeakResult<()> {
    if values.is_empty() {
        return Err(PeakError::EmptyInput);
    }
    validate_finite(values)
}

fn validate_finite(values: &[f64]) -> PeakResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(PeakError::NonFiniteSample { index, value: values[index] }),
        None => Ok(()),
    }
}

/// Validate that `value` lies in `[lo, hi)` and is finite.
pub fn validate_unit_interval(
    name: &'static str, value: f64, lo: f64, hi: f64, reason: &'static str,
) -> PeakResult<()> {
    if !value.is_finite() || value < lo || value >= hi {
        return Err(PeakError::InvalidOption { name, value, reason });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Every rejection branch of `validate_correlation`.
    // - The returned bin width on valid input.
    //
    // They intentionally DO NOT cover:
    // - Option validation; see `options`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Each malformed shape maps to its own error.
    //
    // Given
    // -----
    // - empty, mismatched, too short, NaN, and decreasing inputs.
    //
    // Expect
    // ------
    // - The matching `PeakError` variant for each.
    fn validate_correlation_rejects_malformed_input() {
        // Assert
        assert_eq!(validate_correlation(&[], &[]), Err(PeakError::EmptyInput));
        assert_eq!(
            validate_correlation(&[0.0, 1.0, 2.0], &[0.0, 1.0]),
            Err(PeakError::LengthMismatch { x_len: 3, y_len: 2 })
        );
        assert_eq!(
            validate_correlation(&[0.0, 1.0], &[0.0, 1.0]),
            Err(PeakError::TooFewSamples { len: 2, min: 3 })
        );
        assert!(matches!(
            validate_correlation(&[0.0, 1.0, 2.0], &[0.0, f64::NAN, 1.0]),
            Err(PeakError::NonFiniteSample { index: 1, .. })
        ));
        assert_eq!(
            validate_correlation(&[2.0, 1.0, 0.0], &[0.0, 1.0, 0.0]),
            Err(PeakError::NonIncreasingCoordinates { bin_width: -1.0 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Valid input yields the bin width.
    //
    // Given
    // -----
    // - x = (−0.5, 0.0, 0.5, 1.0).
    //
    // Expect
    // ------
    // - `Ok(0.5)`.
    fn validate_correlation_returns_bin_width() {
        // Act
        let bw = validate_correlation(&[-0.5, 0.0, 0.5, 1.0], &[0.1, 0.9, 0.2, 0.0]);

        // Assert
        assert_eq!(bw, Ok(0.5));
    }
}
