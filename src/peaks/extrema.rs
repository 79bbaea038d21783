//! peaks::extrema — look-ahead/hysteresis detector for local extrema.
//!
//! Purpose
//! -------
//! Find the alternating local maxima and minima of a noisy sequence,
//! independent of any peak model. A candidate is committed only when the
//! signal has moved `delta` away from it and nothing in the next
//! `lookahead` samples beats it.
//!
//! Key behaviors
//! -------------
//! - Both kinds are hunted until the first commit; afterwards the detector
//!   alternates strictly between hunting a minimum and hunting a maximum.
//! - Scanning stops `lookahead` samples before the end, so every committed
//!   extremum has a full look-ahead window behind it.
//! - The first committed extremum is discarded: it is produced by the
//!   cold-start candidates, not by the signal.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output lists are in increasing position order; committed kinds
//!   alternate along the merged timeline.
//! - Positions come from `coords` when given, otherwise the sample index.

use crate::peaks::{
    errors::{PeakError, PeakResult},
    validation::validate_values,
};

/// One committed extremum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub position: f64,
    pub value: f64,
}

/// Maxima and minima in increasing position order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeakList {
    pub maxima: Vec<Extremum>,
    pub minima: Vec<Extremum>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hunt {
    Either,
    Maximum,
    Minimum,
}

/// Detect local maxima and minima of `values`.
///
/// Parameters
/// ----------
/// - `values`: the signal, non-empty and finite.
/// - `coords`: optional positions, same length as `values`.
/// - `lookahead`: samples that must follow a candidate without beating it;
///   at least 1.
/// - `delta`: minimum excursion from a candidate before it is committed;
///   finite and non-negative.
///
/// Errors
/// ------
/// - `EmptyInput` / `NonFiniteSample` for bad values.
/// - `LengthMismatch` when `coords` and `values` differ in length.
/// - `InvalidLookahead` for `lookahead == 0`.
/// - `InvalidDelta` for a negative or non-finite `delta`.
pub fn detect_extrema(
    values: &[f64], coords: Option<&[f64]>, lookahead: usize, delta: f64,
) -> PeakResult<PeakList> {
    validate_values(values)?;
    if let Some(c) = coords {
        if c.len() != values.len() {
            return Err(PeakError::LengthMismatch { x_len: c.len(), y_len: values.len() });
        }
    }
    if lookahead < 1 {
        return Err(PeakError::InvalidLookahead { lookahead });
    }
    if !(delta.is_finite() && delta >= 0.0) {
        return Err(PeakError::InvalidDelta { delta });
    }

    let position = |i: usize| coords.map_or(i as f64, |c| c[i]);
    let mut list = PeakList::default();
    let mut first_was_max = None;
    let mut hunt = Hunt::Either;
    let mut max_cand: Option<usize> = None;
    let mut min_cand: Option<usize> = None;

    for index in 0..values.len().saturating_sub(lookahead) {
        let v = values[index];
        let ahead = &values[index..index + lookahead];
        if hunt != Hunt::Minimum && max_cand.map_or(true, |m| v > values[m]) {
            max_cand = Some(index);
        }
        if hunt != Hunt::Maximum && min_cand.map_or(true, |m| v < values[m]) {
            min_cand = Some(index);
        }

        if let Some(m) = max_cand.filter(|_| hunt != Hunt::Minimum) {
            let mx = values[m];
            if v < mx - delta && ahead.iter().all(|&a| a < mx) {
                list.maxima.push(Extremum { position: position(m), value: mx });
                first_was_max.get_or_insert(true);
                hunt = Hunt::Minimum;
                max_cand = None;
                min_cand = None;
                continue;
            }
        }
        if let Some(m) = min_cand.filter(|_| hunt != Hunt::Maximum) {
            let mn = values[m];
            if v > mn + delta && ahead.iter().all(|&a| a > mn) {
                list.minima.push(Extremum { position: position(m), value: mn });
                first_was_max.get_or_insert(false);
                hunt = Hunt::Maximum;
                min_cand = None;
                max_cand = None;
            }
        }
    }

    match first_was_max {
        Some(true) => {
            let dropped = list.maxima.remove(0);
            log::debug!("dropping cold-start maximum at {}", dropped.position);
        }
        Some(false) => {
            let dropped = list.minima.remove(0);
            log::debug!("dropping cold-start minimum at {}", dropped.position);
        }
        None => {}
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Alternating commits on a clean oscillation and removal of the
    //   cold-start artifact.
    // - Hysteresis: excursions smaller than `delta` commit nothing.
    // - Coordinates as positions and input validation.
    //
    // They intentionally DO NOT cover:
    // - Large noisy signals; see `tests/integration_peak_pipeline.rs`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // On a triangle wave the detector alternates and drops the first hit.
    //
    // Given
    // -----
    // - 0,1,2,3,2,1,0,1,2,3,2,1,0,1,2 with lookahead 2, delta 0.5.
    //
    // Expect
    // ------
    // - The leading minimum at index 0 is discarded.
    // - Maxima at 3 and 9, minimum at 6.
    fn triangle_wave_alternates_and_drops_first_hit() {
        // Arrange
        let y = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0];

        // Act
        let peaks = detect_extrema(&y, None, 2, 0.5).expect("valid input");

        // Assert
        let max_pos: Vec<f64> = peaks.maxima.iter().map(|e| e.position).collect();
        let min_pos: Vec<f64> = peaks.minima.iter().map(|e| e.position).collect();
        assert_eq!(max_pos, vec![3.0, 9.0]);
        assert_eq!(min_pos, vec![6.0]);
        assert_relative_eq!(peaks.maxima[0].value, 3.0);
    }

    #[test]
    // Purpose
    // -------
    // Wiggles smaller than `delta` never commit.
    //
    // Given
    // -----
    // - A 0.1-amplitude oscillation with delta 0.5.
    //
    // Expect
    // ------
    // - No maxima and no minima.
    fn small_wiggles_are_ignored() {
        // Arrange
        let y: Vec<f64> = (0..50).map(|i| 0.1 * (0.7 * i as f64).sin()).collect();

        // Act
        let peaks = detect_extrema(&y, None, 3, 0.5).expect("valid input");

        // Assert
        assert!(peaks.maxima.is_empty());
        assert!(peaks.minima.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Positions come from the coordinate axis when provided.
    //
    // Given
    // -----
    // - The triangle wave with coords 10 + 0.5·i.
    //
    // Expect
    // ------
    // - Maxima at 11.5 and 14.5.
    fn coordinates_map_positions() {
        // Arrange
        let y = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0];
        let x: Vec<f64> = (0..y.len()).map(|i| 10.0 + 0.5 * i as f64).collect();

        // Act
        let peaks = detect_extrema(&y, Some(x.as_slice()), 2, 0.5).expect("valid input");

        // Assert
        let max_pos: Vec<f64> = peaks.maxima.iter().map(|e| e.position).collect();
        assert_eq!(max_pos, vec![11.5, 14.5]);
    }

    #[test]
    // Purpose
    // -------
    // Malformed parameters are rejected up front.
    //
    // Given
    // -----
    // - lookahead 0, delta −1, a short coordinate axis, empty values.
    //
    // Expect
    // ------
    // - The matching `PeakError` variant for each.
    fn malformed_parameters_are_errors() {
        // Arrange
        let y = [0.0, 1.0, 0.0];

        // Assert
        assert_eq!(
            detect_extrema(&y, None, 0, 0.0),
            Err(PeakError::InvalidLookahead { lookahead: 0 })
        );
        assert_eq!(detect_extrema(&y, None, 1, -1.0), Err(PeakError::InvalidDelta { delta: -1.0 }));
        assert_eq!(
            detect_extrema(&y, Some(&[0.0, 1.0][..]), 1, 0.0),
            Err(PeakError::LengthMismatch { x_len: 2, y_len: 3 })
        );
        assert_eq!(detect_extrema(&[], None, 1, 0.0), Err(PeakError::EmptyInput));
    }
}
