//! peaks::extremum — edge-safe maximum search with an optional bipolar mode.
//!
//! Purpose
//! -------
//! Find the seed index of a peak: the largest sample that is not merely the
//! highest boundary sample. In bipolar mode the sample of largest magnitude
//! wins, and a [`PeakSign`] tells downstream code to flip the data so the
//! fit always sees a positive-going peak.
//!
//! Invariants & assumptions
//! ------------------------
//! - The last index of the examined range is never reported (the range is
//!   half-open); the first index is dropped when it holds the maximum.
//! - Ties resolve to the lowest index.
//! - A range that collapses to one sample returns that sample with
//!   [`PeakSign::Positive`].

use crate::peaks::errors::{PeakError, PeakResult};

/// Sign multiplier that turns the selected extremum into a maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakSign {
    #[default]
    Positive,
    Negative,
}

impl PeakSign {
    /// `+1.0` or `−1.0`.
    pub fn factor(self) -> f64 {
        match self {
            PeakSign::Positive => 1.0,
            PeakSign::Negative => -1.0,
        }
    }
}

/// Index of the maximum of `y` over the whole array, excluding the edges.
///
/// Errors
/// ------
/// - `EmptyInput` for an empty slice.
pub fn max_index_noedge(y: &[f64], bipolar: bool) -> PeakResult<(usize, PeakSign)> {
    if y.is_empty() {
        return Err(PeakError::EmptyInput);
    }
    Ok(max_index_noedge_within(y, 0, y.len() - 1, bipolar))
}

/// Edge-safe maximum over the half-open range `[lower, upper)`.
///
/// If the maximum sits on `lower`, that sample is excluded and the search
/// repeats on `[lower + 1, upper)`. When the range is empty the result is
/// `lower` (clamped to the array) with a positive sign.
pub fn max_index_noedge_within(
    y: &[f64], lower: usize, upper: usize, bipolar: bool,
) -> (usize, PeakSign) {
    let last = y.len().saturating_sub(1);
    let upper = upper.min(y.len());
    let mut lo = lower;
    loop {
        if upper <= lo {
            return (lo.min(last), PeakSign::Positive);
        }
        let (index, sign) = pick_extremum(y, lo, upper, bipolar);
        if index == lower && lo == lower {
            lo += 1;
            continue;
        }
        return (index, sign);
    }
}

fn pick_extremum(y: &[f64], lo: usize, hi: usize, bipolar: bool) -> (usize, PeakSign) {
    let max_index = argmax_by(y, lo, hi, |v| v);
    if bipolar {
        let abs_index = argmax_by(y, lo, hi, f64::abs);
        if y[abs_index].abs() > y[max_index].abs() {
            return (abs_index, PeakSign::Negative);
        }
    }
    (max_index, PeakSign::Positive)
}

/// First index in `[lo, hi)` maximizing `key(y[i])`; `hi > lo` required.
pub(crate) fn argmax_by(y: &[f64], lo: usize, hi: usize, key: impl Fn(f64) -> f64) -> usize {
    let mut best = lo;
    let mut best_val = key(y[lo]);
    for (i, &v) in y.iter().enumerate().take(hi).skip(lo + 1) {
        let k = key(v);
        if k > best_val {
            best = i;
            best_val = k;
        }
    }
    best
}
