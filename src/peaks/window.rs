//! peaks::window — search-range trimming and fit-window growth.
//!
//! Purpose
//! -------
//! Turn a seed index into the sub-window a fit is run over, plus an
//! initial width estimate. Every function here is pure: it reads the
//! samples and returns indices, so window sizing can be tested without
//! touching the fitting code.
//!
//! Key behaviors
//! -------------
//! - [`search_range`]: drop an edge buffer at both ends and, optionally,
//!   trim samples that fall monotonically into either boundary.
//! - [`forward_search_window`]: step outward from the seed while samples
//!   stay above `fraction · peak`, with a step budget derived from the
//!   width limit.
//! - [`gradient_window`]: step outward only while the derivative still
//!   points toward the peak and samples stay above the same threshold.
//!
//! Invariants & assumptions
//! ------------------------
//! - Windows are half-open, `[start, end)`, and never leave the search
//!   range.
//! - `support` counts the samples that passed the height criterion; a fit
//!   needs `support ≥ 3` ([`MIN_WINDOW_SUPPORT`]).
//! - The forward-search width inverts the Gaussian equal-height crossing
//!   and then divides by `√2`. That last factor is an empirical
//!   correction, kept exactly as calibrated.

use crate::peaks::extremum::argmax_by;

/// Smallest number of samples a fit window may hold.
pub const MIN_WINDOW_SUPPORT: usize = 3;

/// Inclusive sample range examined for the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRange {
    pub lower: usize,
    pub upper: usize,
}

impl SearchRange {
    /// Index of the largest sample in `[lower, upper)`, or `lower` when that
    /// range is empty.
    pub fn argmax(&self, y: &[f64]) -> usize {
        if self.upper <= self.lower {
            return self.lower;
        }
        argmax_by(y, self.lower, self.upper, |v| v)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.lower <= index && index <= self.upper
    }
}

/// Fit window and the width estimate derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakWindow {
    pub start: usize,
    pub end: usize,
    pub support: usize,
    pub width: f64,
}

impl PeakWindow {
    pub fn is_too_narrow(&self) -> bool {
        self.support < MIN_WINDOW_SUPPORT
    }
}

/// Compute the inclusive search range for `y`.
///
/// `floor(n · edge_buffer_fraction)` samples are dropped at each end; a
/// buffer of half the array or more collapses the range to one sample.
/// With `tweak_edges`, the lower bound then advances while the next sample
/// is smaller and the upper bound retreats while the previous sample is
/// smaller, so a seed never lands on a slope running into the boundary.
pub fn search_range(y: &[f64], edge_buffer_fraction: f64, tweak_edges: bool) -> SearchRange {
    let n = y.len();
    if n == 0 {
        return SearchRange { lower: 0, upper: 0 };
    }
    let buffer = (n as f64 * edge_buffer_fraction).floor() as usize;
    let mut lower = buffer.min(n - 1);
    let mut upper = n.saturating_sub(buffer + 1).max(lower);
    if tweak_edges {
        while lower + 1 < upper && y[lower + 1] < y[lower] {
            lower += 1;
        }
        while upper > lower + 1 && y[upper - 1] < y[upper] {
            upper -= 1;
        }
    }
    SearchRange { lower, upper }
}

/// Grow a window outward from `seed` by the fractional-height criterion.
///
/// Parameters
/// ----------
/// - `y`: samples (already sign-corrected if needed).
/// - `seed`: seed index inside `range`.
/// - `range`: inclusive bounds the walk may not cross.
/// - `fraction`: height fraction in `(0, 1)`.
/// - `max_steps`: step budget per side, `floor(width_limit / bin_width)`.
/// - `bin_width`: sample spacing.
///
/// Returns
/// -------
/// The window `[max(1, seed − j), min(seed + i + 1, range.upper))` where
/// `i`/`j` are the right/left step counts, `support = i + j + 1` and
/// `width = support · bin_width / (2 √(−ln fraction)) / √2`.
pub fn forward_search_window(
    y: &[f64], seed: usize, range: SearchRange, fraction: f64, max_steps: usize, bin_width: f64,
) -> PeakWindow {
    let threshold = fraction * y[seed];
    let passes = |k: usize| range.contains(k) && y[k] > threshold;

    let right = (0..max_steps).take_while(|&step| passes(seed + step)).count();
    let left = (0..max_steps)
        .take_while(|&step| step <= seed && passes(seed - step))
        .count();
    // Both counts include the seed itself.
    let support = (right + left).saturating_sub(1);
    let (i, j) = (right.saturating_sub(1), left.saturating_sub(1));

    PeakWindow {
        start: seed.saturating_sub(j).max(1),
        end: (seed + i + 1).min(range.upper),
        support,
        width: crossing_width(support, bin_width, fraction),
    }
}

/// Grow a window outward from `seed` while the slope still points at the
/// peak.
///
/// The right edge advances while the derivative is negative, the left edge
/// while it is positive; both stop at the first sample at or below
/// `fraction · y[seed]`, outside `range`, or on an array end.
pub fn gradient_window(
    y: &[f64], seed: usize, range: SearchRange, fraction: f64, bin_width: f64,
) -> PeakWindow {
    let n = y.len();
    let grad = gradient(y);
    let threshold = fraction * y[seed];
    let in_peak = |k: usize| k > 0 && k + 1 < n && range.contains(k) && y[k] > threshold;

    let mut end = seed;
    while end + 1 < n && grad[end + 1] < 0.0 && in_peak(end + 1) {
        end += 1;
    }
    let mut start = seed;
    while start > 0 && grad[start - 1] > 0.0 && in_peak(start - 1) {
        start -= 1;
    }
    let support = end - start + 1;
    PeakWindow { start, end: end + 1, support, width: crossing_width(support, bin_width, fraction) }
}

/// Half-width implied by `support` samples above `fraction` of the peak.
fn crossing_width(support: usize, bin_width: f64, fraction: f64) -> f64 {
    (support as f64 * bin_width / (2.0 * (-fraction.ln()).sqrt())) / std::f64::consts::SQRT_2
}

/// Sample-spaced derivative: central differences inside, one-sided at the
/// ends.
pub fn gradient(y: &[f64]) -> Vec<f64> {
    let n = y.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n)
            .map(|k| match k {
                0 => y[1] - y[0],
                k if k == n - 1 => y[n - 1] - y[n - 2],
                k => 0.5 * (y[k + 1] - y[k - 1]),
            })
            .collect(),
    }
}
