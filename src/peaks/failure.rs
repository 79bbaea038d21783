//! peaks::failure — symbolic failure-reason bitmask.
//!
//! Purpose
//! -------
//! Record every validity check that rejected a peak estimate. The mask is a
//! diagnostic carried on a successful return, never an error: an empty
//! mask means the estimate was accepted.
//!
//! Key behaviors
//! -------------
//! - Fixed 16-bit vocabulary with named constants; composition by `|`.
//! - `Display` renders the symbolic names (`"LAG|HIT_EDGE"`), `"NONE"` when
//!   empty.
//! - [`FailureMask::from_bits`] refuses bits outside the vocabulary so a raw
//!   integer never becomes a mask without its names.
//!
//! Invariants & assumptions
//! ------------------------
//! - Bit values are stable and shared by every estimator variant:
//!
//!   | bit  | constant          | meaning                                   |
//!   |------|-------------------|-------------------------------------------|
//!   | 0x01 | `AMP_LOW`         | amplitude outside the threshold band      |
//!   | 0x02 | `AMP_NEGATIVE`    | amplitude negative                        |
//!   | 0x04 | `SEARCH_WINDOW`   | search window too narrow                  |
//!   | 0x08 | `WIDTH`           | width exceeds limit                       |
//!   | 0x10 | `LAG`             | lag outside admissible range              |
//!   | 0x20 | `HIT_EDGE`        | seed touches the edge of the lag range    |
//!   | 0x40 | `FIT_FAIL`        | refinement failed or left the model domain|
//!   | 0x80 | `INIT_FAIL`       | pre-refinement screen failed              |

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of failure reasons attached to a peak estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FailureMask(u16);

impl FailureMask {
    pub const NONE: FailureMask = FailureMask(0);
    pub const AMP_LOW: FailureMask = FailureMask(0x01);
    pub const AMP_NEGATIVE: FailureMask = FailureMask(0x02);
    pub const SEARCH_WINDOW: FailureMask = FailureMask(0x04);
    pub const WIDTH: FailureMask = FailureMask(0x08);
    pub const LAG: FailureMask = FailureMask(0x10);
    pub const HIT_EDGE: FailureMask = FailureMask(0x20);
    pub const FIT_FAIL: FailureMask = FailureMask(0x40);
    pub const INIT_FAIL: FailureMask = FailureMask(0x80);

    const NAMED: [(FailureMask, &'static str); 8] = [
        (FailureMask::AMP_LOW, "AMP_LOW"),
        (FailureMask::AMP_NEGATIVE, "AMP_NEGATIVE"),
        (FailureMask::SEARCH_WINDOW, "SEARCH_WINDOW"),
        (FailureMask::WIDTH, "WIDTH"),
        (FailureMask::LAG, "LAG"),
        (FailureMask::HIT_EDGE, "HIT_EDGE"),
        (FailureMask::FIT_FAIL, "FIT_FAIL"),
        (FailureMask::INIT_FAIL, "INIT_FAIL"),
    ];

    const ALL_BITS: u16 = 0xFF;

    /// Raw bit pattern.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Rebuild a mask from raw bits; `None` if any bit is outside the
    /// vocabulary.
    pub const fn from_bits(bits: u16) -> Option<FailureMask> {
        if bits & !Self::ALL_BITS != 0 { None } else { Some(FailureMask(bits)) }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` when every bit of `other` is set in `self`.
    pub const fn contains(self, other: FailureMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: FailureMask) {
        self.0 |= other.0;
    }

    /// Symbolic names of the set bits, lowest bit first.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for FailureMask {
    type Output = FailureMask;

    fn bitor(self, rhs: FailureMask) -> FailureMask {
        FailureMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for FailureMask {
    fn bitor_assign(&mut self, rhs: FailureMask) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for FailureMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        write!(f, "{}", self.names().join("|"))
    }
}
