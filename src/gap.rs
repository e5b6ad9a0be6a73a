use serde::{Deserialize, Serialize};

/// Largest raw-sample spacing (ms) that may be bridged by interpolation.
///
/// The check is on the width of the bracketing pair, not on how close the
/// target sits to either neighbour: a target anywhere inside a bracket of
/// width `<= max` is interpolated, a target inside a wider bracket is missing.
/// Serialised as a plain integer where `0` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum GapTolerance {
    Unlimited,
    Max(u64),
}

impl GapTolerance {
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            GapTolerance::Unlimited
        } else {
            GapTolerance::Max(ms)
        }
    }

    pub fn as_millis(&self) -> u64 {
        match self {
            GapTolerance::Unlimited => 0,
            GapTolerance::Max(ms) => *ms,
        }
    }

    /// Whether the bracket `[before, after]` is dense enough to interpolate across.
    pub fn admits(&self, before: i64, after: i64) -> bool {
        match self {
            GapTolerance::Unlimited => true,
            GapTolerance::Max(max) => after.abs_diff(before) <= *max,
        }
    }
}

impl Default for GapTolerance {
    fn default() -> Self {
        GapTolerance::Max(500)
    }
}

impl From<u64> for GapTolerance {
    fn from(ms: u64) -> Self {
        GapTolerance::from_millis(ms)
    }
}

impl From<GapTolerance> for u64 {
    fn from(tolerance: GapTolerance) -> Self {
        tolerance.as_millis()
    }
}
