//! Level assignment: maps a value to its class index given the breaks.
use serde::{Deserialize, Serialize};

use crate::breaks::Breaks;
use crate::observation::positive;

/// Class index of a feature. `0` means the value was missing, non-numeric or
/// non-positive; `1..=k` are the classes in ascending value order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Level(u8);

impl Level {
    pub const EXCLUDED: Level = Level(0);

    pub const fn new(level: u8) -> Self {
        Self(level)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_excluded(self) -> bool {
        self.0 == 0
    }

    /// Zero-based class index, `None` for [`Level::EXCLUDED`].
    pub fn class_index(self) -> Option<usize> {
        usize::from(self.0).checked_sub(1)
    }
}

impl From<Level> for u8 {
    fn from(l: Level) -> Self {
        l.0
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Level of a single value.
///
/// Breaks are scanned left to right and the first interval with
/// `breaks[i] <= v <= breaks[i+1]` wins, so a value sitting exactly on an
/// interior break belongs to the lower class. Values outside the breaks
/// (possible with caller-supplied breaks or floating point drift) are clamped
/// to the first or last class.
pub fn level_for(value: Option<f64>, breaks: Option<&Breaks>) -> Level {
    let (Some(v), Some(breaks)) = (value.and_then(positive), breaks) else {
        return Level::EXCLUDED;
    };
    let b = breaks.values();
    if v < b[0] {
        return Level(1);
    }
    let idx = b
        .windows(2)
        .position(|w| w[0] <= v && v <= w[1])
        .unwrap_or(breaks.class_count() - 1);
    Level((idx + 1) as u8)
}

/// Levels for every record, aligned with `records`.
///
/// `accessor` must be the same typed accessor that produced the
/// observations. Pure and idempotent: the same breaks always give the same
/// levels.
pub fn assign_levels<R, F>(records: &[R], accessor: F, breaks: Option<&Breaks>) -> Vec<Level>
where
    F: Fn(&R) -> Option<f64>,
{
    records.iter().map(|r| level_for(accessor(r), breaks)).collect()
}
