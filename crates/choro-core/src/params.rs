use serde::{Deserialize, Serialize};

use crate::error::{ChoroError, Result};

/// Number of classes used by the hex/grid map when nothing else is configured.
pub const DEFAULT_CLASS_COUNT: usize = 6;

/// Largest class count representable by [`crate::levels::Level`].
pub const MAX_CLASS_COUNT: usize = u8::MAX as usize;

/// Above this many observations the O(n²·k) optimisation is skipped and
/// equal-interval breaks are returned instead.
pub const DEFAULT_MAX_OPTIMAL_OBSERVATIONS: usize = 4_000;

/// Requested classification scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Fisher–Jenks variance-minimising classes.
    #[default]
    NaturalBreaks,
    /// `k` classes of equal width over `[min, max]`.
    EqualInterval,
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural-breaks" | "natural_breaks" | "jenks" => Ok(Method::NaturalBreaks),
            "equal-interval" | "equal_interval" | "equal" => Ok(Method::EqualInterval),
            other => Err(format!("unknown classification method '{other}'")),
        }
    }
}

/// Parameters for one classification run.
/// Missing fields in serialised form fall back to [`ClassifyParams::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyParams {
    /// Number of classes `k`; levels run `0..=k`.
    pub class_count: usize,
    pub method: Method,
    /// Size guard for the natural-breaks optimisation.
    pub max_optimal_observations: usize,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            class_count: DEFAULT_CLASS_COUNT,
            method: Method::NaturalBreaks,
            max_optimal_observations: DEFAULT_MAX_OPTIMAL_OBSERVATIONS,
        }
    }
}

impl ClassifyParams {
    pub fn with_class_count(class_count: usize) -> Self {
        Self { class_count, ..Self::default() }
    }

    /// Reject class counts that cannot be expressed as levels.
    pub fn validate(&self) -> Result<()> {
        if self.class_count == 0 || self.class_count > MAX_CLASS_COUNT {
            return Err(ChoroError::InvalidClassCount {
                got: self.class_count,
                max: MAX_CLASS_COUNT,
            });
        }
        Ok(())
    }

    /// Class count clamped into the representable range.
    /// Engine entry points use this so they never fail on bad parameters.
    pub(crate) fn effective_class_count(&self) -> usize {
        self.class_count.clamp(1, MAX_CLASS_COUNT)
    }
}
