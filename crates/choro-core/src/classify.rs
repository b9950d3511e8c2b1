//! One complete classification run: observations → breaks → levels.
use log::debug;
use serde::Serialize;

use crate::breaks::{compute_breaks_with, goodness_of_variance_fit, Breaks, BreaksMethod};
use crate::levels::{assign_levels, Level};
use crate::observation::{extract_observations, Summary};
use crate::params::ClassifyParams;

/// Immutable result handed to the renderer.
///
/// `levels[i]` is the level of the `i`-th input record. When there were no
/// positive observations, `breaks`, `method`, `summary` and
/// `goodness_of_fit` are all `None` and every level is 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    breaks: Option<Breaks>,
    method: Option<BreaksMethod>,
    levels: Vec<Level>,
    summary: Option<Summary>,
    goodness_of_fit: Option<f64>,
}

/// One row of a map legend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendEntry {
    pub level: Level,
    pub lower: f64,
    pub upper: f64,
    /// Number of records assigned to this level.
    pub count: usize,
}

impl ClassificationResult {
    pub fn breaks(&self) -> Option<&Breaks> {
        self.breaks.as_ref()
    }

    pub fn method(&self) -> Option<BreaksMethod> {
        self.method
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level of the record at `index`, `None` past the end.
    pub fn level_of(&self, index: usize) -> Option<Level> {
        self.levels.get(index).copied()
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// GVF of the breaks over the observations, see [`goodness_of_variance_fit`].
    pub fn goodness_of_fit(&self) -> Option<f64> {
        self.goodness_of_fit
    }

    /// `k`, or 0 when nothing could be classified.
    pub fn class_count(&self) -> usize {
        self.breaks.as_ref().map_or(0, Breaks::class_count)
    }

    /// True when no record had a positive value; consumers skip the legend.
    pub fn is_empty(&self) -> bool {
        self.breaks.is_none()
    }

    /// One entry per class `1..=k` with its value range and record count.
    pub fn legend(&self) -> Vec<LegendEntry> {
        let Some(breaks) = &self.breaks else {
            return Vec::new();
        };
        let k = breaks.class_count();
        let mut counts = vec![0usize; k + 1];
        for l in &self.levels {
            counts[usize::from(l.get())] += 1;
        }
        breaks
            .values()
            .windows(2)
            .enumerate()
            .map(|(i, w)| LegendEntry {
                level: Level::new((i + 1) as u8),
                lower: w[0],
                upper: w[1],
                count: counts[i + 1],
            })
            .collect()
    }
}

/// Classify `records` by the value `accessor` reads from each.
///
/// Never fails: bad parameters are clamped (validate them first with
/// [`ClassifyParams::validate`] to report them), an empty observation set
/// yields an all-zero result, and optimisation failures fall back to equal
/// intervals.
pub fn classify<R, F>(records: &[R], accessor: F, params: &ClassifyParams) -> ClassificationResult
where
    F: Fn(&R) -> Option<f64>,
{
    let observations = extract_observations(records, &accessor);
    let summary = Summary::from_observations(&observations);
    let computed = compute_breaks_with(&observations, params);

    let (breaks, method) = match computed {
        Some((b, m)) => (Some(b), Some(m)),
        None => (None, None),
    };
    let levels = assign_levels(records, &accessor, breaks.as_ref());
    let goodness_of_fit = breaks
        .as_ref()
        .map(|b| goodness_of_variance_fit(&observations, b));

    debug!(
        "classified {} records ({} observations) with {:?}",
        records.len(),
        observations.len(),
        method
    );

    ClassificationResult { breaks, method, levels, summary, goodness_of_fit }
}
