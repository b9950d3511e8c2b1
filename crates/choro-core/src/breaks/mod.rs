//! Class break computation.
//!
//! `k` classes are described by `k + 1` non-decreasing break values, from the
//! smallest observation to the largest. Three paths can produce them:
//!
//! * natural breaks: Fisher–Jenks optimal partition of the sorted data
//!   (see [`jenks`]),
//! * degenerate: at most `k` distinct values, which become the breaks
//!   directly, padded with the maximum,
//! * equal interval: `[min, max]` split into `k` equal widths. Used on
//!   request, above the size guard, or when the optimisation fails.
pub mod equal_interval;
mod jenks;
pub mod quality;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::levels::Level;
use crate::observation::positive;
use crate::params::{ClassifyParams, Method, MAX_CLASS_COUNT};

pub use equal_interval::equal_interval_breaks;
pub use quality::goodness_of_variance_fit;

// ── Breaks ────────────────────────────────────────────────────────────────────

/// Ordered class boundaries. Always holds at least two values and is
/// non-decreasing; class `l` (1-based) spans `values[l-1] ..= values[l]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Breaks(Vec<f64>);

impl Breaks {
    /// Wrap externally supplied breaks (e.g. a legend fixed by the caller).
    ///
    /// Returns `None` unless there are between 2 and `MAX_CLASS_COUNT + 1`
    /// finite values. Out-of-order values are clamped up to their predecessor.
    pub fn new(values: Vec<f64>) -> Option<Self> {
        let len_ok = (2..=MAX_CLASS_COUNT + 1).contains(&values.len());
        if !len_ok || values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self::from_raw(values))
    }

    /// Internal constructor: callers guarantee length and finiteness.
    pub(crate) fn from_raw(mut values: Vec<f64>) -> Self {
        debug_assert!(values.len() >= 2, "breaks need at least two values");
        debug_assert!(values.iter().all(|v| v.is_finite()), "non-finite break in {values:?}");
        enforce_non_decreasing(&mut values);
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of classes `k` (one less than the number of breaks).
    pub fn class_count(&self) -> usize {
        self.0.len() - 1
    }

    pub fn min(&self) -> f64 {
        self.0[0]
    }

    pub fn max(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// Inclusive value range of a class, `None` for level 0 or levels above `k`.
    pub fn class_range(&self, level: Level) -> Option<(f64, f64)> {
        let l = level.class_index()?;
        if l >= self.class_count() {
            return None;
        }
        Some((self.0[l], self.0[l + 1]))
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl TryFrom<Vec<f64>> for Breaks {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let len = values.len();
        Breaks::new(values).ok_or_else(|| {
            format!("breaks need 2..={} finite values, got {len}", MAX_CLASS_COUNT + 1)
        })
    }
}

impl From<Breaks> for Vec<f64> {
    fn from(b: Breaks) -> Self {
        b.0
    }
}

/// Which path produced a set of breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreaksMethod {
    NaturalBreaks,
    Degenerate,
    EqualInterval,
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Compute `class_count + 1` natural breaks for `observations`.
///
/// Values that are not finite and strictly positive are ignored. Returns
/// `None` when nothing is left. A `class_count` of 0 is treated as 1.
pub fn compute_breaks(observations: &[f64], class_count: usize) -> Option<Breaks> {
    compute_breaks_with(observations, &ClassifyParams::with_class_count(class_count))
        .map(|(breaks, _)| breaks)
}

/// Like [`compute_breaks`], honouring the method and size guard in `params`
/// and reporting the path that produced the result.
pub fn compute_breaks_with(
    observations: &[f64],
    params: &ClassifyParams,
) -> Option<(Breaks, BreaksMethod)> {
    let k = params.effective_class_count();

    let mut sorted: Vec<f64> = observations.iter().copied().filter_map(positive).collect();
    if sorted.is_empty() {
        debug!("no positive observations; nothing to classify");
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let (min, max) = (sorted[0], sorted[n - 1]);

    if params.method == Method::EqualInterval {
        return Some((equal_interval_breaks(min, max, k), BreaksMethod::EqualInterval));
    }

    let mut distinct = sorted.clone();
    distinct.dedup();
    if distinct.len() <= k {
        debug!("{} distinct values for {k} classes; using padded breaks", distinct.len());
        return Some((degenerate_breaks(distinct, k), BreaksMethod::Degenerate));
    }

    if n > params.max_optimal_observations {
        debug!(
            "{n} observations exceed the natural-breaks limit of {}; using equal intervals",
            params.max_optimal_observations
        );
        return Some((equal_interval_breaks(min, max, k), BreaksMethod::EqualInterval));
    }

    Some(natural_or_fallback(jenks::natural_breaks(&sorted, k), min, max, k))
}

/// Accept the optimiser's breaks, or fall back to equal intervals over
/// `[min, max]` when it found no feasible partition.
fn natural_or_fallback(
    optimised: Option<Vec<f64>>,
    min: f64,
    max: f64,
    k: usize,
) -> (Breaks, BreaksMethod) {
    match optimised {
        Some(values) => {
            debug!("natural breaks for {k} classes: {values:?}");
            (Breaks::from_raw(values), BreaksMethod::NaturalBreaks)
        }
        None => {
            warn!("natural-breaks optimisation failed; using equal intervals over [{min}, {max}]");
            (equal_interval_breaks(min, max, k), BreaksMethod::EqualInterval)
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Distinct sorted values padded with the maximum up to `k + 1` entries.
fn degenerate_breaks(mut distinct: Vec<f64>, k: usize) -> Breaks {
    let max = distinct[distinct.len() - 1];
    distinct.resize(k + 1, max);
    Breaks::from_raw(distinct)
}

fn enforce_non_decreasing(values: &mut [f64]) {
    for i in 1..values.len() {
        if values[i] < values[i - 1] {
            values[i] = values[i - 1];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_and_non_positive_input_yields_none() {
        assert!(compute_breaks(&[], 6).is_none());
        assert!(compute_breaks(&[0.0, -3.0, f64::NAN], 6).is_none());
    }

    #[test]
    fn identical_values_pad_to_class_count() {
        let (breaks, method) =
            compute_breaks_with(&[5.0, 5.0, 5.0], &ClassifyParams::with_class_count(6)).unwrap();
        assert_eq!(method, BreaksMethod::Degenerate);
        assert_eq!(breaks.values(), &[5.0; 7]);
    }

    #[test]
    fn few_distinct_values_become_breaks() {
        let breaks = compute_breaks(&[3.0, 1.0, 2.0, 2.0, 1.0], 4).unwrap();
        assert_eq!(breaks.values(), &[1.0, 2.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn three_clusters_split_cleanly() {
        let obs = [1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 50.0, 51.0, 52.0];
        let (breaks, method) =
            compute_breaks_with(&obs, &ClassifyParams::with_class_count(3)).unwrap();
        assert_eq!(method, BreaksMethod::NaturalBreaks);
        assert_eq!(breaks.values(), &[1.0, 3.0, 12.0, 52.0]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = compute_breaks(&[52.0, 1.0, 11.0, 3.0, 50.0, 12.0, 2.0, 51.0, 10.0], 3).unwrap();
        assert_eq!(a.values(), &[1.0, 3.0, 12.0, 52.0]);
    }

    #[test]
    fn size_guard_switches_to_equal_interval() {
        let obs: Vec<f64> = (1..=50).map(f64::from).collect();
        let params = ClassifyParams { max_optimal_observations: 10, ..ClassifyParams::with_class_count(4) };
        let (breaks, method) = compute_breaks_with(&obs, &params).unwrap();
        assert_eq!(method, BreaksMethod::EqualInterval);
        assert_relative_eq!(breaks.values()[1], 13.25);
        assert_eq!(breaks.max(), 50.0);
    }

    #[test]
    fn requested_equal_interval_is_honoured() {
        let params = ClassifyParams { method: Method::EqualInterval, ..ClassifyParams::with_class_count(3) };
        let (breaks, method) = compute_breaks_with(&[10.0, 20.0, 55.0, 100.0], &params).unwrap();
        assert_eq!(method, BreaksMethod::EqualInterval);
        assert_eq!(breaks.values(), &[10.0, 40.0, 70.0, 100.0]);
    }

    fn assert_break_invariants(breaks: &Breaks, k: usize, min: f64, max: f64) {
        let b = breaks.values();
        assert_eq!(b.len(), k + 1);
        assert!(b.iter().all(|v| v.is_finite()), "non-finite breaks {b:?}");
        assert!(b.windows(2).all(|w| w[0] <= w[1]), "unsorted breaks {b:?}");
        assert_eq!((b[0], b[k]), (min, max));
    }

    #[test]
    fn failed_optimisation_falls_back_to_equal_interval() {
        let (breaks, method) = natural_or_fallback(None, 10.0, 100.0, 3);
        assert_eq!(method, BreaksMethod::EqualInterval);
        assert_eq!(breaks.values(), &[10.0, 40.0, 70.0, 100.0]);

        let (breaks, method) = natural_or_fallback(None, 1.0, 1.7e308, 3);
        assert_eq!(method, BreaksMethod::EqualInterval);
        assert_break_invariants(&breaks, 3, 1.0, 1.7e308);
    }

    #[test]
    fn near_max_observations_keep_break_invariants() {
        let obs = [1.0, 1e308, 1.5e308, 1.6e308, 1.7e308];
        let (breaks, method) =
            compute_breaks_with(&obs, &ClassifyParams::with_class_count(3)).unwrap();
        assert_eq!(method, BreaksMethod::NaturalBreaks);
        assert_break_invariants(&breaks, 3, 1.0, 1.7e308);

        let params = ClassifyParams { method: Method::EqualInterval, ..ClassifyParams::with_class_count(3) };
        let (breaks, _) = compute_breaks_with(&obs, &params).unwrap();
        assert_break_invariants(&breaks, 3, 1.0, 1.7e308);
    }

    #[test]
    fn zero_class_count_behaves_as_one() {
        let breaks = compute_breaks(&[4.0, 9.0, 2.0], 0).unwrap();
        assert_eq!(breaks.values(), &[2.0, 9.0]);
    }

    #[test]
    fn external_breaks_are_validated_and_clamped() {
        assert!(Breaks::new(vec![1.0]).is_none());
        assert!(Breaks::new(vec![1.0, f64::NAN]).is_none());
        let b = Breaks::new(vec![1.0, 5.0, 3.0, 8.0]).unwrap();
        assert_eq!(b.values(), &[1.0, 5.0, 5.0, 8.0]);
        assert_eq!(b.class_count(), 3);
        assert_eq!(b.class_range(Level::new(2)), Some((5.0, 5.0)));
        assert_eq!(b.class_range(Level::EXCLUDED), None);
        assert_eq!(b.class_range(Level::new(4)), None);
    }

    #[test]
    fn breaks_deserialize_through_validation() {
        let b: Breaks = serde_json::from_str("[1.0, 2.5, 4.0]").unwrap();
        assert_eq!(b.class_count(), 2);
        assert!(serde_json::from_str::<Breaks>("[1.0]").is_err());
        assert_eq!(serde_json::to_string(&b).unwrap(), "[1.0,2.5,4.0]");
    }
}
