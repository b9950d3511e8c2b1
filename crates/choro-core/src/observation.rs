//! Observation extraction.
//!
//! Turns loosely typed attribute values into the positive, finite
//! observations the break computation works on. Anything that does not
//! survive coercion is simply excluded; those records end up at level 0.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coerce a JSON attribute value to a number.
///
/// Numbers pass through, strings are parsed after trimming (`"12"`,
/// `" 3.5e2 "`). `null`, booleans, arrays and objects are not numbers.
pub fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Keep only finite values strictly greater than zero.
#[inline]
pub fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Collect the observation set from `records`.
///
/// `accessor` is the single place where the record schema is known; it
/// returns `None` for a missing or non-numeric attribute. Duplicates are
/// retained and input order is preserved.
pub fn extract_observations<R, F>(records: &[R], accessor: F) -> Vec<f64>
where
    F: Fn(&R) -> Option<f64>,
{
    records
        .iter()
        .filter_map(|r| accessor(r).and_then(positive))
        .collect()
}

/// Range and size of an observation set, for legends and colour domains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub positive_count: usize,
}

impl Summary {
    /// `None` when no value in `observations` is positive and finite.
    pub fn from_observations(observations: &[f64]) -> Option<Self> {
        let mut iter = observations.iter().copied().filter_map(positive);
        let first = iter.next()?;
        let (min, max, count) = iter.fold((first, first, 1usize), |(lo, hi, n), v| {
            (lo.min(v), hi.max(v), n + 1)
        });
        Some(Self { min, max, positive_count: count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_value(&json!(12)), Some(12.0));
        assert_eq!(coerce_value(&json!(0.25)), Some(0.25));
        assert_eq!(coerce_value(&json!(" 3.5e2 ")), Some(350.0));
        assert_eq!(coerce_value(&json!("-4")), Some(-4.0));
    }

    #[test]
    fn coerce_rejects_everything_else() {
        assert_eq!(coerce_value(&json!(null)), None);
        assert_eq!(coerce_value(&json!("n/a")), None);
        assert_eq!(coerce_value(&json!("")), None);
        assert_eq!(coerce_value(&json!(true)), None);
        assert_eq!(coerce_value(&json!([1, 2])), None);
        assert_eq!(coerce_value(&json!({"v": 1})), None);
    }

    #[test]
    fn extraction_drops_non_positive_and_non_finite() {
        let records: Vec<Option<f64>> = vec![
            Some(3.0),
            None,
            Some(0.0),
            Some(-1.0),
            Some(f64::NAN),
            Some(f64::INFINITY),
            Some(3.0),
            Some(7.5),
        ];
        let obs = extract_observations(&records, |r| *r);
        assert_eq!(obs, vec![3.0, 3.0, 7.5]);
    }

    #[test]
    fn summary_over_positive_values() {
        let s = Summary::from_observations(&[4.0, 1.5, 9.0, 4.0]).unwrap();
        assert_eq!(s.min, 1.5);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.positive_count, 4);

        assert!(Summary::from_observations(&[]).is_none());
        assert!(Summary::from_observations(&[0.0, -2.0]).is_none());
    }
}
