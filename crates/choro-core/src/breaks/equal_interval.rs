use super::Breaks;
use crate::params::MAX_CLASS_COUNT;

/// `class_count + 1` breaks splitting `[min, max]` into equal-width classes:
/// `min + (max − min) · i / k` for `i = 0..=k`.
///
/// The last break is pinned to `max` so rounding never drops the largest
/// observation out of the top class. Swapped bounds are reordered and the
/// class count is clamped to `1..=MAX_CLASS_COUNT`.
pub fn equal_interval_breaks(min: f64, max: f64, class_count: usize) -> Breaks {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    let k = class_count.clamp(1, MAX_CLASS_COUNT);
    let span = max - min;
    // Dividing before multiplying keeps every step finite near f64::MAX.
    let step = if span.is_finite() {
        span / k as f64
    } else {
        max / k as f64 - min / k as f64
    };
    let mut values: Vec<f64> = (0..=k).map(|i| min + step * i as f64).collect();
    values[k] = max;
    Breaks::from_raw(values)
}
