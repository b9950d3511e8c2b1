//! Goodness of variance fit (GVF) for a set of breaks.
//!
//! GVF = 1 − SDCM / SDAM, where SDAM is the sum of squared deviations from
//! the array mean and SDCM the sum of squared deviations from each class
//! mean. Observations are assigned to classes with the same rule the map
//! uses for levels, so the score describes what is actually drawn.
use super::Breaks;
use crate::levels::level_for;
use crate::observation::positive;

/// GVF in `[0, 1]`; `1.0` when the observations have no spread.
pub fn goodness_of_variance_fit(observations: &[f64], breaks: &Breaks) -> f64 {
    let values: Vec<f64> = observations.iter().copied().filter_map(positive).collect();
    if values.is_empty() {
        return 1.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let sdam: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if sdam <= 0.0 {
        return 1.0;
    }

    let k = breaks.class_count();
    let mut sums = vec![0.0f64; k + 1];
    let mut counts = vec![0usize; k + 1];
    let levels: Vec<usize> = values
        .iter()
        .map(|&v| usize::from(level_for(Some(v), Some(breaks)).get()))
        .collect();
    for (&v, &l) in values.iter().zip(&levels) {
        sums[l] += v;
        counts[l] += 1;
    }
    let means: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
        .collect();
    let sdcm: f64 = values
        .iter()
        .zip(&levels)
        .map(|(&v, &l)| (v - means[l]).powi(2))
        .sum();

    (1.0 - sdcm / sdam).clamp(0.0, 1.0)
}
