//! Fisher–Jenks optimal classification.
//!
//! Dynamic programme over the sorted observations. With `n` values and `k`
//! classes, `cost[i][c]` is the smallest total within-class sum of squared
//! deviations (SDCM) achievable when the first `i` values are split into `c`
//! contiguous classes, and `start[i][c]` is where the last of those classes
//! begins:
//!
//!   cost[i][1] = ssd(0, i)
//!   cost[i][c] = min over j in [c-1, i-1] of cost[j][c-1] + ssd(j, i)
//!
//! where `ssd(j, i)` is the sum of squared deviations of `sorted[j..i]`.
//! For each `i` the scan over `j` runs from `i − 1` downward, growing the
//! tail segment one value at a time, and only replaces on strict
//! improvement, so ties go to the largest split index. O(n²·k) time,
//! O(n·k) memory, tables are local.
//!
//! Values are first divided by a power of two close to the maximum. The
//! division is exact and keeps squares in range for observations of any
//! magnitude.

/// Sum of squared deviations of a segment, extended one value at a time
/// with Welford's update. Each step adds a non-negative term, so the result
/// cannot go negative through cancellation.
#[derive(Default)]
struct Segment {
    count: f64,
    mean: f64,
    ssd: f64,
}

impl Segment {
    #[inline]
    fn push(&mut self, x: f64) {
        self.count += 1.0;
        let delta = x - self.mean;
        self.mean += delta / self.count;
        // The updated mean lies between the old one and `x`, so the term is
        // non-negative; NaN input propagates and marks the segment infeasible.
        self.ssd += delta * (x - self.mean);
    }
}

/// Row-major `(n + 1) × (k + 1)` table.
struct Table<T> {
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Table<T> {
    fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self { cols, data: vec![fill; rows * cols] }
    }

    #[inline]
    fn get(&self, i: usize, c: usize) -> T {
        self.data[i * self.cols + c]
    }

    #[inline]
    fn set(&mut self, i: usize, c: usize, v: T) {
        self.data[i * self.cols + c] = v;
    }
}

/// Optimal `k + 1` breaks for ascending, positive, finite `sorted`.
///
/// Requires `sorted.len() > k >= 1`. Break `c` (for `0 < c < k`) is the
/// largest value of class `c`; the outer breaks are the min and max.
/// Returns `None` if no feasible partition was found (e.g. non-finite input).
pub(super) fn natural_breaks(sorted: &[f64], k: usize) -> Option<Vec<f64>> {
    let n = sorted.len();
    if k == 0 || n <= k {
        return None;
    }
    let max = sorted[n - 1];
    if !(max.is_finite() && max > 0.0) {
        return None;
    }
    let scale = 2f64.powi(max.log2().floor() as i32);
    let scaled: Vec<f64> = sorted.iter().map(|v| v / scale).collect();

    let mut cost = Table::new(n + 1, k + 1, f64::INFINITY);
    let mut start = Table::new(n + 1, k + 1, 0usize);

    for i in 1..=n {
        let mut tail = Segment::default();
        for j in (0..i).rev() {
            tail.push(scaled[j]);
            let ssd = tail.ssd;
            // Negative or NaN segment variance: infeasible.
            if !(ssd >= 0.0) {
                continue;
            }
            if j == 0 {
                cost.set(i, 1, ssd);
                continue;
            }
            for c in 2..=k.min(j + 1) {
                let head = cost.get(j, c - 1);
                if !head.is_finite() {
                    continue;
                }
                let total = head + ssd;
                if total < cost.get(i, c) {
                    cost.set(i, c, total);
                    start.set(i, c, j);
                }
            }
        }
    }

    if !cost.get(n, k).is_finite() {
        return None;
    }

    let mut breaks = vec![0.0; k + 1];
    breaks[0] = sorted[0];
    breaks[k] = sorted[n - 1];
    let mut end = n;
    for c in (2..=k).rev() {
        let s = start.get(end, c);
        if s == 0 || s >= end {
            return None;
        }
        breaks[c - 1] = sorted[s - 1];
        end = s;
    }
    Some(breaks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    fn ssd(values: &[f64]) -> f64 {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        values.iter().map(|v| (v - mean).powi(2)).sum()
    }

    /// Total SDCM of the partition implied by `breaks` on distinct values:
    /// class `c` holds everything above `breaks[c-1]` up to `breaks[c]`.
    fn partition_cost(sorted: &[f64], breaks: &[f64]) -> f64 {
        let k = breaks.len() - 1;
        let mut total = 0.0;
        let mut lo = 0;
        for c in 1..=k {
            let hi = if c == k {
                sorted.len()
            } else {
                lo + sorted[lo..].iter().take_while(|&&v| v <= breaks[c]).count()
            };
            if hi > lo {
                total += ssd(&sorted[lo..hi]);
            }
            lo = hi;
        }
        total
    }

    /// Exhaustive minimum SDCM over all contiguous k-partitions.
    fn brute_force_cost(sorted: &[f64], k: usize) -> f64 {
        fn go(sorted: &[f64], from: usize, classes_left: usize) -> f64 {
            let n = sorted.len();
            if classes_left == 1 {
                return ssd(&sorted[from..]);
            }
            let mut best = f64::INFINITY;
            for split in from + 1..=n - (classes_left - 1) {
                let c = ssd(&sorted[from..split]) + go(sorted, split, classes_left - 1);
                best = best.min(c);
            }
            best
        }
        go(sorted, 0, k)
    }

    #[test]
    fn known_clusters() {
        let sorted = [1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 50.0, 51.0, 52.0];
        assert_eq!(natural_breaks(&sorted, 3).unwrap(), vec![1.0, 3.0, 12.0, 52.0]);
    }

    #[test]
    fn single_class_is_min_max() {
        assert_eq!(natural_breaks(&[2.0, 4.0, 9.0], 1).unwrap(), vec![2.0, 9.0]);
    }

    #[test]
    fn too_few_values_is_infeasible() {
        assert!(natural_breaks(&[1.0, 2.0], 2).is_none());
        assert!(natural_breaks(&[1.0, 2.0, 3.0], 0).is_none());
    }

    #[test]
    fn ties_prefer_the_later_split() {
        // {1}, {2, 3} and {1, 2}, {3} both cost 0.5; the later split wins.
        assert_eq!(natural_breaks(&[1.0, 2.0, 3.0], 2).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn large_offset_values_stay_stable() {
        let base = 1.0e9;
        let sorted: Vec<f64> = [0.1, 0.2, 0.3, 5.1, 5.2, 5.3].iter().map(|d| base + d).collect();
        let b = natural_breaks(&sorted, 2).unwrap();
        assert_eq!(b, vec![sorted[0], sorted[2], sorted[5]]);
    }

    #[test]
    fn values_near_the_mean_stay_feasible() {
        // 8.5 sits almost on the mean; it must still be usable as a class of its own.
        let sorted = [1.5, 3.5, 4.0, 5.0, 5.5, 8.5, 10.5, 11.5, 15.0, 16.5, 18.5];
        let breaks = natural_breaks(&sorted, 8).unwrap();
        let got = partition_cost(&sorted, &breaks);
        let want = brute_force_cost(&sorted, 8);
        assert!((want - 0.75).abs() < 1e-12);
        assert!((got - want).abs() < 1e-9, "breaks {breaks:?} cost {got}, optimum {want}");
    }

    #[test]
    fn huge_magnitudes_are_still_optimised() {
        // At this spread the 1e160 values are noise next to 1e170, so the
        // split falls between 1e170 and 2e170.
        let sorted = [1e160, 2e160, 3e160, 1e170, 2e170, 3e170];
        assert_eq!(natural_breaks(&sorted, 2).unwrap(), vec![1e160, 1e170, 3e170]);

        let sorted = [1.0, 1e308, 1.5e308, 1.6e308, 1.7e308];
        let b = natural_breaks(&sorted, 3).unwrap();
        assert_eq!(b.len(), 4);
        assert!(b.iter().all(|v| v.is_finite()));
        assert_eq!((b[0], b[3]), (1.0, 1.7e308));
    }

    #[test]
    fn non_finite_input_is_infeasible() {
        assert!(natural_breaks(&[1.0, f64::NAN, 3.0], 2).is_none());
        assert!(natural_breaks(&[1.0, 2.0, f64::INFINITY], 2).is_none());
    }

    #[test]
    fn matches_exhaustive_search_on_random_sets() {
        let mut rng = StdRng::seed_from_u64(0x4a45_4e4b);
        let mut pool: Vec<u32> = (1..=40).collect();
        for _ in 0..200 {
            let n = rng.gen_range(3..=11);
            let k = rng.gen_range(1..n);
            pool.shuffle(&mut rng);
            let mut sorted: Vec<f64> = pool[..n].iter().map(|&v| f64::from(v) * 0.5).collect();
            sorted.sort_by(f64::total_cmp);

            let breaks = natural_breaks(&sorted, k).unwrap();
            let got = partition_cost(&sorted, &breaks);
            let want = brute_force_cost(&sorted, k);
            assert!(
                got <= want + 1e-9 * want.max(1.0),
                "k={k} data={sorted:?} breaks={breaks:?}: cost {got} > optimum {want}"
            );
        }
    }
}
