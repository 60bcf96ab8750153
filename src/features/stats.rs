//! Small numeric helpers shared by the feature computations.

use crate::consts::{MILEAGE_EPSILON, RATE_CAP_PER_100MI};

/// Empirical percentile with linear interpolation between order statistics.
///
/// `sorted` must be ascending; `q` is the quantile in [0, 1]. An empty
/// sample maps to the sentinel `0.0` rather than an error.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let q = q.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

/// Guarded per-100-mile event rate.
///
/// Returns 0.0 when in-window mileage is below [`MILEAGE_EPSILON`] instead
/// of letting the division blow up, and clips the result at
/// [`RATE_CAP_PER_100MI`] to bound outlier windows. Applied uniformly to
/// every per-mile rate feature.
pub fn rate_per_100mi(count: usize, miles: f64) -> f64 {
    if miles < MILEAGE_EPSILON {
        return 0.0;
    }
    ((count as f64 / miles) * 100.0).min(RATE_CAP_PER_100MI)
}
