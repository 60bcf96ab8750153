//! Composite safety rating.

use std::collections::BTreeMap;

use crate::types::FeatureVector;

/// Normalization bound per rateable feature: the value at which the feature
/// is considered maximally risky. Fixed by policy; the per-feature weights
/// on top of these come from configuration.
///
/// Iterated in this fixed order so the rating is reproducible bit-for-bit
/// regardless of how the weight map was built.
pub const SAFETY_NORM_BOUNDS: [(&str, f64); 6] = [
    ("harsh_brake_rate_per_100mi", 10.0),
    ("rapid_accel_rate_per_100mi", 10.0),
    ("pct_speeding", 100.0),
    ("pct_night", 100.0),
    ("pct_urban", 100.0),
    ("stop_go_rate", 50.0),
];

/// Weighted composite rating in [0, 100], 100 = safest.
///
/// Each rateable feature is normalized into [0, 1] against its bound, the
/// configured weights form a weighted mean of the normalized risk, and the
/// rating is `100 * (1 - weighted_risk)`. Features absent from the weight
/// map contribute nothing.
pub fn safety_rating(vector: &FeatureVector, weights: &BTreeMap<String, f64>) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (name, bound) in SAFETY_NORM_BOUNDS {
        let Some(&weight) = weights.get(name) else {
            continue;
        };
        if weight <= 0.0 {
            continue;
        }
        // every name in the bounds table is a valid field
        let value = vector.get(name).unwrap_or(0.0);
        let normalized = (value / bound).clamp(0.0, 1.0);
        weighted += weight * normalized;
        total_weight += weight;
    }
    if total_weight <= 0.0 {
        return 100.0;
    }
    (100.0 * (1.0 - weighted / total_weight)).clamp(0.0, 100.0)
}
