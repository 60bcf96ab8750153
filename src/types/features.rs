//! Point-in-time driver feature vectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Ordered schema of the features consumed by the risk model.
///
/// This is the single source of truth for feature ordering. Classifier and
/// explainer artifacts are validated against this list at load time, and all
/// downstream access goes through [`FeatureVector::model_inputs`] /
/// [`FeatureVector::get`] rather than ad hoc lookup.
///
/// `safety_rating` is deliberately absent: it is a derived display composite,
/// not a model input.
pub const MODEL_INPUT_FEATURES: [&str; 9] = [
    "miles_driven",
    "pct_night",
    "pct_urban",
    "speed_p50",
    "speed_p95",
    "harsh_brake_rate_per_100mi",
    "rapid_accel_rate_per_100mi",
    "pct_speeding",
    "stop_go_rate",
];

/// Accepted value ranges, enforced by [`FeatureVector::validate`].
///
/// Percent fields are in [0, 100]; per-100-mile rates are capped at 500 by
/// the aggregator's outlier clip, so anything above that indicates a bug
/// upstream, not a noisy driver.
const VALIDATION_RANGES: [(&str, f64, f64); 10] = [
    ("miles_driven", 0.0, 10_000.0),
    ("pct_night", 0.0, 100.0),
    ("pct_urban", 0.0, 100.0),
    ("speed_p50", 0.0, 150.0),
    ("speed_p95", 0.0, 150.0),
    ("harsh_brake_rate_per_100mi", 0.0, 500.0),
    ("rapid_accel_rate_per_100mi", 0.0, 500.0),
    ("pct_speeding", 0.0, 100.0),
    ("stop_go_rate", 0.0, 500.0),
    ("safety_rating", 0.0, 100.0),
];

/// Aggregated driver behavior over one trailing window.
///
/// One record per `(driver_id, as_of)`. All fields are deterministic
/// functions of the in-window events plus the externally configured safety
/// weights; rebuilding the same window always reproduces the same bits.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct FeatureVector {
    pub driver_id: String,
    /// End of the trailing window this vector was computed at.
    pub as_of: DateTime<Utc>,
    pub miles_driven: f64,
    pub pct_night: f64,
    pub pct_urban: f64,
    pub speed_p50: f64,
    pub speed_p95: f64,
    pub harsh_brake_rate_per_100mi: f64,
    pub rapid_accel_rate_per_100mi: f64,
    pub pct_speeding: f64,
    pub stop_go_rate: f64,
    /// Composite 0-100 rating, 100 = safest. See `features::safety`.
    pub safety_rating: f64,
}

impl FeatureVector {
    /// Model input values in [`MODEL_INPUT_FEATURES`] order.
    pub fn model_inputs(&self) -> [f64; 9] {
        [
            self.miles_driven,
            self.pct_night,
            self.pct_urban,
            self.speed_p50,
            self.speed_p95,
            self.harsh_brake_rate_per_100mi,
            self.rapid_accel_rate_per_100mi,
            self.pct_speeding,
            self.stop_go_rate,
        ]
    }

    /// Look up a field by schema name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "miles_driven" => Some(self.miles_driven),
            "pct_night" => Some(self.pct_night),
            "pct_urban" => Some(self.pct_urban),
            "speed_p50" => Some(self.speed_p50),
            "speed_p95" => Some(self.speed_p95),
            "harsh_brake_rate_per_100mi" => Some(self.harsh_brake_rate_per_100mi),
            "rapid_accel_rate_per_100mi" => Some(self.rapid_accel_rate_per_100mi),
            "pct_speeding" => Some(self.pct_speeding),
            "stop_go_rate" => Some(self.stop_go_rate),
            "safety_rating" => Some(self.safety_rating),
            _ => None,
        }
    }

    /// Enforce the documented value ranges.
    ///
    /// Violations indicate an aggregation bug or corrupted upstream data and
    /// are rejected rather than silently clipped.
    pub fn validate(&self) -> Result<()> {
        for (name, lo, hi) in VALIDATION_RANGES {
            // get() covers every name in the table
            let value = self.get(name).unwrap_or(f64::NAN);
            if !value.is_finite() || value < lo || value > hi {
                return Err(Error::InvalidInput(format!(
                    "feature {name}={value} outside expected range [{lo}, {hi}] \
                     for driver {}",
                    self.driver_id
                )));
            }
        }
        Ok(())
    }

    /// Field-wise mean over a set of vectors, e.g. as a caller-chosen
    /// fallback when a driver's own window is empty. Returns `None` for an
    /// empty input.
    pub fn population_average(
        vectors: &[FeatureVector],
        driver_id: &str,
        as_of: DateTime<Utc>,
    ) -> Option<FeatureVector> {
        if vectors.is_empty() {
            return None;
        }
        let n = vectors.len() as f64;
        let mean = |f: fn(&FeatureVector) -> f64| vectors.iter().map(f).sum::<f64>() / n;
        Some(FeatureVector {
            driver_id: driver_id.to_string(),
            as_of,
            miles_driven: mean(|v| v.miles_driven),
            pct_night: mean(|v| v.pct_night),
            pct_urban: mean(|v| v.pct_urban),
            speed_p50: mean(|v| v.speed_p50),
            speed_p95: mean(|v| v.speed_p95),
            harsh_brake_rate_per_100mi: mean(|v| v.harsh_brake_rate_per_100mi),
            rapid_accel_rate_per_100mi: mean(|v| v.rapid_accel_rate_per_100mi),
            pct_speeding: mean(|v| v.pct_speeding),
            stop_go_rate: mean(|v| v.stop_go_rate),
            safety_rating: mean(|v| v.safety_rating),
        })
    }
}
