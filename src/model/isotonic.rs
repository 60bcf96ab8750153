//! Piecewise-constant isotonic calibration map.
//!
//! The training side calibrates the base classifier with isotonic
//! regression; the serialized artifact carries the fitted step function as
//! `(breakpoints, values)` pairs. Monotonicity is guaranteed by
//! construction: higher base probabilities always map to equal or higher
//! calibrated probabilities.

use serde::{Deserialize, Serialize};

use crate::errors::ArtifactError;

/// Monotone step function from base-model probability to calibrated
/// probability.
///
/// `values[i]` is the output for inputs in `[breakpoints[i],
/// breakpoints[i+1])`; inputs below the first breakpoint return `values[0]`,
/// inputs at or above the last return the last value. Lookup is a binary
/// search, O(log n) per score.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct IsotonicCalibration {
    /// Raw probability thresholds, sorted ascending.
    pub breakpoints: Vec<f64>,
    /// Calibrated probability per interval, non-decreasing, in [0, 1].
    pub values: Vec<f64>,
}

impl IsotonicCalibration {
    /// Validate the invariants a well-formed artifact must satisfy.
    ///
    /// Called once at artifact load; the hot scoring path assumes them.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.breakpoints.is_empty() {
            return Err(ArtifactError::InvalidCalibration(
                "at least one breakpoint required".to_string(),
            ));
        }
        if self.breakpoints.len() != self.values.len() {
            return Err(ArtifactError::InvalidCalibration(format!(
                "{} breakpoints vs {} values",
                self.breakpoints.len(),
                self.values.len()
            )));
        }
        for pair in self.breakpoints.windows(2) {
            if !(pair[0] <= pair[1]) {
                return Err(ArtifactError::InvalidCalibration(format!(
                    "breakpoints not sorted: {} > {}",
                    pair[0], pair[1]
                )));
            }
        }
        for (i, &v) in self.values.iter().enumerate() {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ArtifactError::InvalidCalibration(format!(
                    "values[{i}] = {v} outside [0, 1]"
                )));
            }
            if i > 0 && v < self.values[i - 1] {
                return Err(ArtifactError::InvalidCalibration(format!(
                    "values not monotone at index {i}"
                )));
            }
        }
        Ok(())
    }

    /// Map a base probability to its calibrated probability.
    pub fn calibrate(&self, raw: f64) -> f64 {
        if !raw.is_finite() {
            return 0.0;
        }
        match self.breakpoints.binary_search_by(|bp| bp.total_cmp(&raw)) {
            Ok(idx) => self.values[idx],
            Err(0) => self.values[0],
            Err(idx) if idx >= self.breakpoints.len() => {
                *self.values.last().unwrap_or(&0.0)
            }
            Err(idx) => self.values[idx - 1],
        }
    }

    /// Fit a step function from `(raw probability, outcome)` pairs with the
    /// pool-adjacent-violators algorithm.
    ///
    /// Used by the report binary and tests to fabricate self-consistent demo
    /// artifacts; the production artifact comes from the external training
    /// pipeline. Returns `None` for an empty input.
    pub fn fit(samples: &[(f64, bool)]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut pairs: Vec<(f64, f64)> = samples
            .iter()
            .map(|&(raw, outcome)| (raw, if outcome { 1.0 } else { 0.0 }))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Each block: (label sum, count, representative raw score).
        let mut blocks: Vec<(f64, usize, f64)> =
            pairs.iter().map(|&(raw, label)| (label, 1, raw)).collect();

        let mut i = 0;
        while i + 1 < blocks.len() {
            let mean_i = blocks[i].0 / blocks[i].1 as f64;
            let mean_next = blocks[i + 1].0 / blocks[i + 1].1 as f64;
            if mean_i > mean_next {
                blocks[i].0 += blocks[i + 1].0;
                blocks[i].1 += blocks[i + 1].1;
                blocks[i].2 = (blocks[i].2 + blocks[i + 1].2) / 2.0;
                blocks.remove(i + 1);
                i = i.saturating_sub(1);
            } else {
                i += 1;
            }
        }

        Some(Self {
            breakpoints: blocks.iter().map(|b| b.2).collect(),
            values: blocks
                .iter()
                .map(|b| (b.0 / b.1 as f64).clamp(0.0, 1.0))
                .collect(),
        })
    }
}
