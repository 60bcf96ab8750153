//! Brier score for claim-probability predictions.
//!
//! The Brier score is a proper scoring rule: the mean squared error between
//! predicted probability and the binary outcome. 0.0 is perfect; a model
//! that always predicts the base rate scores `rate * (1 - rate)`, and any
//! useful model should beat that baseline.

use std::collections::VecDeque;

/// Batch Brier score over `(predicted probability, claim outcome)` pairs.
///
/// Returns 0.0 for an empty batch.
pub fn brier_score(pairs: &[(f64, bool)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let sum: f64 = pairs
        .iter()
        .map(|&(p, outcome)| {
            let p = p.clamp(0.0, 1.0);
            let y = if outcome { 1.0 } else { 0.0 };
            (p - y).powi(2)
        })
        .sum();
    sum / pairs.len() as f64
}

/// Baseline Brier score achieved by always predicting the base rate.
pub fn baseline_brier(base_rate: f64) -> f64 {
    let rate = base_rate.clamp(0.0, 1.0);
    rate * (1.0 - rate)
}

/// Rolling Brier tracker over the most recent predictions.
///
/// Keeps a sliding window of squared errors with a running sum, for
/// monitoring calibration drift as new labeled outcomes mature.
#[derive(Debug, Clone)]
pub struct BrierTracker {
    window_size: usize,
    scores: VecDeque<f64>,
    running_sum: f64,
}

impl BrierTracker {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            scores: VecDeque::with_capacity(window_size.min(10_000)),
            running_sum: 0.0,
        }
    }

    /// Record one matured prediction.
    pub fn update(&mut self, predicted: f64, claimed: bool) {
        let predicted = predicted.clamp(0.0, 1.0);
        let outcome = if claimed { 1.0 } else { 0.0 };
        let squared_error = (predicted - outcome).powi(2);

        if self.scores.len() >= self.window_size {
            if let Some(oldest) = self.scores.pop_front() {
                self.running_sum -= oldest;
            }
        }
        self.scores.push_back(squared_error);
        self.running_sum += squared_error;
    }

    /// Current windowed Brier score; 0.0 before any sample.
    pub fn score(&self) -> f64 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.running_sum / self.scores.len() as f64
        }
    }

    pub fn n_samples(&self) -> usize {
        self.scores.len()
    }

    pub fn is_reliable(&self, min_samples: usize) -> bool {
        self.scores.len() >= min_samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_zero() {
        let pairs = vec![(1.0, true), (0.0, false), (1.0, true)];
        assert_eq!(brier_score(&pairs), 0.0);
    }

    #[test]
    fn confidently_wrong_predictions_score_one() {
        let pairs = vec![(1.0, false), (0.0, true)];
        assert_eq!(brier_score(&pairs), 1.0);
    }

    #[test]
    fn uninformed_half_predictions_score_quarter() {
        let pairs = vec![(0.5, true), (0.5, false)];
        assert!((brier_score(&pairs) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn empty_batch_is_zero() {
        assert_eq!(brier_score(&[]), 0.0);
    }

    #[test]
    fn baseline_matches_rate_formula() {
        assert!((baseline_brier(0.3) - 0.21).abs() < 1e-12);
        assert_eq!(baseline_brier(0.0), 0.0);
    }

    #[test]
    fn tracker_evicts_beyond_window() {
        let mut tracker = BrierTracker::new(2);
        tracker.update(1.0, false); // error 1.0
        tracker.update(0.0, false); // error 0.0
        tracker.update(0.0, false); // evicts the 1.0 sample
        assert_eq!(tracker.n_samples(), 2);
        assert_eq!(tracker.score(), 0.0);
    }

    #[test]
    fn tracker_matches_batch_on_small_input() {
        let pairs = vec![(0.8, true), (0.3, false), (0.6, true)];
        let mut tracker = BrierTracker::new(100);
        for &(p, y) in &pairs {
            tracker.update(p, y);
        }
        assert!((tracker.score() - brier_score(&pairs)).abs() < 1e-12);
    }
}
