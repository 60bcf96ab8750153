//! Expected calibration error and score population statistics.

use serde::{Deserialize, Serialize};

/// Expected calibration error over `n_bins` equal-width probability bins.
///
/// Each prediction falls into the bin `(lo, hi]` containing its probability;
/// per-bin gap is |mean predicted - observed claim frequency|, weighted by
/// the bin's share of the sample. 0.0 means predicted probabilities match
/// observed frequencies exactly.
pub fn expected_calibration_error(pairs: &[(f64, bool)], n_bins: usize) -> f64 {
    if pairs.is_empty() || n_bins == 0 {
        return 0.0;
    }
    let total = pairs.len() as f64;
    let mut ece = 0.0;
    for bin in 0..n_bins {
        let lo = bin as f64 / n_bins as f64;
        let hi = (bin + 1) as f64 / n_bins as f64;
        let in_bin: Vec<&(f64, bool)> = pairs
            .iter()
            .filter(|(p, _)| *p > lo && *p <= hi)
            .collect();
        if in_bin.is_empty() {
            continue;
        }
        let count = in_bin.len() as f64;
        let confidence = in_bin.iter().map(|(p, _)| p).sum::<f64>() / count;
        let frequency = in_bin.iter().filter(|(_, y)| *y).count() as f64 / count;
        ece += (confidence - frequency).abs() * (count / total);
    }
    ece
}

/// Population statistics of a score batch: the `(mu, sigma)` pair pricing
/// normalizes against.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct ScoreStats {
    pub mean: f64,
    /// Population standard deviation (no Bessel correction).
    pub std: f64,
    pub n: usize,
}

impl ScoreStats {
    /// Compute stats over a batch of scores. Returns `None` for an empty
    /// batch; pricing config must not be fed defaults silently.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std: variance.sqrt(),
            n: scores.len(),
        })
    }
}
