//! Offline calibration and score-distribution metrics.
//!
//! Nothing here runs on the inference path. These metrics are computed in
//! batch evaluation jobs: Brier score and expected calibration error track
//! how well predicted claim probabilities match observed claim frequencies,
//! and [`ScoreStats`] produces the population `(mu, sigma)` the pricing
//! config consumes.

mod brier;
mod ece;

pub use brier::*;
pub use ece::*;
