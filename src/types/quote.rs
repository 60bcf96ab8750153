//! Pricing and assessment outputs.

use serde::{Deserialize, Serialize};

/// Deterministic pricing output for one driver.
///
/// A pure function of `(score, base_premium, config)`; never persisted by
/// the pipeline itself.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PriceQuote {
    pub driver_id: String,
    pub score: f64,
    pub premium: f64,
    pub band: String,
    pub delta_from_base: f64,
}

/// Full inference-path output consumed by the serving boundary.
#[derive(Serialize, Clone, Debug)]
pub struct RiskAssessment {
    pub driver_id: String,
    pub score: f64,
    /// `(feature_name, contribution)` ranked by descending influence.
    pub top_features: Vec<(String, f64)>,
    pub premium: f64,
    pub band: String,
    pub delta: f64,
}
