//! Calibrated probability scoring.

use std::sync::Arc;

use crate::errors::Result;
use crate::model::registry::ModelRegistry;
use crate::types::FeatureVector;

/// Applies the bound classifier to a feature vector.
///
/// Pure over the immutable artifact snapshot; safe for unsynchronized
/// concurrent use. Each call takes its own snapshot from the registry, so a
/// mid-flight reload never mixes artifacts within one request.
#[derive(Clone, Debug)]
pub struct RiskScorer {
    registry: Arc<ModelRegistry>,
}

impl RiskScorer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Score a feature vector.
    ///
    /// Returns `(probability, raw_margin)`: the calibrated claim
    /// probability in [0, 1] and the uncalibrated linear margin it was
    /// derived from. Fails with `ModelNotLoaded` before [`ModelRegistry::bind`].
    pub fn score(&self, features: &FeatureVector) -> Result<(f64, f64)> {
        let artifacts = self.registry.current()?;
        let classifier = &artifacts.classifier;

        let inputs = features.model_inputs();
        let margin: f64 = classifier.intercept
            + classifier
                .weights
                .iter()
                .zip(inputs.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>();

        let base_probability = sigmoid(margin);
        let probability = classifier.calibration.calibrate(base_probability).clamp(0.0, 1.0);
        Ok((probability, margin))
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::{demo_classifier, demo_explainer, ModelArtifacts};
    use crate::errors::Error;
    use chrono::{TimeZone, Utc};

    fn features() -> FeatureVector {
        FeatureVector {
            driver_id: "d1".to_string(),
            as_of: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            miles_driven: 500.0,
            pct_night: 5.0,
            pct_urban: 40.0,
            speed_p50: 38.0,
            speed_p95: 64.0,
            harsh_brake_rate_per_100mi: 0.4,
            rapid_accel_rate_per_100mi: 0.2,
            pct_speeding: 2.0,
            stop_go_rate: 3.0,
            safety_rating: 90.0,
        }
    }

    fn bound_scorer() -> RiskScorer {
        let registry = Arc::new(ModelRegistry::new());
        registry.bind(ModelArtifacts::from_parts(demo_classifier(), demo_explainer()).unwrap());
        RiskScorer::new(registry)
    }

    #[test]
    fn unbound_scorer_fails_with_model_not_loaded() {
        let scorer = RiskScorer::new(Arc::new(ModelRegistry::new()));
        assert_eq!(scorer.score(&features()).unwrap_err(), Error::ModelNotLoaded);
    }

    #[test]
    fn probability_is_in_unit_interval() {
        let (p, _) = bound_scorer().score(&features()).unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn margin_matches_hand_computed_linear_form() {
        let scorer = bound_scorer();
        let f = features();
        let (_, margin) = scorer.score(&f).unwrap();

        let c = demo_classifier();
        let expected: f64 = c.intercept
            + c.weights
                .iter()
                .zip(f.model_inputs().iter())
                .map(|(w, x)| w * x)
                .sum::<f64>();
        assert!((margin - expected).abs() < 1e-12);
    }

    #[test]
    fn scoring_is_deterministic() {
        let scorer = bound_scorer();
        let f = features();
        let first = scorer.score(&f).unwrap();
        for _ in 0..10 {
            let next = scorer.score(&f).unwrap();
            assert_eq!(first.0.to_bits(), next.0.to_bits());
            assert_eq!(first.1.to_bits(), next.1.to_bits());
        }
    }

    #[test]
    fn riskier_features_never_score_lower() {
        // Calibration is monotone and weights are non-negative, so raising
        // the harsh-brake rate must not reduce the probability.
        let scorer = bound_scorer();
        let mut f = features();
        let (p_low, _) = scorer.score(&f).unwrap();
        f.harsh_brake_rate_per_100mi = 8.0;
        let (p_high, _) = scorer.score(&f).unwrap();
        assert!(p_high >= p_low);
    }
}
