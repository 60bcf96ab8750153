//! Per-request feature attribution.

use std::sync::Arc;

use crate::errors::Result;
use crate::model::registry::ModelRegistry;
use crate::types::FeatureVector;

/// Ranks the features that most influenced a score.
///
/// Contributions come from the explainer artifact: for feature `i`,
/// `weights[i] * (x[i] - background_means[i])`, the feature's pull away
/// from the training-population baseline. The artifact loader guarantees
/// the explainer uses exactly the classifier's schema, so contributions and
/// margins line up slot for slot.
#[derive(Clone, Debug)]
pub struct AttributionExtractor {
    registry: Arc<ModelRegistry>,
}

impl AttributionExtractor {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Top `top_k` `(feature_name, contribution)` pairs, sorted by
    /// descending absolute contribution, ties broken by ascending feature
    /// name. Asking for more features than exist yields the full set.
    pub fn explain(
        &self,
        features: &FeatureVector,
        top_k: usize,
    ) -> Result<Vec<(String, f64)>> {
        let artifacts = self.registry.current()?;
        let explainer = &artifacts.explainer;

        let inputs = features.model_inputs();
        let mut contributions: Vec<(String, f64)> = explainer
            .feature_schema
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let contribution =
                    explainer.weights[i] * (inputs[i] - explainer.background_means[i]);
                (name.clone(), contribution)
            })
            .collect();

        contributions.sort_by(|a, b| {
            b.1.abs()
                .total_cmp(&a.1.abs())
                .then_with(|| a.0.cmp(&b.0))
        });
        contributions.truncate(top_k.min(contributions.len()));
        Ok(contributions)
    }
}
