//! End-to-end inference pipeline.
//!
//! Wires the event store, feature aggregator, scorer, attribution extractor
//! and pricing engine behind one façade. The serving boundary calls
//! [`RiskPipeline::assess`]; batch/offline jobs use the component accessors
//! directly. Every method takes an explicit `as_of`; the pipeline never
//! reads the wall clock.


use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::RiskConfig;
use crate::errors::Result;
use crate::features::FeatureAggregator;
use crate::labels::LabelBuilder;
use crate::model::{AttributionExtractor, ModelArtifacts, ModelRegistry, RiskScorer};
use crate::pricing;
use crate::store::EventStore;
use crate::types::{FeatureVector, PriceQuote, RiskAssessment};

/// A scored feature window.
#[derive(Clone, Debug)]
pub struct DriverScore {
    pub features: FeatureVector,
    /// Calibrated claim probability in [0, 1].
    pub probability: f64,
    /// Uncalibrated linear margin behind the probability.
    pub raw_margin: f64,
}

/// The assembled inference path.
///
/// Cheap to share: all components are read-only over `Arc`-shared artifacts
/// and the immutable config, so one pipeline instance serves any number of
/// concurrent callers.
pub struct RiskPipeline<S: EventStore> {
    store: S,
    aggregator: FeatureAggregator,
    label_builder: LabelBuilder,
    registry: Arc<ModelRegistry>,
    scorer: RiskScorer,
    explainer: AttributionExtractor,
    config: RiskConfig,
}

impl<S: EventStore> RiskPipeline<S> {
    /// Assemble a pipeline with an unbound model registry. Scoring fails
    /// with `ModelNotLoaded` until [`bind_artifacts`](Self::bind_artifacts).
    pub fn new(store: S, config: RiskConfig) -> Self {
        let registry = Arc::new(ModelRegistry::new());
        Self {
            store,
            aggregator: FeatureAggregator::new(config.safety_weights.clone()),
            label_builder: LabelBuilder::new(config.claim_harsh_brake_min),
            scorer: RiskScorer::new(Arc::clone(&registry)),
            explainer: AttributionExtractor::new(Arc::clone(&registry)),
            registry,
            config,
        }
    }

    /// Bind or atomically replace the model artifacts.
    pub fn bind_artifacts(&self, artifacts: ModelArtifacts) {
        self.registry.bind(artifacts);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn aggregator(&self) -> &FeatureAggregator {
        &self.aggregator
    }

    pub fn label_builder(&self) -> &LabelBuilder {
        &self.label_builder
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Aggregate and range-validate one driver's feature window.
    pub fn features(&self, driver_id: &str, as_of: DateTime<Utc>) -> Result<FeatureVector> {
        let features = self.aggregator.aggregate(&self.store, driver_id, as_of)?;
        features.validate()?;
        Ok(features)
    }

    /// Aggregate and score one driver.
    pub fn score(&self, driver_id: &str, as_of: DateTime<Utc>) -> Result<DriverScore> {
        let features = self.features(driver_id, as_of)?;
        let (probability, raw_margin) = self.scorer.score(&features)?;
        Ok(DriverScore {
            features,
            probability,
            raw_margin,
        })
    }

    /// Price a driver off a fresh score.
    pub fn quote(
        &self,
        driver_id: &str,
        as_of: DateTime<Utc>,
        base_premium: f64,
    ) -> Result<PriceQuote> {
        let scored = self.score(driver_id, as_of)?;
        pricing::price(driver_id, scored.probability, base_premium, &self.config.pricing)
    }

    /// Full inference-path output: score, ranked attributions, premium.
    ///
    /// Fails whole: any component error propagates and no partially
    /// computed assessment is ever returned.
    pub fn assess(
        &self,
        driver_id: &str,
        as_of: DateTime<Utc>,
        base_premium: f64,
        top_k: usize,
    ) -> Result<RiskAssessment> {
        let scored = self.score(driver_id, as_of)?;
        let top_features = self.explainer.explain(&scored.features, top_k)?;
        let quote = pricing::price(
            driver_id,
            scored.probability,
            base_premium,
            &self.config.pricing,
        )?;

        info!(
            driver_id,
            %as_of,
            score = scored.probability,
            premium = quote.premium,
            band = %quote.band,
            "assessment complete"
        );

        Ok(RiskAssessment {
            driver_id: driver_id.to_string(),
            score: scored.probability,
            top_features,
            premium: quote.premium,
            band: quote.band,
            delta: quote.delta_from_base,
        })
    }
}
