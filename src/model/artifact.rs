//! Serialized model artifacts and load-time schema validation.
//!
//! Two versioned JSON documents come out of the external training pipeline:
//! the calibrated classifier and the explainer. Both carry the ordered
//! feature schema they were fitted against. Loading validates everything
//! once (versions, schema agreement, vector lengths, calibration
//! invariants) so the inference path can index by position without
//! re-checking.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{ArtifactError, Error, Result};
use crate::model::isotonic::IsotonicCalibration;
use crate::types::MODEL_INPUT_FEATURES;

/// Artifact format version this build understands.
pub const ARTIFACT_VERSION: u32 = 1;

/// Calibrated classifier: a linear margin over the feature schema composed
/// with an isotonic calibration map.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ClassifierArtifact {
    pub version: u32,
    /// Ordered feature names this model was fitted against.
    pub feature_schema: Vec<String>,
    /// Per-feature margin weights, aligned with `feature_schema`.
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub calibration: IsotonicCalibration,
}

/// Explainer: per-feature attribution weights plus the background feature
/// means of the training population.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ExplainerArtifact {
    pub version: u32,
    /// Must equal the classifier's schema, names and order both.
    pub feature_schema: Vec<String>,
    pub weights: Vec<f64>,
    pub background_means: Vec<f64>,
}

/// Both artifacts, validated together and frozen.
///
/// Constructed once at process start (or on explicit reload) and shared by
/// reference; nothing in here is ever mutated afterwards.
#[derive(Clone, Debug)]
pub struct ModelArtifacts {
    pub classifier: ClassifierArtifact,
    pub explainer: ExplainerArtifact,
}

impl ModelArtifacts {
    /// Load and validate both artifacts from disk.
    pub fn load(classifier_path: &Path, explainer_path: &Path) -> Result<Self> {
        let classifier: ClassifierArtifact = read_json(classifier_path)?;
        let explainer: ExplainerArtifact = read_json(explainer_path)?;
        let artifacts = Self::from_parts(classifier, explainer)?;
        info!(
            classifier = %classifier_path.display(),
            explainer = %explainer_path.display(),
            features = artifacts.classifier.feature_schema.len(),
            "model artifacts loaded"
        );
        Ok(artifacts)
    }

    /// Validate a pair of in-memory artifacts.
    ///
    /// A feature-schema disagreement between classifier and explainer is a
    /// fatal configuration error, never a best-effort fallback.
    pub fn from_parts(
        classifier: ClassifierArtifact,
        explainer: ExplainerArtifact,
    ) -> Result<Self> {
        for version in [classifier.version, explainer.version] {
            if version != ARTIFACT_VERSION {
                return Err(ArtifactError::UnsupportedVersion {
                    found: version,
                    expected: ARTIFACT_VERSION,
                }
                .into());
            }
        }

        if classifier.feature_schema != MODEL_INPUT_FEATURES {
            return Err(ArtifactError::UnknownSchema(
                classifier.feature_schema.join(","),
            )
            .into());
        }
        if explainer.feature_schema != classifier.feature_schema {
            return Err(Error::SchemaMismatch {
                classifier: classifier.feature_schema.join(","),
                explainer: explainer.feature_schema.join(","),
            });
        }

        let n = classifier.feature_schema.len();
        check_len("classifier.weights", classifier.weights.len(), n)?;
        check_len("explainer.weights", explainer.weights.len(), n)?;
        check_len("explainer.background_means", explainer.background_means.len(), n)?;

        check_finite("classifier.weights", &classifier.weights)?;
        check_finite("classifier.intercept", &[classifier.intercept])?;
        check_finite("explainer.weights", &explainer.weights)?;
        check_finite("explainer.background_means", &explainer.background_means)?;

        classifier.calibration.validate()?;

        Ok(Self { classifier, explainer })
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| ArtifactError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let parsed = serde_json::from_str(&content).map_err(|e| ArtifactError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(parsed)
}

fn check_len(field: &'static str, found: usize, expected: usize) -> Result<()> {
    if found != expected {
        return Err(ArtifactError::LengthMismatch { field, found, expected }.into());
    }
    Ok(())
}

fn check_finite(field: &'static str, values: &[f64]) -> Result<()> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ArtifactError::NonFinite(field).into());
    }
    Ok(())
}

/// Small self-consistent artifact pair for tests.
#[cfg(test)]
pub(crate) fn demo_classifier() -> ClassifierArtifact {
    ClassifierArtifact {
        version: ARTIFACT_VERSION,
        feature_schema: MODEL_INPUT_FEATURES.iter().map(|s| s.to_string()).collect(),
        weights: vec![0.0, 0.01, 0.005, 0.0, 0.02, 0.3, 0.2, 0.02, 0.05],
        intercept: -2.0,
        calibration: IsotonicCalibration {
            breakpoints: vec![0.1, 0.3, 0.6],
            values: vec![0.05, 0.3, 0.8],
        },
    }
}

#[cfg(test)]
pub(crate) fn demo_explainer() -> ExplainerArtifact {
    ExplainerArtifact {
        version: ARTIFACT_VERSION,
        feature_schema: MODEL_INPUT_FEATURES.iter().map(|s| s.to_string()).collect(),
        weights: vec![0.0, 0.01, 0.005, 0.0, 0.02, 0.3, 0.2, 0.02, 0.05],
        background_means: vec![300.0, 8.0, 40.0, 35.0, 60.0, 1.0, 0.8, 3.0, 5.0],
    }
}
