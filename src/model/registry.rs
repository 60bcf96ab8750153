//! Process-wide model artifact registry.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::errors::{Error, Result};
use crate::model::artifact::ModelArtifacts;

/// Holds the currently bound artifact set.
///
/// Artifacts are bound once at process start. A reload builds a fresh
/// [`ModelArtifacts`] and swaps the `Arc` wholesale: readers that cloned
/// the previous `Arc` finish their request on the old snapshot, and nothing
/// is ever edited in place.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    current: RwLock<Option<Arc<ModelArtifacts>>>,
}

impl ModelRegistry {
    /// An unbound registry. Scoring through it fails with
    /// [`Error::ModelNotLoaded`] until [`bind`](Self::bind) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or replace) the artifact set.
    pub fn bind(&self, artifacts: ModelArtifacts) {
        let features = artifacts.classifier.feature_schema.len();
        let mut slot = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let replacing = slot.is_some();
        *slot = Some(Arc::new(artifacts));
        info!(features, replacing, "model artifacts bound");
    }

    /// Snapshot of the currently bound artifacts.
    pub fn current(&self) -> Result<Arc<ModelArtifacts>> {
        let slot = match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.clone().ok_or(Error::ModelNotLoaded)
    }

    pub fn is_bound(&self) -> bool {
        self.current().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::artifact::{demo_classifier, demo_explainer};

    #[test]
    fn unbound_registry_reports_model_not_loaded() {
        let registry = ModelRegistry::new();
        assert_eq!(registry.current().unwrap_err(), Error::ModelNotLoaded);
        assert!(!registry.is_bound());
    }

    #[test]
    fn bind_then_current_returns_the_artifacts() {
        let registry = ModelRegistry::new();
        let artifacts = ModelArtifacts::from_parts(demo_classifier(), demo_explainer()).unwrap();
        registry.bind(artifacts);
        assert!(registry.is_bound());
        let snapshot = registry.current().unwrap();
        assert_eq!(snapshot.classifier.feature_schema.len(), 9);
    }

    #[test]
    fn rebinding_swaps_the_snapshot() {
        let registry = ModelRegistry::new();
        registry.bind(ModelArtifacts::from_parts(demo_classifier(), demo_explainer()).unwrap());
        let old = registry.current().unwrap();

        let mut classifier = demo_classifier();
        classifier.intercept = -1.0;
        registry.bind(ModelArtifacts::from_parts(classifier, demo_explainer()).unwrap());

        let new = registry.current().unwrap();
        assert!((old.classifier.intercept - -2.0).abs() < 1e-12);
        assert!((new.classifier.intercept - -1.0).abs() < 1e-12);
    }
}
