#![deny(unreachable_pub)]

//! Telematics risk feature and pricing pipeline.
//!
//! Turns per-trip telematics events into a driver risk probability and a
//! bounded insurance premium:
//!
//! - leakage-safe rolling-window aggregation of trip events into
//!   driver-level feature vectors,
//! - calibrated probability scoring with per-request feature attribution,
//! - a deterministic, guarded score-to-premium transform.
//!
//! The inference path is pure and read-mostly over immutable artifacts;
//! model and config are loaded once and swapped wholesale on reload.

// Core modules
mod consts;
mod errors;

// Domain modules
pub mod calibration;
pub mod config;
pub mod features;
pub mod labels;
pub mod model;
pub mod pipeline;
pub mod pricing;
pub mod simulate;
pub mod store;
pub mod types;

// Re-exports
pub use consts::{
    FEATURE_WINDOW_DAYS, HARSH_BRAKE_THRESHOLD, LABEL_HORIZON_DAYS, MILEAGE_EPSILON,
    NIGHT_END_HOUR, NIGHT_START_HOUR, RAPID_ACCEL_THRESHOLD, RATE_CAP_PER_100MI,
    SPEEDING_THRESHOLD_MPH, STOP_SPEED_MPH,
};
pub use config::RiskConfig;
pub use errors::{ArtifactError, ConfigError, Error, Result};
pub use features::FeatureAggregator;
pub use labels::LabelBuilder;
pub use model::{
    AttributionExtractor, ClassifierArtifact, ExplainerArtifact, IsotonicCalibration,
    ModelArtifacts, ModelRegistry, RiskScorer, ARTIFACT_VERSION,
};
pub use pipeline::{DriverScore, RiskPipeline};
pub use pricing::{discretize, price, PricingConfig, BAND_LABELS};
pub use store::{EventStore, MemoryEventStore};
pub use types::{
    FeatureVector, Label, PriceQuote, RiskAssessment, TripEvent, MODEL_INPUT_FEATURES,
};
