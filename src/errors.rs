use chrono::{DateTime, Utc};
use thiserror::Error;

/// Configuration validation errors.
///
/// All of these are startup-time failures: a process that hits one must not
/// serve traffic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required config field: {0}")]
    MissingField(&'static str),
    #[error("config field {0} must be a finite number")]
    NonFiniteValue(&'static str),
    #[error("pricing sigma must be positive, got {0}")]
    NonPositiveSigma(f64),
    #[error("pricing caps must satisfy min_cap <= 1 <= max_cap, got [{min_cap}, {max_cap}]")]
    InvalidCaps { min_cap: f64, max_cap: f64 },
    #[error("band cut points must be three strictly increasing values in (0, 1), got {0:?}")]
    InvalidBandCuts(Vec<f64>),
    #[error("safety weight for unknown feature: {0}")]
    UnknownWeightFeature(String),
    #[error("safety weight for {name} must be finite and non-negative, got {value}")]
    InvalidWeight { name: String, value: f64 },
    #[error("safety weights must contain at least one positive weight")]
    EmptyWeights,
    #[error("failed to read config {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("failed to parse config {path}: {reason}")]
    Parse { path: String, reason: String },
}

/// Model artifact loading errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("failed to parse artifact {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("unsupported artifact version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("artifact schema does not match the model input schema: {0}")]
    UnknownSchema(String),
    #[error("artifact field {field} has length {found}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        found: usize,
        expected: usize,
    },
    #[error("invalid calibration map: {0}")]
    InvalidCalibration(String),
    #[error("artifact field {0} contains a non-finite value")]
    NonFinite(&'static str),
}

/// Pipeline error taxonomy.
///
/// `InsufficientData` is recoverable by a caller-chosen fallback. Everything
/// else is either a startup-time fatal (`Config`, `Artifact`,
/// `SchemaMismatch`, `ModelNotLoaded`) or an input rejection
/// (`InvalidInput`) raised before any computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("no events for driver {driver_id} in the {window_days}-day window ending {as_of}")]
    InsufficientData {
        driver_id: String,
        as_of: DateTime<Utc>,
        window_days: i64,
    },
    #[error("risk model not loaded")]
    ModelNotLoaded,
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
    #[error("feature schema mismatch: classifier [{classifier}] vs explainer [{explainer}]")]
    SchemaMismatch {
        classifier: String,
        explainer: String,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
