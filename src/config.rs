//! TOML configuration loading and validation.
//!
//! The config document is closed: every recognized field is declared here,
//! unrecognized keys are ignored, and required pricing fields with no safe
//! default are a load-time [`ConfigError`]. The process must not start
//! guessing `sigma` or the caps.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::errors::ConfigError;
use crate::features::SAFETY_NORM_BOUNDS;
use crate::pricing::PricingConfig;

/// Default score cut points separating the four risk bands. A policy
/// default, overridable in `[pricing].band_cuts`.
pub const DEFAULT_BAND_CUTS: [f64; 3] = [0.25, 0.5, 0.75];

/// Default harsh-brake count that flips the forward-window claim label.
pub const DEFAULT_CLAIM_HARSH_BRAKE_MIN: u32 = 3;

/// Validated runtime configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskConfig {
    pub pricing: PricingConfig,
    /// Per-feature weights for the safety rating composite.
    pub safety_weights: BTreeMap<String, f64>,
    pub claim_harsh_brake_min: u32,
}

// Raw deserialization targets. Everything is optional here so that missing
// required fields surface as ConfigError instead of serde defaults.
#[derive(Deserialize, Default)]
struct RiskConfigFile {
    pricing: Option<PricingSection>,
    features: Option<FeaturesSection>,
    labels: Option<LabelsSection>,
}

#[derive(Deserialize, Default)]
struct PricingSection {
    alpha: Option<f64>,
    min_cap: Option<f64>,
    max_cap: Option<f64>,
    mu: Option<f64>,
    sigma: Option<f64>,
    band_cuts: Option<Vec<f64>>,
}

#[derive(Deserialize, Default)]
struct FeaturesSection {
    weights: Option<BTreeMap<String, f64>>,
}

#[derive(Deserialize, Default)]
struct LabelsSection {
    claim_harsh_brake_min: Option<u32>,
}

impl RiskConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate TOML content. `source` names the origin in parse
    /// errors.
    pub fn from_toml_str(content: &str, source: &str) -> Result<Self, ConfigError> {
        let file: RiskConfigFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: source.to_string(),
            reason: e.to_string(),
        })?;

        let pricing_section = file.pricing.ok_or(ConfigError::MissingField("pricing"))?;
        let band_cuts = match pricing_section.band_cuts {
            None => DEFAULT_BAND_CUTS,
            Some(cuts) => <[f64; 3]>::try_from(cuts.clone())
                .map_err(|_| ConfigError::InvalidBandCuts(cuts))?,
        };
        let pricing = PricingConfig {
            alpha: pricing_section.alpha.ok_or(ConfigError::MissingField("pricing.alpha"))?,
            min_cap: pricing_section
                .min_cap
                .ok_or(ConfigError::MissingField("pricing.min_cap"))?,
            max_cap: pricing_section
                .max_cap
                .ok_or(ConfigError::MissingField("pricing.max_cap"))?,
            mu: pricing_section.mu.ok_or(ConfigError::MissingField("pricing.mu"))?,
            sigma: pricing_section.sigma.ok_or(ConfigError::MissingField("pricing.sigma"))?,
            band_cuts,
        };
        pricing.validate()?;

        let safety_weights = match file.features.unwrap_or_default().weights {
            None => default_safety_weights(),
            Some(weights) => weights,
        };
        validate_weights(&safety_weights)?;

        let claim_harsh_brake_min = file
            .labels
            .unwrap_or_default()
            .claim_harsh_brake_min
            .unwrap_or(DEFAULT_CLAIM_HARSH_BRAKE_MIN);

        Ok(Self {
            pricing,
            safety_weights,
            claim_harsh_brake_min,
        })
    }

    /// A commented sample config, written by `risk_report generate-config`.
    pub fn sample_toml() -> String {
        let mut out = String::from(
            "# Telematics risk pipeline configuration\n\
             \n\
             [pricing]\n\
             # Premium sensitivity to score deviation from the population mean.\n\
             alpha = 0.5\n\
             # Premium guardrails as multiples of the base premium.\n\
             min_cap = 0.8\n\
             max_cap = 1.5\n\
             # Score population statistics from the latest holdout evaluation.\n\
             mu = 0.4\n\
             sigma = 0.2\n\
             # Risk band cut points (low / moderate / elevated / high).\n\
             band_cuts = [0.25, 0.5, 0.75]\n\
             \n\
             [labels]\n\
             # Harsh-brake events in the forward window that count as a claim.\n\
             claim_harsh_brake_min = 3\n\
             \n\
             # Safety rating weights per feature.\n\
             [features.weights]\n",
        );
        for (name, weight) in default_safety_weights() {
            out.push_str(&format!("{name} = {weight}\n"));
        }
        out
    }
}

/// Policy-default safety weights: harsh events dominate, exposure mix
/// contributes less.
pub fn default_safety_weights() -> BTreeMap<String, f64> {
    [
        ("harsh_brake_rate_per_100mi", 0.25),
        ("rapid_accel_rate_per_100mi", 0.20),
        ("pct_speeding", 0.20),
        ("pct_night", 0.15),
        ("pct_urban", 0.10),
        ("stop_go_rate", 0.10),
    ]
    .into_iter()
    .map(|(n, w)| (n.to_string(), w))
    .collect()
}

fn validate_weights(weights: &BTreeMap<String, f64>) -> Result<(), ConfigError> {
    for (name, &weight) in weights {
        if !SAFETY_NORM_BOUNDS.iter().any(|(known, _)| known == name) {
            return Err(ConfigError::UnknownWeightFeature(name.clone()));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::InvalidWeight {
                name: name.clone(),
                value: weight,
            });
        }
    }
    if !weights.values().any(|w| *w > 0.0) {
        return Err(ConfigError::EmptyWeights);
    }
    Ok(())
}
