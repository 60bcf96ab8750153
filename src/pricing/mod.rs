//! Score-to-premium transform with hard guardrails.
//!
//! A pure function: same `(score, base_premium, config)` always produces the
//! same quote, bit for bit. No randomness, no clock reads, no hidden state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ConfigError, Error, Result};
use crate::types::PriceQuote;

/// Risk band labels, lowest to highest score.
pub const BAND_LABELS: [&str; 4] = ["low", "moderate", "elevated", "high"];

/// Pricing parameters plus the score population statistics.
///
/// All of these are externally supplied configuration; changing the policy
/// (caps, sensitivity, cut points) never touches the engine logic.
/// Immutable per process lifetime; reloads swap the whole structure.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct PricingConfig {
    /// Premium sensitivity to score deviation from the population mean.
    pub alpha: f64,
    /// Lower premium guardrail as a multiple of base premium.
    pub min_cap: f64,
    /// Upper premium guardrail as a multiple of base premium.
    pub max_cap: f64,
    /// Population mean of the score distribution.
    pub mu: f64,
    /// Population standard deviation of the score distribution.
    pub sigma: f64,
    /// Score cut points separating the four risk bands.
    pub band_cuts: [f64; 3],
}

impl PricingConfig {
    /// Guardrail validation. A config that fails here must never price.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (value, field) in [
            (self.alpha, "pricing.alpha"),
            (self.min_cap, "pricing.min_cap"),
            (self.max_cap, "pricing.max_cap"),
            (self.mu, "pricing.mu"),
            (self.sigma, "pricing.sigma"),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue(field));
            }
        }
        if self.sigma <= 0.0 {
            return Err(ConfigError::NonPositiveSigma(self.sigma));
        }
        if !(self.min_cap <= 1.0 && 1.0 <= self.max_cap) {
            return Err(ConfigError::InvalidCaps {
                min_cap: self.min_cap,
                max_cap: self.max_cap,
            });
        }
        let cuts = &self.band_cuts;
        let increasing = cuts.windows(2).all(|p| p[0] < p[1]);
        let in_unit = cuts.iter().all(|c| c.is_finite() && *c > 0.0 && *c < 1.0);
        if !increasing || !in_unit {
            return Err(ConfigError::InvalidBandCuts(cuts.to_vec()));
        }
        Ok(())
    }
}

/// Deterministic score-to-band mapping over the configured cut points.
pub fn discretize(score: f64, cuts: &[f64; 3]) -> &'static str {
    let idx = cuts.iter().filter(|c| score >= **c).count();
    BAND_LABELS[idx]
}

/// Price one driver.
///
/// ```text
/// premium_raw = base_premium * (1 + alpha * (score - mu) / sigma)
/// premium     = clamp(premium_raw, base_premium * min_cap, base_premium * max_cap)
/// ```
///
/// The clamp is unconditional and applied after the raw computation, so the
/// output premium stays inside the guardrails regardless of score
/// extremity. Malformed inputs are rejected before any computation.
pub fn price(
    driver_id: &str,
    score: f64,
    base_premium: f64,
    config: &PricingConfig,
) -> Result<PriceQuote> {
    config.validate()?;

    if driver_id.trim().is_empty() {
        return Err(Error::InvalidInput("driver_id must be non-empty".to_string()));
    }
    if !base_premium.is_finite() || base_premium <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "base_premium must be positive, got {base_premium}"
        )));
    }
    if !score.is_finite() {
        return Err(Error::InvalidInput(format!("score must be finite, got {score}")));
    }
    let score = score.clamp(0.0, 1.0);

    let premium_raw = base_premium * (1.0 + config.alpha * (score - config.mu) / config.sigma);
    let floor = base_premium * config.min_cap;
    let ceiling = base_premium * config.max_cap;
    let premium = premium_raw.clamp(floor, ceiling);
    let band = discretize(score, &config.band_cuts);

    debug!(driver_id, score, premium_raw, premium, band, "priced driver");

    Ok(PriceQuote {
        driver_id: driver_id.to_string(),
        score,
        premium,
        band: band.to_string(),
        delta_from_base: premium - base_premium,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PricingConfig {
        PricingConfig {
            alpha: 0.5,
            min_cap: 0.8,
            max_cap: 1.5,
            mu: 0.4,
            sigma: 0.2,
            band_cuts: [0.25, 0.5, 0.75],
        }
    }

    #[test]
    fn reference_scenario_prices_at_125() {
        // alpha=0.5, mu=0.4, sigma=0.2, base=100, score=0.5
        // raw = 100 * (1 + 0.5 * (0.5 - 0.4) / 0.2) = 125, inside caps.
        let quote = price("d1", 0.5, 100.0, &config()).unwrap();
        assert!((quote.premium - 125.0).abs() < 1e-9);
        assert!((quote.delta_from_base - 25.0).abs() < 1e-9);
        assert_eq!(quote.band, "moderate");
    }

    #[test]
    fn clamp_invariant_holds_across_the_score_range() {
        let cfg = config();
        for base in [50.0, 100.0, 1234.5] {
            for i in 0..=100 {
                let score = i as f64 / 100.0;
                let quote = price("d1", score, base, &cfg).unwrap();
                assert!(quote.premium >= base * cfg.min_cap - 1e-9);
                assert!(quote.premium <= base * cfg.max_cap + 1e-9);
            }
        }
    }

    #[test]
    fn extreme_scores_hit_the_caps() {
        let cfg = config();
        let low = price("d1", 0.0, 100.0, &cfg).unwrap();
        let high = price("d1", 1.0, 100.0, &cfg).unwrap();
        assert!((low.premium - 80.0).abs() < 1e-9); // raw would be 0
        assert!((high.premium - 150.0).abs() < 1e-9); // raw would be 250
    }

    #[test]
    fn pricing_is_monotonic_in_score() {
        let cfg = config();
        let mut last = f64::NEG_INFINITY;
        for i in 0..=100 {
            let quote = price("d1", i as f64 / 100.0, 100.0, &cfg).unwrap();
            assert!(quote.premium >= last);
            last = quote.premium;
        }
    }

    #[test]
    fn pricing_is_bit_deterministic() {
        let cfg = config();
        let first = price("d1", 0.37, 199.99, &cfg).unwrap();
        for _ in 0..10 {
            let next = price("d1", 0.37, 199.99, &cfg).unwrap();
            assert_eq!(first.premium.to_bits(), next.premium.to_bits());
            assert_eq!(first.delta_from_base.to_bits(), next.delta_from_base.to_bits());
            assert_eq!(first.band, next.band);
        }
    }

    #[test]
    fn zero_sigma_is_a_config_error_not_a_default() {
        let mut cfg = config();
        cfg.sigma = 0.0;
        let err = price("d1", 0.5, 100.0, &cfg).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::NonPositiveSigma(_))
        ));
    }

    #[test]
    fn caps_must_bracket_one() {
        let mut cfg = config();
        cfg.min_cap = 1.2;
        assert!(matches!(
            price("d1", 0.5, 100.0, &cfg).unwrap_err(),
            Error::Config(ConfigError::InvalidCaps { .. })
        ));
    }

    #[test]
    fn non_positive_base_premium_is_rejected() {
        let cfg = config();
        for bad in [0.0, -10.0, f64::NAN] {
            assert!(matches!(
                price("d1", 0.5, bad, &cfg).unwrap_err(),
                Error::InvalidInput(_)
            ));
        }
    }

    #[test]
    fn empty_driver_id_is_rejected() {
        assert!(matches!(
            price("", 0.5, 100.0, &config()).unwrap_err(),
            Error::InvalidInput(_)
        ));
    }

    #[test]
    fn bands_follow_the_cut_points() {
        let cuts = [0.25, 0.5, 0.75];
        assert_eq!(discretize(0.0, &cuts), "low");
        assert_eq!(discretize(0.24, &cuts), "low");
        assert_eq!(discretize(0.25, &cuts), "moderate");
        assert_eq!(discretize(0.5, &cuts), "elevated");
        assert_eq!(discretize(0.75, &cuts), "high");
        assert_eq!(discretize(1.0, &cuts), "high");
    }
}
