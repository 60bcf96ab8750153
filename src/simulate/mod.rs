//! Seeded synthetic trip generation.
//!
//! Stands in for the external telematics feed so the whole pipeline can be
//! exercised end to end without real data. Fully deterministic for a fixed
//! seed; the inference path itself never touches this module.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::consts::{
    HARSH_BRAKE_THRESHOLD, NIGHT_END_HOUR, NIGHT_START_HOUR, RAPID_ACCEL_THRESHOLD,
    SPEEDING_THRESHOLD_MPH,
};
use crate::types::TripEvent;

/// Simulation parameters.
#[derive(Clone, Debug)]
pub struct SimulatorConfig {
    pub n_drivers: usize,
    pub trips_per_driver: usize,
    /// RNG seed; same seed reproduces the identical event stream.
    pub seed: u64,
    /// All trips start before this instant.
    pub anchor: DateTime<Utc>,
    /// Trips are spread over this many days before the anchor.
    pub horizon_days: i64,
    /// Seconds between consecutive samples within a trip.
    pub event_interval_secs: i64,
}

impl SimulatorConfig {
    pub fn new(anchor: DateTime<Utc>, seed: u64) -> Self {
        Self {
            n_drivers: 20,
            trips_per_driver: 30,
            seed,
            anchor,
            horizon_days: 90,
            event_interval_secs: 60,
        }
    }
}

/// Generates a synthetic fleet of trips.
///
/// Each driver gets a fixed risk propensity that drives harsh-event
/// frequency, speeding, and night-driving share, so the generated fleet
/// spans the score range instead of collapsing onto the mean.
#[derive(Debug)]
pub struct TripSimulator {
    config: SimulatorConfig,
}

impl TripSimulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    /// Generate the full event stream, ordered per driver by trip.
    pub fn generate(&self) -> Vec<TripEvent> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut events = Vec::new();

        for driver_idx in 0..self.config.n_drivers {
            let driver_id = format!("driver_{}", driver_idx + 1);
            // Per-driver propensities, drawn once.
            let risk: f64 = rng.gen_range(0.0..1.0);
            let urban_share: f64 = rng.gen_range(0.2..0.8);
            let night_share: f64 = 0.05 + 0.25 * risk;

            for trip_idx in 0..self.config.trips_per_driver {
                let trip_id = format!("trip_{}_{}", driver_idx + 1, trip_idx + 1);
                self.simulate_trip(
                    &mut rng,
                    &driver_id,
                    &trip_id,
                    risk,
                    urban_share,
                    night_share,
                    &mut events,
                );
            }
        }

        info!(
            drivers = self.config.n_drivers,
            events = events.len(),
            seed = self.config.seed,
            "simulated fleet"
        );
        events
    }

    #[allow(clippy::too_many_arguments)]
    fn simulate_trip(
        &self,
        rng: &mut StdRng,
        driver_id: &str,
        trip_id: &str,
        risk: f64,
        urban_share: f64,
        night_share: f64,
        events: &mut Vec<TripEvent>,
    ) {
        let cfg = &self.config;

        let offset_secs = rng.gen_range(0..cfg.horizon_days * 24 * 3600);
        let mut start = cfg.anchor - Duration::seconds(offset_secs);
        // Bias some trips into the night window to realize the driver's
        // night share.
        if rng.gen_bool(night_share.clamp(0.0, 1.0)) {
            let night_hour = i64::from(NIGHT_START_HOUR) + rng.gen_range(0..5);
            let hour = i64::from(start.hour());
            start = start + Duration::hours((night_hour - hour).rem_euclid(24));
        }

        let duration_secs = rng.gen_range(600..=2400);
        let n_events = (duration_secs / cfg.event_interval_secs).max(2) as usize;
        let is_urban_trip = rng.gen_bool(urban_share.clamp(0.0, 1.0));

        let base_speed = if is_urban_trip {
            rng.gen_range(15.0..40.0)
        } else {
            rng.gen_range(30.0..60.0) + 15.0 * risk
        };

        // Harsh episodes: riskier drivers get more.
        let episode_budget = (risk * 3.0).round() as usize;
        let n_episodes = rng.gen_range(0..=episode_budget.max(1));
        let mut harsh_at: Vec<(usize, bool)> = Vec::with_capacity(n_episodes);
        for _ in 0..n_episodes {
            harsh_at.push((rng.gen_range(0..n_events), rng.gen_bool(0.5)));
        }

        let mut prev_speed = base_speed;
        for i in 0..n_events {
            let timestamp =
                start + Duration::seconds(i as i64 * cfg.event_interval_secs);
            let mut speed = (base_speed + rng.gen_range(-8.0..8.0)).max(0.0);
            // Urban traffic idles at lights now and then.
            if is_urban_trip && rng.gen_bool(0.1) {
                speed = rng.gen_range(0.0..4.0);
            }

            let episode = harsh_at.iter().find(|(at, _)| *at == i);
            let (acceleration, is_braking_harsh, is_accel_rapid) = match episode {
                Some((_, true)) => (HARSH_BRAKE_THRESHOLD - rng.gen_range(0.0..2.0), true, false),
                Some((_, false)) => (RAPID_ACCEL_THRESHOLD + rng.gen_range(0.0..2.0), false, true),
                // ~0.447 mph per second to m/s^2
                None => ((speed - prev_speed) * 0.447 / cfg.event_interval_secs as f64, false, false),
            };

            let hour = timestamp.hour();
            let is_night = hour >= NIGHT_START_HOUR || hour < NIGHT_END_HOUR;

            events.push(TripEvent {
                driver_id: driver_id.to_string(),
                trip_id: trip_id.to_string(),
                timestamp,
                speed,
                acceleration,
                is_braking_harsh,
                is_accel_rapid,
                is_night,
                is_urban: is_urban_trip,
                is_speeding: speed > SPEEDING_THRESHOLD_MPH,
                mileage_delta: speed * cfg.event_interval_secs as f64 / 3600.0,
            });
            prev_speed = speed;
        }
    }
}
