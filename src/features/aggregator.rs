//! Rolling-window driver feature aggregation.
//!
//! Everything here is keyed off an explicit `as_of` timestamp. Reading the
//! wall clock anywhere on this path is a leakage bug: features must be
//! reproducible for historical cut points, and the paired label window
//! starts strictly after `as_of`.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::consts::{FEATURE_WINDOW_DAYS, STOP_SPEED_MPH};
use crate::errors::{Error, Result};
use crate::features::safety::safety_rating;
use crate::features::stats::{percentile, rate_per_100mi};
use crate::store::EventStore;
use crate::types::{FeatureVector, TripEvent};

/// Computes point-in-time feature vectors over a trailing 30-day window.
///
/// Stateless apart from the configured safety weights; safe to share across
/// threads and to run per-driver in parallel in batch jobs.
#[derive(Debug, Clone)]
pub struct FeatureAggregator {
    safety_weights: BTreeMap<String, f64>,
}

impl FeatureAggregator {
    pub fn new(safety_weights: BTreeMap<String, f64>) -> Self {
        Self { safety_weights }
    }

    /// Aggregate one driver's events into a feature vector as of `as_of`.
    ///
    /// Reads only events with `as_of - 30d < timestamp <= as_of`. A window
    /// with zero events is `Error::InsufficientData`; the caller decides the
    /// fallback (e.g. [`FeatureVector::population_average`]), nothing is
    /// injected silently. In-window statistical edge cases (zero mileage,
    /// empty speed sample) resolve to defined sentinels instead.
    pub fn aggregate(
        &self,
        store: &dyn EventStore,
        driver_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<FeatureVector> {
        if driver_id.trim().is_empty() {
            return Err(Error::InvalidInput("driver_id must be non-empty".to_string()));
        }

        let start = as_of - Duration::days(FEATURE_WINDOW_DAYS);
        let events = store.events_for(driver_id, start, as_of)?;
        if events.is_empty() {
            return Err(Error::InsufficientData {
                driver_id: driver_id.to_string(),
                as_of,
                window_days: FEATURE_WINDOW_DAYS,
            });
        }

        let n = events.len() as f64;
        let miles_driven: f64 = events.iter().map(|e| e.mileage_delta.max(0.0)).sum();

        let night = events.iter().filter(|e| e.is_night).count();
        let urban = events.iter().filter(|e| e.is_urban).count();
        let speeding = events.iter().filter(|e| e.is_speeding).count();
        let harsh_brakes = events.iter().filter(|e| e.is_braking_harsh).count();
        let rapid_accels = events.iter().filter(|e| e.is_accel_rapid).count();
        let stop_go_events = count_stop_go_transitions(&events);

        let mut speeds: Vec<f64> = events.iter().map(|e| e.speed).filter(|s| s.is_finite()).collect();
        speeds.sort_by(f64::total_cmp);

        let mut vector = FeatureVector {
            driver_id: driver_id.to_string(),
            as_of,
            miles_driven,
            pct_night: 100.0 * night as f64 / n,
            pct_urban: 100.0 * urban as f64 / n,
            speed_p50: percentile(&speeds, 0.50),
            speed_p95: percentile(&speeds, 0.95),
            harsh_brake_rate_per_100mi: rate_per_100mi(harsh_brakes, miles_driven),
            rapid_accel_rate_per_100mi: rate_per_100mi(rapid_accels, miles_driven),
            pct_speeding: 100.0 * speeding as f64 / n,
            stop_go_rate: rate_per_100mi(stop_go_events, miles_driven),
            safety_rating: 0.0,
        };
        vector.safety_rating = safety_rating(&vector, &self.safety_weights);

        debug!(
            driver_id,
            %as_of,
            events = events.len(),
            miles = vector.miles_driven,
            harsh_rate = vector.harsh_brake_rate_per_100mi,
            "aggregated feature window"
        );
        Ok(vector)
    }

    /// Aggregate many drivers at the same cut point.
    ///
    /// Per-driver failures (typically `InsufficientData`) are returned in
    /// place; one empty driver does not abort the batch. Drivers share no
    /// mutable state, so callers may shard this loop across threads.
    pub fn aggregate_batch(
        &self,
        store: &dyn EventStore,
        driver_ids: &[String],
        as_of: DateTime<Utc>,
    ) -> Vec<(String, Result<FeatureVector>)> {
        driver_ids
            .iter()
            .map(|id| (id.clone(), self.aggregate(store, id, as_of)))
            .collect()
    }
}

/// Stopped-to-moving transitions within a trip: the speed trace crossing the
/// stop threshold upward between consecutive samples of the same trip.
fn count_stop_go_transitions(events: &[TripEvent]) -> usize {
    events
        .windows(2)
        .filter(|pair| {
            pair[0].trip_id == pair[1].trip_id
                && pair[0].speed < STOP_SPEED_MPH
                && pair[1].speed >= STOP_SPEED_MPH
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEventStore;
    use chrono::TimeZone;

    fn base_event(driver: &str, ts: DateTime<Utc>) -> TripEvent {
        TripEvent {
            driver_id: driver.to_string(),
            trip_id: "trip_a".to_string(),
            timestamp: ts,
            speed: 40.0,
            acceleration: 0.0,
            is_braking_harsh: false,
            is_accel_rapid: false,
            is_night: false,
            is_urban: false,
            is_speeding: false,
            mileage_delta: 1.0,
        }
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()
    }

    fn aggregator() -> FeatureAggregator {
        FeatureAggregator::new(BTreeMap::new())
    }

    #[test]
    fn empty_window_is_insufficient_data() {
        let store = MemoryEventStore::default();
        let err = aggregator().aggregate(&store, "d1", as_of()).unwrap_err();
        assert!(matches!(err, Error::InsufficientData { .. }));
    }

    #[test]
    fn empty_driver_id_is_invalid_input() {
        let store = MemoryEventStore::default();
        let err = aggregator().aggregate(&store, "  ", as_of()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn window_boundaries_are_exact() {
        let t = as_of();
        let inside_edge = t; // timestamp == as_of is in-window
        let outside_future = t + Duration::seconds(1);
        let outside_past = t - Duration::days(FEATURE_WINDOW_DAYS); // exactly 30d back is out
        let inside_past = outside_past + Duration::seconds(1);

        let mut events = Vec::new();
        for (i, ts) in [inside_edge, outside_future, outside_past, inside_past]
            .into_iter()
            .enumerate()
        {
            let mut e = base_event("d1", ts);
            e.trip_id = format!("trip_{i}");
            events.push(e);
        }
        let store = MemoryEventStore::from_events(events);

        let v = aggregator().aggregate(&store, "d1", t).unwrap();
        // Only inside_edge and inside_past qualify.
        assert!((v.miles_driven - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_mileage_window_uses_sentinel_rates() {
        let mut e = base_event("d1", as_of());
        e.mileage_delta = 0.0;
        e.is_braking_harsh = true;
        let store = MemoryEventStore::from_events(vec![e]);

        let v = aggregator().aggregate(&store, "d1", as_of()).unwrap();
        assert_eq!(v.harsh_brake_rate_per_100mi, 0.0);
        assert_eq!(v.rapid_accel_rate_per_100mi, 0.0);
        assert_eq!(v.stop_go_rate, 0.0);
        assert!(v.validate().is_ok());
    }

    #[test]
    fn percent_features_are_event_count_fractions() {
        let t = as_of();
        let mut events = Vec::new();
        for i in 0..4 {
            let mut e = base_event("d1", t - Duration::minutes(i));
            e.is_night = i == 0;
            e.is_urban = i < 2;
            e.is_speeding = i < 3;
            events.push(e);
        }
        let store = MemoryEventStore::from_events(events);
        let v = aggregator().aggregate(&store, "d1", t).unwrap();
        assert!((v.pct_night - 25.0).abs() < 1e-12);
        assert!((v.pct_urban - 50.0).abs() < 1e-12);
        assert!((v.pct_speeding - 75.0).abs() < 1e-12);
    }

    #[test]
    fn stop_go_counts_upward_crossings_within_a_trip() {
        let t = as_of();
        let speeds = [20.0, 2.0, 30.0, 1.0, 0.0, 25.0];
        let mut events = Vec::new();
        for (i, s) in speeds.iter().enumerate() {
            let mut e = base_event("d1", t - Duration::minutes((speeds.len() - i) as i64));
            e.speed = *s;
            e.mileage_delta = 25.0; // 150 miles total
            events.push(e);
        }
        // Crossing at 2.0 -> 30.0 and 0.0 -> 25.0: two transitions.
        let store = MemoryEventStore::from_events(events);
        let v = aggregator().aggregate(&store, "d1", t).unwrap();
        assert!((v.stop_go_rate - (2.0 / 150.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn stop_go_ignores_crossings_between_trips() {
        let t = as_of();
        let mut stopped = base_event("d1", t - Duration::minutes(2));
        stopped.speed = 0.0;
        stopped.trip_id = "trip_a".to_string();
        let mut moving = base_event("d1", t - Duration::minutes(1));
        moving.speed = 30.0;
        moving.trip_id = "trip_b".to_string();

        let store = MemoryEventStore::from_events(vec![stopped, moving]);
        let v = aggregator().aggregate(&store, "d1", t).unwrap();
        assert_eq!(v.stop_go_rate, 0.0);
    }

    #[test]
    fn harsh_brake_rate_matches_hand_computation() {
        let t = as_of();
        let mut events = Vec::new();
        for i in 0..100 {
            let mut e = base_event("d1", t - Duration::hours(i));
            e.mileage_delta = 5.0; // 500 miles total
            e.is_braking_harsh = i < 2; // 2 harsh events
            events.push(e);
        }
        let store = MemoryEventStore::from_events(events);
        let v = aggregator().aggregate(&store, "d1", t).unwrap();
        assert!((v.harsh_brake_rate_per_100mi - 0.4).abs() < 1e-9);
    }

    #[test]
    fn batch_keeps_going_past_empty_drivers() {
        let t = as_of();
        let store = MemoryEventStore::from_events(vec![base_event("d1", t)]);
        let ids = vec!["d1".to_string(), "ghost".to_string()];
        let results = aggregator().aggregate_batch(&store, &ids, t);
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(Error::InsufficientData { .. })));
    }
}
