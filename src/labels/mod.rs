//! Forward-looking outcome labels.
//!
//! Used only for offline calibration and evaluation, never at inference.
//! The label window `(window_end, window_end + 30d]` starts strictly after
//! the paired feature window ends, so no event can influence both.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::consts::LABEL_HORIZON_DAYS;
use crate::errors::{Error, Result};
use crate::store::EventStore;
use crate::types::Label;

/// Builds binary claim labels from the forward event horizon.
///
/// A recorded claim is not part of the event schema, so the label uses a
/// severity proxy: the forward window must contain at least
/// `claim_harsh_brake_min` harsh-braking events to count as a claim.
/// The threshold is configuration, not code.
#[derive(Debug, Clone)]
pub struct LabelBuilder {
    claim_harsh_brake_min: u32,
}

impl LabelBuilder {
    pub fn new(claim_harsh_brake_min: u32) -> Self {
        Self { claim_harsh_brake_min }
    }

    /// Derive the label for one driver at one cut point.
    ///
    /// Only events with `window_end < timestamp <= window_end + 30d` are
    /// read. An empty forward window is a legitimate negative, not an error.
    pub fn build_label(
        &self,
        store: &dyn EventStore,
        driver_id: &str,
        window_end: DateTime<Utc>,
    ) -> Result<Label> {
        if driver_id.trim().is_empty() {
            return Err(Error::InvalidInput("driver_id must be non-empty".to_string()));
        }

        let horizon_end = window_end + Duration::days(LABEL_HORIZON_DAYS);
        let events = store.events_for(driver_id, window_end, horizon_end)?;
        let harsh = events.iter().filter(|e| e.is_braking_harsh).count();
        let claim = harsh as u32 >= self.claim_harsh_brake_min;

        debug!(
            driver_id,
            %window_end,
            forward_events = events.len(),
            harsh_events = harsh,
            claim,
            "built label"
        );

        Ok(Label {
            driver_id: driver_id.to_string(),
            window_end,
            claim_in_30d: claim,
        })
    }

    /// Labels for many drivers at the same cut point; per-driver errors are
    /// returned in place.
    pub fn build_labels_batch(
        &self,
        store: &dyn EventStore,
        driver_ids: &[String],
        window_end: DateTime<Utc>,
    ) -> Vec<(String, Result<Label>)> {
        driver_ids
            .iter()
            .map(|id| (id.clone(), self.build_label(store, id, window_end)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEventStore;
    use crate::types::TripEvent;
    use chrono::TimeZone;

    fn harsh_event(driver: &str, ts: DateTime<Utc>) -> TripEvent {
        TripEvent {
            driver_id: driver.to_string(),
            trip_id: "t".to_string(),
            timestamp: ts,
            speed: 45.0,
            acceleration: -6.0,
            is_braking_harsh: true,
            is_accel_rapid: false,
            is_night: false,
            is_urban: false,
            is_speeding: false,
            mileage_delta: 0.5,
        }
    }

    fn window_end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn label_never_reads_the_feature_window() {
        let end = window_end();
        // One harsh event just before the cut, one just after. Only the
        // "after" event may flip the label.
        let before = harsh_event("d1", end - Duration::seconds(1));
        let after = harsh_event("d1", end + Duration::seconds(1));
        let store = MemoryEventStore::from_events(vec![before, after]);

        let label = LabelBuilder::new(1).build_label(&store, "d1", end).unwrap();
        assert!(label.claim_in_30d);

        // Remove the "after" event: the "before" one alone must not count.
        let store = MemoryEventStore::from_events(vec![harsh_event(
            "d1",
            end - Duration::seconds(1),
        )]);
        let label = LabelBuilder::new(1).build_label(&store, "d1", end).unwrap();
        assert!(!label.claim_in_30d);
    }

    #[test]
    fn event_exactly_at_window_end_is_excluded() {
        let end = window_end();
        let store = MemoryEventStore::from_events(vec![harsh_event("d1", end)]);
        let label = LabelBuilder::new(1).build_label(&store, "d1", end).unwrap();
        assert!(!label.claim_in_30d);
    }

    #[test]
    fn event_past_the_horizon_is_excluded() {
        let end = window_end();
        let too_late = end + Duration::days(LABEL_HORIZON_DAYS) + Duration::seconds(1);
        let store = MemoryEventStore::from_events(vec![harsh_event("d1", too_late)]);
        let label = LabelBuilder::new(1).build_label(&store, "d1", end).unwrap();
        assert!(!label.claim_in_30d);
    }

    #[test]
    fn threshold_counts_harsh_events() {
        let end = window_end();
        let events: Vec<TripEvent> = (1..=2)
            .map(|i| harsh_event("d1", end + Duration::days(i)))
            .collect();
        let store = MemoryEventStore::from_events(events);

        assert!(LabelBuilder::new(2).build_label(&store, "d1", end).unwrap().claim_in_30d);
        assert!(!LabelBuilder::new(3).build_label(&store, "d1", end).unwrap().claim_in_30d);
    }

    #[test]
    fn empty_forward_window_is_a_negative() {
        let store = MemoryEventStore::default();
        let label = LabelBuilder::new(1)
            .build_label(&store, "d1", window_end())
            .unwrap();
        assert!(!label.claim_in_30d);
    }
}
