//! Read-only event store seam.
//!
//! The pipeline never talks to storage directly; it reads typed trip events
//! through [`EventStore`]. Production deployments back this with an external
//! tabular store. [`MemoryEventStore`] is the in-process implementation used
//! by the simulator, the report binary, and tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::types::TripEvent;

/// Read-only view over a driver's trip events.
///
/// `events_for` returns events with `start < timestamp <= end`, ordered by
/// timestamp ascending. The half-open lower bound keeps feature windows and
/// forward label windows disjoint when they share a boundary instant.
pub trait EventStore: Send + Sync {
    fn events_for(
        &self,
        driver_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TripEvent>>;

    /// All driver ids known to the store, sorted ascending.
    fn driver_ids(&self) -> Vec<String>;
}

/// In-memory event store keyed by driver id.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    by_driver: HashMap<String, Vec<TripEvent>>,
}

impl MemoryEventStore {
    /// Build a store from a flat event list. Events are grouped per driver
    /// and sorted by timestamp once, up front.
    pub fn from_events(events: Vec<TripEvent>) -> Self {
        let mut by_driver: HashMap<String, Vec<TripEvent>> = HashMap::new();
        for event in events {
            by_driver.entry(event.driver_id.clone()).or_default().push(event);
        }
        for events in by_driver.values_mut() {
            events.sort_by_key(|e| e.timestamp);
        }
        Self { by_driver }
    }

    pub fn len(&self) -> usize {
        self.by_driver.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_driver.is_empty()
    }
}

impl EventStore for MemoryEventStore {
    fn events_for(
        &self,
        driver_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TripEvent>> {
        let events = match self.by_driver.get(driver_id) {
            Some(events) => events
                .iter()
                .filter(|e| e.timestamp > start && e.timestamp <= end)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Ok(events)
    }

    fn driver_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.by_driver.keys().cloned().collect();
        ids.sort();
        ids
    }
}
