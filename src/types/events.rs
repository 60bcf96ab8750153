//! Raw telematics trip events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One telemetry sample from a trip.
///
/// Events are produced by the upstream event source and never mutated after
/// creation. Flags are pre-computed at ingestion from the raw sensor stream
/// (accelerometer thresholds, clock hour, map matching, posted limits).
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TripEvent {
    pub driver_id: String,
    pub trip_id: String,
    pub timestamp: DateTime<Utc>,
    /// Instantaneous speed in mph.
    pub speed: f64,
    /// Forward acceleration in m/s^2 (negative = braking).
    pub acceleration: f64,
    pub is_braking_harsh: bool,
    pub is_accel_rapid: bool,
    pub is_night: bool,
    pub is_urban: bool,
    pub is_speeding: bool,
    /// Miles covered since the previous sample of the same trip.
    pub mileage_delta: f64,
}
