//! Outcome labels for offline calibration and evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binary claim outcome for one driver over one forward horizon.
///
/// Derived strictly from events in `(window_end, window_end + horizon]`.
/// The paired feature window ends at `window_end`, so the two never overlap.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Label {
    pub driver_id: String,
    pub window_end: DateTime<Utc>,
    pub claim_in_30d: bool,
}
