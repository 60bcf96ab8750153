//! Shared constants for feature computation and simulation.

/// Trailing feature window length in days.
pub const FEATURE_WINDOW_DAYS: i64 = 30;

/// Forward label horizon in days.
pub const LABEL_HORIZON_DAYS: i64 = 30;

/// Minimum in-window mileage before per-mile rates are computed.
/// Below this, rates resolve to 0.0 instead of dividing.
pub const MILEAGE_EPSILON: f64 = 0.1;

/// Outlier cap for per-100-mile event rates.
pub const RATE_CAP_PER_100MI: f64 = 500.0;

/// Speed below which an event counts as stopped (mph).
pub const STOP_SPEED_MPH: f64 = 5.0;

/// Speeding flag threshold (mph).
pub const SPEEDING_THRESHOLD_MPH: f64 = 70.0;

/// Forward deceleration below which braking is harsh (m/s^2).
pub const HARSH_BRAKE_THRESHOLD: f64 = -5.0;

/// Forward acceleration above which acceleration is rapid (m/s^2).
pub const RAPID_ACCEL_THRESHOLD: f64 = 5.0;

/// Night window: hour >= NIGHT_START_HOUR or hour < NIGHT_END_HOUR (UTC).
pub const NIGHT_START_HOUR: u32 = 22;
/// See [`NIGHT_START_HOUR`].
pub const NIGHT_END_HOUR: u32 = 5;
