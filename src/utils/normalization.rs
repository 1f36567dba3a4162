//! Normalization Utilities
//!
//! Clamps derived scores to their closed domains and converts chrono
//! durations to the fractional hours/days the curves are written in.
//!
//! Only derived values pass through here. Inputs that fall outside their
//! domain are rejected by validation, never clamped.

use chrono::Duration;

use crate::policy::MAX_HEALTH_SCORE;

pub const MS_PER_HOUR: f64 = 3_600_000.0;

/// Clamp to [0, 1]; NaN collapses to 0
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Clamp to [0, 100]; NaN collapses to 0
#[inline]
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, MAX_HEALTH_SCORE)
}

/// Duration as fractional hours (millisecond resolution)
#[inline]
pub fn duration_hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / MS_PER_HOUR
}

/// Fractional hours as a chrono duration (millisecond resolution)
#[inline]
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * MS_PER_HOUR).round() as i64)
}

/// Exponential half-life decay factor for `hours` elapsed
#[inline]
pub fn half_life_factor(hours: f64, half_life_hours: f64) -> f64 {
    libm::exp2(-hours / half_life_hours)
}
