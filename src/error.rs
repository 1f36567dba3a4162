//! Engine errors
//!
//! All variants are local and recoverable. Engine operations borrow the
//! current state and return a new one, so an `Err` leaves the caller's
//! state exactly as it was.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("elapsed time must not be negative (got {millis} ms)")]
    NegativeElapsed { millis: i64 },

    #[error("confidence must be within [0, 1] (got {0})")]
    ConfidenceOutOfRange(f64),

    #[error("temperature {0}°C is outside the plausible range")]
    TemperatureOutOfRange(f64),

    #[error("humidity {0}% is outside [0, 100]")]
    HumidityOutOfRange(f64),

    #[error("wind speed {0} m/s is outside the plausible range")]
    WindSpeedOutOfRange(f64),

    #[error("coordinate ({latitude}, {longitude}) is not a valid latitude/longitude")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("disease label must not be empty")]
    EmptyDiseaseLabel,

    #[error("classifier reported a failure instead of a label")]
    ClassifierFailure,

    #[error("species '{0}' does not support disease analysis")]
    UnsupportedSpecies(String),

    #[error("event at {event_at} predates the state evaluated at {state_at}")]
    StaleEvent {
        event_at: DateTime<Utc>,
        state_at: DateTime<Utc>,
    },

    #[error("event at {event_at} is ahead of the clock ({now})")]
    FutureEvent {
        event_at: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("plant {0} not found")]
    PlantNotFound(u64),
}

impl EngineError {
    /// True for errors caused by a malformed input value
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::NegativeElapsed { .. }
                | EngineError::ConfidenceOutOfRange(_)
                | EngineError::TemperatureOutOfRange(_)
                | EngineError::HumidityOutOfRange(_)
                | EngineError::WindSpeedOutOfRange(_)
                | EngineError::CoordinateOutOfRange { .. }
                | EngineError::NonFinite { .. }
                | EngineError::EmptyDiseaseLabel
                | EngineError::ClassifierFailure
                | EngineError::FutureEvent { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
