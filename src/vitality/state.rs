//! Vitality State and Inputs
//!
//! `VitalityState` is the per-plant record the engine reads and returns.
//! Callers load and store it; only engine operations produce new values.
//!
//! The weather sample, disease event and watering trigger are the external
//! inputs. Each validates itself before the engine touches any state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::policy::{
    MAX_HEALTH_SCORE, MAX_HUMIDITY_PCT, MAX_PLAUSIBLE_TEMPERATURE_C, MAX_WIND_SPEED_MS,
    MIN_PLAUSIBLE_TEMPERATURE_C,
};

/// Per-plant health and stress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalityState {
    /// 0-100, 100 = perfect health
    pub health_score: f64,
    /// 0-1, 0 = fully hydrated
    pub water_stress: f64,
    /// 0-1, 0 = no detected disease risk
    pub disease_risk_index: f64,

    pub last_watered_at: Option<DateTime<Utc>>,
    pub last_environment_sync_at: Option<DateTime<Utc>>,
    pub last_disease_event_at: Option<DateTime<Utc>>,

    /// Plant creation time; dry time accrues from here until the first watering
    pub created_at: DateTime<Utc>,
    /// Time this state was last evaluated to
    pub updated_at: DateTime<Utc>,

    /// Temperature from the latest environment sync (°C)
    #[serde(default)]
    pub last_temperature_c: Option<f64>,
    /// Consecutive healthy leaf classifications
    #[serde(default)]
    pub healthy_streak: u32,
}

impl VitalityState {
    /// Fresh plant: full health, no stress, no risk
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            health_score: MAX_HEALTH_SCORE,
            water_stress: 0.0,
            disease_risk_index: 0.0,
            last_watered_at: None,
            last_environment_sync_at: None,
            last_disease_event_at: None,
            created_at,
            updated_at: created_at,
            last_temperature_c: None,
            healthy_streak: 0,
        }
    }

    /// All three scores inside their closed domains
    pub fn is_within_domains(&self) -> bool {
        (0.0..=MAX_HEALTH_SCORE).contains(&self.health_score)
            && (0.0..=1.0).contains(&self.water_stress)
            && (0.0..=1.0).contains(&self.disease_risk_index)
    }

    /// Start of the current dry spell
    pub fn dry_since(&self) -> DateTime<Utc> {
        self.last_watered_at.unwrap_or(self.created_at)
    }
}

// ============================================================================
// Weather
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn validate(&self) -> Result<()> {
        let valid = self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude);

        if valid {
            Ok(())
        } else {
            Err(EngineError::CoordinateOutOfRange {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Weather telemetry for a coordinate, delivered by the weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub coordinate: Coordinate,
    pub observed_at: DateTime<Utc>,
    pub temperature_c: f64,
    /// Provider condition label ("Clear", "Rain", ...)
    pub condition: String,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
}

impl WeatherSample {
    pub fn validate(&self) -> Result<()> {
        self.coordinate.validate()?;
        validate_temperature(self.temperature_c)?;

        if !self.humidity_pct.is_finite() {
            return Err(EngineError::NonFinite { field: "humidity_pct" });
        }
        if !(0.0..=MAX_HUMIDITY_PCT).contains(&self.humidity_pct) {
            return Err(EngineError::HumidityOutOfRange(self.humidity_pct));
        }

        if !self.wind_speed_ms.is_finite() {
            return Err(EngineError::NonFinite { field: "wind_speed_ms" });
        }
        if !(0.0..=MAX_WIND_SPEED_MS).contains(&self.wind_speed_ms) {
            return Err(EngineError::WindSpeedOutOfRange(self.wind_speed_ms));
        }

        Ok(())
    }
}

/// Reject temperatures that are not physically plausible at ground level
pub fn validate_temperature(temperature_c: f64) -> Result<()> {
    if !temperature_c.is_finite() {
        return Err(EngineError::NonFinite { field: "temperature_c" });
    }
    if !(MIN_PLAUSIBLE_TEMPERATURE_C..=MAX_PLAUSIBLE_TEMPERATURE_C).contains(&temperature_c) {
        return Err(EngineError::TemperatureOutOfRange(temperature_c));
    }
    Ok(())
}

// ============================================================================
// Disease Classification
// ============================================================================

/// Leaf classification result from the image classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseEvent {
    /// Raw classifier label, e.g. "Tomato___Late_blight" or "Tomato___healthy"
    pub label: String,
    pub confidence: f64,
    pub observed_at: DateTime<Utc>,
    /// Reference to the analysed leaf photo
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl DiseaseEvent {
    /// Validate confidence and classify the label
    pub fn validate(&self) -> Result<DiseaseLabel> {
        if !self.confidence.is_finite() {
            return Err(EngineError::NonFinite { field: "confidence" });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(EngineError::ConfidenceOutOfRange(self.confidence));
        }
        DiseaseLabel::parse(&self.label)
    }
}

/// Classifier label reduced to what the fusion rule needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum DiseaseLabel {
    Healthy,
    Diseased(String),
}

impl DiseaseLabel {
    /// Any label mentioning "healthy" is a healthy leaf; "Error" is a classifier failure
    pub fn parse(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(EngineError::EmptyDiseaseLabel);
        }
        if trimmed.eq_ignore_ascii_case("error") {
            return Err(EngineError::ClassifierFailure);
        }
        if trimmed.to_lowercase().contains("healthy") {
            return Ok(DiseaseLabel::Healthy);
        }
        Ok(DiseaseLabel::Diseased(display_name(trimmed)))
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, DiseaseLabel::Healthy)
    }
}

/// "Tomato___Late_blight" → "Late blight"
fn display_name(label: &str) -> String {
    let disease = label.rsplit("___").next().unwrap_or(label);
    let name = disease.replace('_', " ");
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        label.to_string()
    } else {
        name
    }
}

// ============================================================================
// Events
// ============================================================================

/// An input that changes a plant's vitality state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlantEvent {
    Watering { at: DateTime<Utc> },
    EnvironmentSync(WeatherSample),
    DiseaseAnalysis(DiseaseEvent),
}

impl PlantEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PlantEvent::Watering { at } => *at,
            PlantEvent::EnvironmentSync(sample) => sample.observed_at,
            PlantEvent::DiseaseAnalysis(event) => event.observed_at,
        }
    }

    /// Tie-break for events sharing a timestamp: disease, then watering, then environment
    pub fn priority(&self) -> u8 {
        match self {
            PlantEvent::DiseaseAnalysis(_) => 0,
            PlantEvent::Watering { .. } => 1,
            PlantEvent::EnvironmentSync(_) => 2,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PlantEvent::Watering { .. } => "watering",
            PlantEvent::EnvironmentSync(_) => "environment_sync",
            PlantEvent::DiseaseAnalysis(_) => "disease_analysis",
        }
    }
}

/// Sort events into application order (timestamp, then tie-break priority)
pub fn order_events(events: &mut [PlantEvent]) {
    events.sort_by_key(|e| (e.timestamp(), e.priority()));
}
