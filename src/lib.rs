//! Plant Vitality Engine
//!
//! Per-plant health state maintenance and care advisories.
//!
//! - `vitality/`: state model, decay & update, disease risk fusion, compound stress
//! - `advisory/`: severity, dominant cause, recommendation text, care actions
//! - `care_profiles`: static per-species care metadata
//! - `engine`: ordered event application over a borrowed state
//! - `ledger`: in-memory plant records with per-plant serialized updates
//! - `api_server`: axum HTTP surface (feature `api`)

pub mod policy;
pub mod error;
pub mod utils;
pub mod care_profiles;
pub mod vitality;
pub mod advisory;
pub mod engine;
pub mod ledger;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use advisory::{generate_advisory, Advisory, CareAction, DominantCause, Severity};
pub use care_profiles::{CareProfile, CareProfileRegistry, HeatTolerance, WaterNeed};
pub use engine::{EngineOutcome, VitalityEngine};
pub use error::{EngineError, Result};
pub use ledger::{GrowthLogEntry, NewPlant, PlantLedger, PlantRecord, WateringReminder};
pub use policy::EngineConfig;
pub use vitality::{
    is_critical, is_synergistic, Coordinate, DiseaseEvent, DiseaseLabel, PlantEvent,
    VitalityState, WeatherSample,
};
