//! Vitality state model and its update rules
//!
//! - `state`: the per-plant record and the external inputs
//! - `decay`: time-based stress, risk and health evolution, watering
//! - `disease_risk`: classification fusion and risk decay
//! - `compound_stress`: read-only critical / synergy classification

pub mod state;
pub mod decay;
pub mod disease_risk;
pub mod compound_stress;

pub use state::{
    order_events, Coordinate, DiseaseEvent, DiseaseLabel, PlantEvent, VitalityState,
    WeatherSample,
};
pub use decay::{advance, apply_watering, heat_multiplier, in_recovery_window};
pub use disease_risk::{combine_diseased, decay_risk, fuse_disease_event, pull_healthy};
pub use compound_stress::{heat_with_disease, is_critical, is_heat_stress, is_synergistic};
