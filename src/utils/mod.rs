//! Utility modules shared by the vitality curves and the advisory layer
//!
//! - Normalization: domain clamping and duration conversion

pub mod normalization;

pub use normalization::{
    clamp_score, clamp_unit, duration_hours, half_life_factor, hours_to_duration,
};
