//! Compound Stress Detector
//!
//! Read-only classifications over a vitality state. Nothing here mutates
//! state; the results only feed the advisory layer.

use crate::policy::{
    HEALTH_CRITICAL_THRESHOLD, HEAT_STRESS_THRESHOLD_C, SYNERGY_DISEASE_RISK_THRESHOLD,
    SYNERGY_WATER_STRESS_THRESHOLD,
};
use crate::vitality::state::{VitalityState, WeatherSample};

/// Health below the critical line
pub fn is_critical(state: &VitalityState) -> bool {
    state.health_score < HEALTH_CRITICAL_THRESHOLD
}

/// Water stress and disease risk both strictly above their synergy lines
pub fn is_synergistic(state: &VitalityState) -> bool {
    stress_pair_is_synergistic(state.water_stress, state.disease_risk_index)
}

/// Synergy test on raw values (also used inside the decay integrator)
#[inline]
pub fn stress_pair_is_synergistic(water_stress: f64, disease_risk: f64) -> bool {
    water_stress > SYNERGY_WATER_STRESS_THRESHOLD && disease_risk > SYNERGY_DISEASE_RISK_THRESHOLD
}

/// Temperature strictly above the heat threshold
#[inline]
pub fn is_heat_stress(temperature_c: f64) -> bool {
    temperature_c > HEAT_STRESS_THRESHOLD_C
}

/// Elevated disease risk under heat stress
pub fn heat_with_disease(state: &VitalityState, weather: Option<&WeatherSample>) -> bool {
    let hot = weather.is_some_and(|w| is_heat_stress(w.temperature_c));
    hot && state.disease_risk_index > SYNERGY_DISEASE_RISK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn state(health: f64, water: f64, risk: f64) -> VitalityState {
        VitalityState {
            health_score: health,
            water_stress: water,
            disease_risk_index: risk,
            ..VitalityState::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        }
    }

    #[test]
    fn test_critical_line_is_exclusive() {
        assert!(is_critical(&state(49.99, 0.0, 0.0)));
        assert!(!is_critical(&state(50.0, 0.0, 0.0)));
    }

    #[test]
    fn test_synergy_boundaries() {
        assert!(is_synergistic(&state(100.0, 0.31, 0.31)));
        assert!(!is_synergistic(&state(100.0, 0.3, 0.9)));
        assert!(!is_synergistic(&state(100.0, 0.9, 0.3)));
        assert!(!is_synergistic(&state(100.0, 0.0, 0.0)));
    }

    #[test]
    fn test_heat_threshold_is_exclusive() {
        assert!(!is_heat_stress(30.0));
        assert!(is_heat_stress(30.1));
    }
}
