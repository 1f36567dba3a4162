//! Advisory Generator
//!
//! Pure function of (state, care profile, optional weather sample):
//!
//! - **Severity**: critical below 50 health or when elevated disease risk
//!   meets heat; warning below 80 health or when any single factor exceeds
//!   0.3; normal otherwise.
//! - **Dominant cause**: compound when water stress and disease risk are
//!   both synergistic, else the strictly largest of disease / water / heat,
//!   ties resolved in that order.
//! - **Text**: one template per (severity, cause), see `templates`.

use chrono::{DateTime, Utc};

use super::templates::{emergency_plan, heat_action, routine_care, synthesize_text};
use super::types::{Advisory, CareAction, DominantCause, Severity, StressFactors};
use crate::care_profiles::{CareProfile, HeatTolerance};
use crate::policy::{
    heat_sensitivity, FACTOR_WARNING_THRESHOLD, HEALTH_WARNING_THRESHOLD, HEAT_FACTOR_SPAN_C,
    HEAT_STRESS_THRESHOLD_C,
};
use crate::utils::clamp_unit;
use crate::vitality::compound_stress::{
    heat_with_disease, is_critical, is_heat_stress, stress_pair_is_synergistic,
};
use crate::vitality::state::{VitalityState, WeatherSample};

/// Build the advisory for a plant
pub fn generate_advisory(
    state: &VitalityState,
    profile: &CareProfile,
    weather: Option<&WeatherSample>,
) -> Advisory {
    let factors = stress_factors(state, profile, weather);
    let severity = classify_severity(state, &factors, weather);
    let dominant_cause = dominant_cause(&factors);
    let synergistic = stress_pair_is_synergistic(factors.water, factors.disease);
    let heat_stress = weather.map(|w| is_heat_stress(w.temperature_c));

    let next_watering_at = next_watering_at(state, profile);
    let watering_overdue = state.updated_at >= next_watering_at;

    let actions = build_actions(
        severity,
        dominant_cause,
        synergistic,
        heat_stress.unwrap_or(false),
        watering_overdue,
        next_watering_at,
        profile,
    );

    Advisory {
        severity,
        dominant_cause,
        text: synthesize_text(severity, dominant_cause, profile),
        profile: profile.clone(),
        factors,
        heat_stress,
        synergistic,
        critical: is_critical(state),
        actions,
        next_watering_at,
        watering_overdue,
    }
}

// ============================================================================
// Factors
// ============================================================================

/// Normalised stress factors for a state and optional weather sample
pub fn stress_factors(
    state: &VitalityState,
    profile: &CareProfile,
    weather: Option<&WeatherSample>,
) -> StressFactors {
    StressFactors {
        water: state.water_stress,
        disease: state.disease_risk_index,
        heat: weather.map(|w| heat_factor(w.temperature_c, profile.heat_tolerance)),
    }
}

/// Heat factor in [0, 1]: 0 at or below 30 °C, rising over the next 10 °C
///
/// Low-tolerance species saturate sooner, high-tolerance ones later.
pub fn heat_factor(temperature_c: f64, tolerance: HeatTolerance) -> f64 {
    if temperature_c <= HEAT_STRESS_THRESHOLD_C {
        return 0.0;
    }
    clamp_unit(
        (temperature_c - HEAT_STRESS_THRESHOLD_C) / HEAT_FACTOR_SPAN_C * heat_sensitivity(tolerance),
    )
}

// ============================================================================
// Severity & cause
// ============================================================================

/// Three-tier severity
pub fn classify_severity(
    state: &VitalityState,
    factors: &StressFactors,
    weather: Option<&WeatherSample>,
) -> Severity {
    if is_critical(state) || heat_with_disease(state, weather) {
        return Severity::Critical;
    }

    let factor_elevated = factors.water > FACTOR_WARNING_THRESHOLD
        || factors.disease > FACTOR_WARNING_THRESHOLD
        || factors.heat.is_some_and(|h| h > FACTOR_WARNING_THRESHOLD);

    if state.health_score < HEALTH_WARNING_THRESHOLD || factor_elevated {
        Severity::Warning
    } else {
        Severity::Normal
    }
}

/// Dominant cause; `None` only when every factor is zero
pub fn dominant_cause(factors: &StressFactors) -> DominantCause {
    if stress_pair_is_synergistic(factors.water, factors.disease) {
        return DominantCause::Compound;
    }

    // Precedence order: an equal later candidate never displaces an earlier one
    let candidates = [
        (DominantCause::Disease, factors.disease),
        (DominantCause::Water, factors.water),
        (DominantCause::Heat, factors.heat.unwrap_or(0.0)),
    ];

    let mut best = (DominantCause::None, 0.0);
    for (cause, value) in candidates {
        if value > best.1 {
            best = (cause, value);
        }
    }
    best.0
}

// ============================================================================
// Watering reminder & actions
// ============================================================================

/// Next watering due date from the profile's interval
pub fn next_watering_at(state: &VitalityState, profile: &CareProfile) -> DateTime<Utc> {
    state.dry_since() + profile.water_need.watering_interval()
}

fn build_actions(
    severity: Severity,
    cause: DominantCause,
    synergistic: bool,
    heat_stress: bool,
    watering_overdue: bool,
    next_watering_at: DateTime<Utc>,
    profile: &CareProfile,
) -> Vec<CareAction> {
    let mut actions = Vec::new();

    if synergistic {
        actions.push(CareAction::new(
            "disease",
            "Compound stress",
            "Disease risk and water stress are both elevated; the combination accelerates decline",
        ));
    }

    if severity == Severity::Critical {
        actions.extend(emergency_plan(cause));
    } else {
        actions.extend(routine_care(profile));
    }

    if heat_stress {
        actions.push(heat_action(profile));
    }

    let schedule = if watering_overdue {
        format!("Watering overdue since {}", next_watering_at.format("%Y-%m-%d %H:%M UTC"))
    } else {
        format!("Next watering due {}", next_watering_at.format("%Y-%m-%d %H:%M UTC"))
    };
    actions.push(CareAction::new("schedule", "Reminder", &schedule));

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::care_profiles::CareProfileRegistry;
    use crate::vitality::state::Coordinate;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap()
    }

    fn state(health: f64, water: f64, risk: f64) -> VitalityState {
        VitalityState {
            health_score: health,
            water_stress: water,
            disease_risk_index: risk,
            ..VitalityState::new(t0())
        }
    }

    fn weather(temperature_c: f64) -> WeatherSample {
        WeatherSample {
            coordinate: Coordinate {
                latitude: 1.35,
                longitude: 103.82,
            },
            observed_at: t0(),
            temperature_c,
            condition: "Clear".to_string(),
            humidity_pct: 70.0,
            wind_speed_ms: 2.5,
        }
    }

    #[test]
    fn test_fresh_plant_is_normal() {
        let registry = CareProfileRegistry::builtin();
        let advisory = generate_advisory(&state(100.0, 0.0, 0.0), registry.lookup("Tomato"), None);

        assert_eq!(advisory.severity, Severity::Normal);
        assert_eq!(advisory.dominant_cause, DominantCause::None);
        assert_eq!(advisory.heat_stress, None);
        assert!(!advisory.critical);
        assert!(!advisory.watering_overdue);
    }

    #[test]
    fn test_severity_health_boundaries() {
        let registry = CareProfileRegistry::builtin();
        let profile = registry.lookup("Potato");

        let sev = |h: f64| generate_advisory(&state(h, 0.0, 0.0), profile, None).severity;
        assert_eq!(sev(49.9), Severity::Critical);
        assert_eq!(sev(50.0), Severity::Warning);
        assert_eq!(sev(79.9), Severity::Warning);
        assert_eq!(sev(80.0), Severity::Normal);
    }

    #[test]
    fn test_single_factor_warning() {
        let registry = CareProfileRegistry::builtin();
        let profile = registry.lookup("Tomato");

        let advisory = generate_advisory(&state(95.0, 0.31, 0.0), profile, None);
        assert_eq!(advisory.severity, Severity::Warning);
        assert_eq!(advisory.dominant_cause, DominantCause::Water);

        let advisory = generate_advisory(&state(95.0, 0.3, 0.0), profile, None);
        assert_eq!(advisory.severity, Severity::Normal);
    }

    #[test]
    fn test_heat_with_disease_is_critical() {
        let registry = CareProfileRegistry::builtin();
        let profile = registry.lookup("Tomato");
        let hot = weather(34.0);

        let advisory = generate_advisory(&state(90.0, 0.0, 0.35), profile, Some(&hot));
        assert_eq!(advisory.severity, Severity::Critical);
        assert!(!advisory.critical);
    }

    #[test]
    fn test_heat_dominates_low_stress() {
        let registry = CareProfileRegistry::builtin();
        let profile = registry.lookup("Tomato");
        let hot = weather(35.0);

        let advisory = generate_advisory(&state(100.0, 0.1, 0.0), profile, Some(&hot));
        assert_eq!(advisory.heat_stress, Some(true));
        assert_eq!(advisory.dominant_cause, DominantCause::Heat);
        assert_eq!(advisory.severity, Severity::Warning);
        assert!(advisory.actions.iter().any(|a| a.category == "heat"));
    }

    #[test]
    fn test_cool_weather_flag_is_false() {
        let registry = CareProfileRegistry::builtin();
        let advisory = generate_advisory(
            &state(100.0, 0.0, 0.0),
            registry.lookup("Tomato"),
            Some(&weather(30.0)),
        );
        assert_eq!(advisory.heat_stress, Some(false));
        assert_eq!(advisory.factors.heat, Some(0.0));
    }

    #[test]
    fn test_heat_factor_by_tolerance() {
        assert_relative_eq!(heat_factor(35.0, HeatTolerance::Medium), 0.5, epsilon = 1e-12);
        assert_relative_eq!(heat_factor(35.0, HeatTolerance::Low), 0.75, epsilon = 1e-12);
        assert_relative_eq!(heat_factor(35.0, HeatTolerance::High), 0.25, epsilon = 1e-12);
        assert_eq!(heat_factor(55.0, HeatTolerance::Low), 1.0);
        assert_eq!(heat_factor(12.0, HeatTolerance::Low), 0.0);
    }

    #[test]
    fn test_dominant_cause_ties() {
        let tie_all = StressFactors {
            water: 0.2,
            disease: 0.2,
            heat: Some(0.2),
        };
        assert_eq!(dominant_cause(&tie_all), DominantCause::Disease);

        let water_heat = StressFactors {
            water: 0.25,
            disease: 0.1,
            heat: Some(0.25),
        };
        assert_eq!(dominant_cause(&water_heat), DominantCause::Water);

        let compound = StressFactors {
            water: 0.31,
            disease: 0.31,
            heat: Some(0.9),
        };
        assert_eq!(dominant_cause(&compound), DominantCause::Compound);
    }

    #[test]
    fn test_critical_actions_follow_recovery_plan() {
        let registry = CareProfileRegistry::builtin();
        let profile = registry.lookup("Tomato");

        let advisory = generate_advisory(&state(30.0, 0.4, 0.35), profile, None);
        assert_eq!(advisory.severity, Severity::Critical);
        assert_eq!(advisory.dominant_cause, DominantCause::Compound);
        assert!(advisory.synergistic);

        let titles: Vec<&str> = advisory.actions.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Compound stress", "Isolate", "Prune", "Hydrate", "Treat", "Reminder"]
        );
    }

    #[test]
    fn test_watering_reminder() {
        let registry = CareProfileRegistry::builtin();
        let profile = registry.lookup("Tomato");

        let mut s = state(100.0, 0.0, 0.0);
        s.last_watered_at = Some(t0());
        s.updated_at = t0() + Duration::days(2);
        let advisory = generate_advisory(&s, profile, None);
        assert_eq!(advisory.next_watering_at, t0() + Duration::days(3));
        assert!(!advisory.watering_overdue);

        s.updated_at = t0() + Duration::days(3);
        let advisory = generate_advisory(&s, profile, None);
        assert!(advisory.watering_overdue);
    }

    #[test]
    fn test_same_inputs_same_text() {
        let registry = CareProfileRegistry::builtin();
        let profile = registry.lookup("Strawberry");
        let a = generate_advisory(&state(70.0, 0.5, 0.0), profile, None);
        let b = generate_advisory(&state(65.0, 0.45, 0.1), profile, None);

        assert_eq!(a.severity, b.severity);
        assert_eq!(a.dominant_cause, b.dominant_cause);
        assert_eq!(a.text, b.text);
    }
}
