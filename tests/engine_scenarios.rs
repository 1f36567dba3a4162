//! Engine Scenario Tests
//!
//! End-to-end behaviour of the vitality engine: the reference scenarios
//! (unwatered plant, watering a critical plant, disease fusion, compound
//! stress, heat) plus seeded property checks over random states and events.
//!
//! Run with: cargo test --test engine_scenarios

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};
use plant_vitality_rust::advisory::{DominantCause, Severity};
use plant_vitality_rust::{
    is_synergistic, Coordinate, DiseaseEvent, EngineError, PlantEvent, VitalityEngine,
    VitalityState, WeatherSample,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn state(health: f64, water: f64, risk: f64) -> VitalityState {
    VitalityState {
        health_score: health,
        water_stress: water,
        disease_risk_index: risk,
        ..VitalityState::new(t0())
    }
}

fn weather(at: DateTime<Utc>, temperature_c: f64) -> WeatherSample {
    WeatherSample {
        coordinate: Coordinate {
            latitude: 34.05,
            longitude: -118.24,
        },
        observed_at: at,
        temperature_c,
        condition: "Clear".to_string(),
        humidity_pct: 35.0,
        wind_speed_ms: 3.2,
    }
}

fn reading(label: &str, confidence: f64, at: DateTime<Utc>) -> DiseaseEvent {
    DiseaseEvent {
        label: label.to_string(),
        confidence,
        observed_at: at,
        image_ref: Some("uploads/leaf.jpg".to_string()),
    }
}

// ============================================================================
// Scenario A: fresh plant, 10 days without water at 25°C
// ============================================================================

#[test]
fn test_unwatered_plant_declines_into_warning() {
    let engine = VitalityEngine::default();
    let mut current = VitalityState::new(t0());
    current.last_temperature_c = Some(25.0);

    let mut first_non_normal: Option<(u32, Severity)> = None;
    let mut first_below_80: Option<u32> = None;
    let mut previous_stress = current.water_stress;

    assert_eq!(engine.advise(&current, "Tomato", None).severity, Severity::Normal);

    for hour in 1..=(10 * 24) {
        current = engine
            .advance(&current, "Tomato", Duration::hours(1), Some(25.0))
            .unwrap();
        assert!(current.water_stress >= previous_stress);
        previous_stress = current.water_stress;

        let severity = engine.advise(&current, "Tomato", None).severity;
        if severity != Severity::Normal && first_non_normal.is_none() {
            first_non_normal = Some((hour, severity));
        }
        if current.health_score < 80.0 && first_below_80.is_none() {
            first_below_80 = Some(hour);
        }
    }

    assert!(current.water_stress > 0.9);
    assert!(current.health_score < 80.0);
    assert_eq!(current.updated_at, t0() + Duration::days(10));

    // Normal steps to warning exactly when health first drops below 80
    let (hour, severity) = first_non_normal.unwrap();
    assert_eq!(severity, Severity::Warning);
    assert_eq!(Some(hour), first_below_80);
}

#[test]
fn test_unwatered_plant_is_normal_for_the_first_days() {
    let engine = VitalityEngine::default();
    let start = VitalityState::new(t0());

    let day_two = engine
        .advance(&start, "Tomato", Duration::days(2), Some(25.0))
        .unwrap();
    let advisory = engine.advise(&day_two, "Tomato", None);

    assert_eq!(advisory.severity, Severity::Normal);
    assert!(day_two.health_score < 100.0);
    assert!(day_two.health_score > 80.0);
    assert_relative_eq!(day_two.water_stress, 0.2, epsilon = 1e-9);
}

// ============================================================================
// Scenario B: watering a critical plant
// ============================================================================

#[test]
fn test_watering_critical_plant_shifts_cause_away_from_water() {
    let engine = VitalityEngine::default();
    let before = state(40.0, 0.6, 0.1);

    let advisory_before = engine.advise(&before, "Tomato", None);
    assert_eq!(advisory_before.severity, Severity::Critical);
    assert_eq!(advisory_before.dominant_cause, DominantCause::Water);

    let after = engine.water(&before, "Tomato", before.updated_at).unwrap();
    assert!(after.water_stress < 0.6);
    assert_relative_eq!(after.water_stress, 0.09, epsilon = 1e-12);
    assert_eq!(after.health_score, before.health_score);

    let advisory_after = engine.advise(&after, "Tomato", None);
    assert_eq!(advisory_after.severity, Severity::Critical);
    assert_ne!(advisory_after.dominant_cause, DominantCause::Water);
    assert_eq!(advisory_after.dominant_cause, DominantCause::Disease);
}

// ============================================================================
// Scenario C: disease fusion is resistant to one noisy healthy reading
// ============================================================================

#[test]
fn test_noisy_healthy_reading_does_not_erase_diagnosis() {
    let engine = VitalityEngine::default();
    let half_life = engine.config().disease_half_life_hours;
    let start = state(100.0, 0.0, 0.05);

    let diseased = engine
        .fuse_disease(&start, "Tomato", &reading("Tomato___Late_blight", 0.9, t0()))
        .unwrap();
    assert!(diseased.disease_risk_index >= 0.9);
    assert!(diseased.disease_risk_index >= start.disease_risk_index);

    let one_hour = t0() + Duration::hours(1);
    let after_healthy = engine
        .fuse_disease(&diseased, "Tomato", &reading("Tomato___healthy", 0.2, one_hour))
        .unwrap();

    let floor = 0.9 * libm::exp2(-1.0 / half_life);
    assert!(
        after_healthy.disease_risk_index >= floor,
        "risk {} fell below single-reading floor {}",
        after_healthy.disease_risk_index,
        floor
    );
    assert_eq!(after_healthy.last_disease_event_at, Some(one_hour));
}

#[test]
fn test_persistent_healthy_readings_clear_risk() {
    let engine = VitalityEngine::default();
    let mut current = engine
        .fuse_disease(
            &state(100.0, 0.0, 0.0),
            "Tomato",
            &reading("Tomato___Bacterial_spot", 0.8, t0()),
        )
        .unwrap();
    let peak = current.disease_risk_index;

    for day in 1..=5 {
        current = engine
            .fuse_disease(
                &current,
                "Tomato",
                &reading("Tomato___healthy", 0.9, t0() + Duration::days(day)),
            )
            .unwrap();
    }

    assert!(current.disease_risk_index < peak * 0.1);
}

#[test]
fn test_unsupported_species_risk_stays_zero() {
    let engine = VitalityEngine::default();
    let start = VitalityState::new(t0());

    let later = engine
        .advance(&start, "Blueberry", Duration::days(30), Some(28.0))
        .unwrap();
    assert_eq!(later.disease_risk_index, 0.0);
    assert!(later.is_within_domains());

    let err = engine
        .fuse_disease(&later, "Blueberry", &reading("Blueberry___healthy", 0.99, later.updated_at))
        .unwrap_err();
    assert_eq!(err, EngineError::UnsupportedSpecies("Blueberry".to_string()));
}

// ============================================================================
// Scenario D: compound stress
// ============================================================================

#[test]
fn test_compound_stress_cause_and_severity() {
    let engine = VitalityEngine::default();

    let healthy_enough = state(60.0, 0.4, 0.35);
    assert!(is_synergistic(&healthy_enough));
    let advisory = engine.advise(&healthy_enough, "Tomato", None);
    assert_eq!(advisory.dominant_cause, DominantCause::Compound);
    assert_eq!(advisory.severity, Severity::Warning);
    assert!(advisory.synergistic);

    let failing = state(45.0, 0.4, 0.35);
    let advisory = engine.advise(&failing, "Tomato", None);
    assert_eq!(advisory.dominant_cause, DominantCause::Compound);
    assert_eq!(advisory.severity, Severity::Critical);
}

#[test]
fn test_synergy_accelerates_decline() {
    let engine = VitalityEngine::default();
    let compound = state(90.0, 0.5, 0.5);
    let water_only = state(90.0, 0.5, 0.0);

    let a = engine.advance(&compound, "Tomato", Duration::days(1), None).unwrap();
    let b = engine.advance(&water_only, "Tomato", Duration::days(1), None).unwrap();

    let compound_loss = compound.health_score - a.health_score;
    let water_loss = water_only.health_score - b.health_score;
    assert!(compound_loss > water_loss);
}

// ============================================================================
// Scenario E: heat
// ============================================================================

#[test]
fn test_heat_becomes_dominant_cause() {
    let engine = VitalityEngine::default();
    let hot = weather(t0(), 35.0);

    let advisory = engine.advise(&state(100.0, 0.1, 0.0), "Tomato", Some(&hot));
    assert_eq!(advisory.heat_stress, Some(true));
    assert_eq!(advisory.dominant_cause, DominantCause::Heat);
}

#[test]
fn test_heat_flag_absent_without_weather() {
    let engine = VitalityEngine::default();
    let advisory = engine.advise(&state(100.0, 0.1, 0.0), "Tomato", None);
    assert_eq!(advisory.heat_stress, None);
    assert_eq!(advisory.dominant_cause, DominantCause::Water);
}

// ============================================================================
// Properties
// ============================================================================

fn random_state(rng: &mut StdRng) -> VitalityState {
    let mut s = state(
        rng.gen_range(0.0..=100.0),
        rng.gen_range(0.0..=1.0),
        rng.gen_range(0.0..=1.0),
    );
    if rng.gen_bool(0.5) {
        s.last_watered_at = Some(t0() - Duration::hours(rng.gen_range(0..200)));
    }
    if rng.gen_bool(0.5) {
        s.last_temperature_c = Some(rng.gen_range(-10.0..45.0));
    }
    s
}

fn random_species(rng: &mut StdRng) -> &'static str {
    const SPECIES: &[&str] = &["Tomato", "Potato", "Blueberry", "Corn (Maize)", "Orange", "Fern"];
    SPECIES[rng.gen_range(0..SPECIES.len())]
}

#[test]
fn test_scores_stay_in_domain_after_advance() {
    let engine = VitalityEngine::default();
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let s = random_state(&mut rng);
        let species = random_species(&mut rng);
        let elapsed = Duration::minutes(rng.gen_range(0..60 * 24 * 30));
        let temperature = if rng.gen_bool(0.5) {
            Some(rng.gen_range(-20.0..55.0))
        } else {
            None
        };

        let next = engine.advance(&s, species, elapsed, temperature).unwrap();
        assert!(next.is_within_domains(), "out of domain: {:?}", next);
    }
}

#[test]
fn test_zero_elapsed_is_identity() {
    let engine = VitalityEngine::default();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..200 {
        let s = random_state(&mut rng);
        let species = random_species(&mut rng);
        let next = engine.advance(&s, species, Duration::zero(), None).unwrap();
        assert_eq!(next, s);

        let outcome = engine.apply(&s, species, &[], s.updated_at).unwrap();
        assert_eq!(outcome.state, s);
    }
}

#[test]
fn test_water_stress_monotone_in_elapsed_time() {
    let engine = VitalityEngine::default();
    let mut rng = StdRng::seed_from_u64(13);

    for _ in 0..200 {
        let s = random_state(&mut rng);
        let species = random_species(&mut rng);
        let short = Duration::minutes(rng.gen_range(0..60 * 24 * 10));
        let long = short + Duration::minutes(rng.gen_range(0..60 * 24 * 10));

        let a = engine.advance(&s, species, short, None).unwrap();
        let b = engine.advance(&s, species, long, None).unwrap();
        assert!(b.water_stress >= a.water_stress);
        assert!(a.water_stress >= s.water_stress);
    }
}

#[test]
fn test_watering_strictly_lowers_stress() {
    let engine = VitalityEngine::default();
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..200 {
        let mut s = random_state(&mut rng);
        s.water_stress = rng.gen_range(0.001..=1.0);
        let species = random_species(&mut rng);

        let watered = engine.water(&s, species, s.updated_at).unwrap();
        assert!(watered.water_stress < s.water_stress);
        assert_eq!(watered.last_watered_at, Some(s.updated_at));
    }
}

#[test]
fn test_synergy_boundaries_exact() {
    for &(water, risk, expected) in &[
        (0.3, 0.3, false),
        (0.30001, 0.3, false),
        (0.3, 0.30001, false),
        (0.30001, 0.30001, true),
        (1.0, 1.0, true),
        (0.0, 1.0, false),
    ] {
        assert_eq!(is_synergistic(&state(100.0, water, risk)), expected, "{} {}", water, risk);
    }
}

#[test]
fn test_random_event_batches_stay_in_domain() {
    let engine = VitalityEngine::default();
    let mut rng = StdRng::seed_from_u64(23);

    for _ in 0..100 {
        let start = random_state(&mut rng);
        let mut events = Vec::new();
        for _ in 0..rng.gen_range(0..12) {
            let at = t0() + Duration::minutes(rng.gen_range(0..60 * 24 * 14));
            let event = match rng.gen_range(0..3) {
                0 => PlantEvent::Watering { at },
                1 => PlantEvent::EnvironmentSync(weather(at, rng.gen_range(-5.0..45.0))),
                _ => {
                    let label = if rng.gen_bool(0.5) {
                        "Tomato___healthy"
                    } else {
                        "Tomato___Early_blight"
                    };
                    PlantEvent::DiseaseAnalysis(reading(label, rng.gen_range(0.0..=1.0), at))
                }
            };
            events.push(event);
        }

        let outcome = engine
            .apply(&start, "Tomato", &events, t0() + Duration::days(15))
            .unwrap();
        assert!(outcome.state.is_within_domains());
        assert_eq!(outcome.state.updated_at, t0() + Duration::days(15));
    }
}

#[test]
fn test_event_order_does_not_depend_on_arrival() {
    let engine = VitalityEngine::default();
    let mut rng = StdRng::seed_from_u64(29);

    let mut events = vec![
        PlantEvent::Watering {
            at: t0() + Duration::hours(30),
        },
        PlantEvent::EnvironmentSync(weather(t0() + Duration::hours(10), 33.0)),
        PlantEvent::DiseaseAnalysis(reading("Tomato___Leaf_Mold", 0.6, t0() + Duration::hours(30))),
        PlantEvent::DiseaseAnalysis(reading("Tomato___healthy", 0.95, t0() + Duration::hours(50))),
    ];
    let now = t0() + Duration::days(3);
    let reference = engine
        .apply(&VitalityState::new(t0()), "Tomato", &events, now)
        .unwrap();

    for _ in 0..20 {
        // Fisher-Yates shuffle
        for i in (1..events.len()).rev() {
            let j = rng.gen_range(0..=i);
            events.swap(i, j);
        }
        let shuffled = engine
            .apply(&VitalityState::new(t0()), "Tomato", &events, now)
            .unwrap();
        assert_eq!(shuffled.state, reference.state);
    }
}
