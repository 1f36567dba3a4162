//! Decay & Update Function
//!
//! Evolves a vitality state across elapsed time:
//!
//! 1. **Water stress** accrues linearly with dry time at a rate set by the
//!    species' water need, accelerated above the heat threshold.
//! 2. **Disease risk** decays with a fixed half-life.
//! 3. **Health** loses points in proportion to the average stress and risk
//!    over each slice (amplified while both are synergistic) and regrows
//!    when both are low, faster inside the post-watering recovery window.
//!
//! Time is integrated in fixed slices (`integration_step_minutes`) so that
//! advancing 10 days at once and advancing one hour at a time agree.

use chrono::{DateTime, Duration, Utc};

use crate::care_profiles::{CareProfile, HeatTolerance};
use crate::error::{EngineError, Result};
use crate::policy::{EngineConfig, HEAT_FACTOR_SPAN_C, HEAT_STRESS_THRESHOLD_C};
use crate::utils::{clamp_score, clamp_unit, duration_hours, hours_to_duration};
use crate::vitality::compound_stress::stress_pair_is_synergistic;
use crate::vitality::disease_risk::decay_risk;
use crate::vitality::state::{validate_temperature, VitalityState};

/// Advance a state by `elapsed`
///
/// `temperature_c` overrides the last synced temperature for this interval
/// only. Zero elapsed time returns the state unchanged.
pub fn advance(
    state: &VitalityState,
    elapsed: Duration,
    temperature_c: Option<f64>,
    profile: &CareProfile,
    config: &EngineConfig,
) -> Result<VitalityState> {
    if elapsed < Duration::zero() {
        return Err(EngineError::NegativeElapsed {
            millis: elapsed.num_milliseconds(),
        });
    }
    if let Some(t) = temperature_c {
        validate_temperature(t)?;
    }

    if elapsed == Duration::zero() {
        return Ok(state.clone());
    }

    let temperature = temperature_c.or(state.last_temperature_c);
    let step_ms = config.integration_step_minutes.max(1) * 60_000;

    let mut next = state.clone();
    let mut cursor = state.updated_at;
    let mut remaining_ms = elapsed.num_milliseconds();

    while remaining_ms > 0 {
        let slice = Duration::milliseconds(remaining_ms.min(step_ms));
        integrate_slice(&mut next, cursor, slice, temperature, profile, config);
        cursor += slice;
        remaining_ms -= slice.num_milliseconds();
    }

    next.updated_at = state.updated_at + elapsed;
    Ok(next)
}

/// Advance one slice in place
fn integrate_slice(
    state: &mut VitalityState,
    slice_start: DateTime<Utc>,
    slice: Duration,
    temperature_c: Option<f64>,
    profile: &CareProfile,
    config: &EngineConfig,
) {
    let hours = duration_hours(slice);
    let days = hours / 24.0;

    let stress_start = state.water_stress;
    let accrual = config.accrual_per_day(profile.water_need)
        * heat_multiplier(temperature_c, profile.heat_tolerance, config);
    let stress_end = clamp_unit(stress_start + accrual * days);

    let risk_start = state.disease_risk_index;
    let risk_end = decay_risk(risk_start, hours, config.disease_half_life_hours);

    // Trapezoid averages over the slice
    let stress_avg = (stress_start + stress_end) / 2.0;
    let risk_avg = (risk_start + risk_end) / 2.0;

    let mut decline =
        config.water_decline_per_day * stress_avg + config.disease_decline_per_day * risk_avg;
    if stress_pair_is_synergistic(stress_avg, risk_avg) {
        decline *= config.synergy_multiplier;
    }

    let regrowth = if stress_avg <= config.regrowth_ceiling && risk_avg <= config.regrowth_ceiling {
        let boost = if in_recovery_window(state, slice_start, config) {
            config.recovery_multiplier
        } else {
            1.0
        };
        config.regrowth_per_day * boost
    } else {
        0.0
    };

    state.health_score = clamp_score(state.health_score + (regrowth - decline) * days);
    state.water_stress = stress_end;
    state.disease_risk_index = risk_end;
}

/// Accrual multiplier for a temperature; 1.0 at or below the heat threshold
pub fn heat_multiplier(
    temperature_c: Option<f64>,
    tolerance: HeatTolerance,
    config: &EngineConfig,
) -> f64 {
    match temperature_c {
        Some(t) if t > HEAT_STRESS_THRESHOLD_C => {
            let excess = (t - HEAT_STRESS_THRESHOLD_C) / HEAT_FACTOR_SPAN_C;
            1.0 + config.heat_acceleration_for(tolerance) * excess
        }
        _ => 1.0,
    }
}

/// True while `at` falls inside the recovery window after the last watering
pub fn in_recovery_window(state: &VitalityState, at: DateTime<Utc>, config: &EngineConfig) -> bool {
    match state.last_watered_at {
        Some(watered_at) => {
            at >= watered_at && at - watered_at < hours_to_duration(config.recovery_window_hours)
        }
        None => false,
    }
}

/// Watering: stress drops to the retained fraction and the recovery window opens
///
/// The state must already be evaluated up to `at`.
pub fn apply_watering(state: &VitalityState, at: DateTime<Utc>, config: &EngineConfig) -> VitalityState {
    let mut next = state.clone();
    next.water_stress = clamp_unit(state.water_stress * config.watering_retention);
    next.last_watered_at = Some(at);
    next
}
