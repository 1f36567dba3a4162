//! Disease Risk Fusion
//!
//! Folds leaf classification results into the disease risk index.
//!
//! **Diseased reading** (confidence c): noisy-OR with the prior,
//!   r' = 1 - (1 - r)(1 - c)
//! so r' >= max(r, c). A weak diseased reading never erases a strong one.
//!
//! **Healthy reading** (confidence c, n-th in a row): r' = r · (1 - c · (1 - 2^-n)).
//! The first healthy reading after a diseased one only counts when its
//! confidence exceeds the current risk, so a single noisy reclassification
//! cannot wipe out an established diagnosis. A run of healthy readings pulls
//! harder with each repeat.
//!
//! Without readings the index decays with a bounded half-life (see
//! [`decay_risk`]); the decay integrator applies it between events.

use crate::care_profiles::CareProfile;
use crate::error::{EngineError, Result};
use crate::utils::{clamp_unit, half_life_factor};
use crate::vitality::state::{DiseaseEvent, DiseaseLabel, VitalityState};

/// Apply one classification result to the state
///
/// Species without the disease-analysis capability are rejected rather than
/// fused, so their index stays at its initial 0.
pub fn fuse_disease_event(
    state: &VitalityState,
    event: &DiseaseEvent,
    profile: &CareProfile,
) -> Result<VitalityState> {
    if !profile.supports_disease_analysis {
        return Err(EngineError::UnsupportedSpecies(profile.species.clone()));
    }

    let label = event.validate()?;
    let mut next = state.clone();

    match label {
        DiseaseLabel::Healthy => {
            next.healthy_streak = state.healthy_streak.saturating_add(1);
            next.disease_risk_index = pull_healthy(
                state.disease_risk_index,
                event.confidence,
                next.healthy_streak,
            );
        }
        DiseaseLabel::Diseased(_) => {
            next.healthy_streak = 0;
            next.disease_risk_index = combine_diseased(state.disease_risk_index, event.confidence);
        }
    }

    next.last_disease_event_at = Some(event.observed_at);
    Ok(next)
}

/// Noisy-OR combination of a prior risk and a diseased reading
#[inline]
pub fn combine_diseased(prior: f64, confidence: f64) -> f64 {
    clamp_unit(1.0 - (1.0 - prior) * (1.0 - confidence))
}

/// Risk after the `streak`-th consecutive healthy reading
pub fn pull_healthy(prior: f64, confidence: f64, streak: u32) -> f64 {
    // Lone healthy reading weaker than the current belief: ignore
    if streak <= 1 && confidence <= prior {
        return prior;
    }

    let streak_weight = 1.0 - libm::exp2(-(streak.max(1) as f64));
    clamp_unit(prior * (1.0 - confidence * streak_weight))
}

/// Risk after `hours` without readings
#[inline]
pub fn decay_risk(risk: f64, hours: f64, half_life_hours: f64) -> f64 {
    clamp_unit(risk * half_life_factor(hours, half_life_hours))
}
