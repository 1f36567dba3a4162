//! Vitality Engine - coordinator over the update rules and the advisory
//!
//! Stateless between calls: every operation borrows the caller's state and
//! returns a new one. Events for one plant are applied in timestamp order
//! (disease, watering, environment on ties), each after advancing the state
//! to the event's time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::advisory::{generate_advisory, Advisory};
use crate::care_profiles::{CareProfile, CareProfileRegistry};
use crate::error::{EngineError, Result};
use crate::policy::{EngineConfig, MAX_EVENT_CLOCK_SKEW_SECS};
use crate::vitality::{
    advance, apply_watering, fuse_disease_event, order_events, DiseaseEvent, PlantEvent,
    VitalityState, WeatherSample,
};

/// Result of applying a batch of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOutcome {
    pub state: VitalityState,
    pub advisory: Advisory,
}

/// Engine configuration plus the species registry
#[derive(Debug, Clone, Default)]
pub struct VitalityEngine {
    config: EngineConfig,
    profiles: CareProfileRegistry,
}

impl VitalityEngine {
    pub fn new(config: EngineConfig, profiles: CareProfileRegistry) -> Self {
        Self { config, profiles }
    }

    /// Build from optional config / profile override files
    pub fn from_paths(
        config_path: Option<&Path>,
        profiles_path: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };

        let mut profiles = CareProfileRegistry::builtin();
        if let Some(path) = profiles_path {
            profiles.load_overrides(path)?;
        }

        tracing::info!(
            "Vitality engine ready: {} species profiles, half-life {}h, retention {}",
            profiles.len(),
            config.disease_half_life_hours,
            config.watering_retention
        );

        Ok(Self::new(config, profiles))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profiles(&self) -> &CareProfileRegistry {
        &self.profiles
    }

    pub fn profile(&self, species: &str) -> &CareProfile {
        self.profiles.lookup(species)
    }

    // ========================================================================
    // Single operations
    // ========================================================================

    /// Evolve a state over `elapsed` with an optional temperature sample
    pub fn advance(
        &self,
        state: &VitalityState,
        species: &str,
        elapsed: Duration,
        temperature_c: Option<f64>,
    ) -> Result<VitalityState> {
        advance(state, elapsed, temperature_c, self.profile(species), &self.config)
    }

    /// Advance to `at`, then water
    pub fn water(
        &self,
        state: &VitalityState,
        species: &str,
        at: DateTime<Utc>,
    ) -> Result<VitalityState> {
        let profile = self.profile(species);
        let current = self.advance_to(state, at, profile)?;
        Ok(apply_watering(&current, at, &self.config))
    }

    /// Advance to the sample time, then record the new temperature
    pub fn sync_environment(
        &self,
        state: &VitalityState,
        species: &str,
        sample: &WeatherSample,
    ) -> Result<VitalityState> {
        sample.validate()?;
        let profile = self.profile(species);
        let current = self.advance_to(state, sample.observed_at, profile)?;
        Ok(record_environment(&current, sample))
    }

    /// Advance to the classification time, then fuse the reading
    pub fn fuse_disease(
        &self,
        state: &VitalityState,
        species: &str,
        event: &DiseaseEvent,
    ) -> Result<VitalityState> {
        let profile = self.profile(species);
        let current = self.advance_to(state, event.observed_at, profile)?;
        fuse_disease_event(&current, event, profile)
    }

    /// State evaluated at `now` without applying events
    ///
    /// `now` at or before the last evaluation returns the state as is.
    pub fn project(
        &self,
        state: &VitalityState,
        species: &str,
        now: DateTime<Utc>,
    ) -> Result<VitalityState> {
        if now <= state.updated_at {
            return Ok(state.clone());
        }
        self.advance_to(state, now, self.profile(species))
    }

    pub fn advise(
        &self,
        state: &VitalityState,
        species: &str,
        weather: Option<&WeatherSample>,
    ) -> Advisory {
        generate_advisory(state, self.profile(species), weather)
    }

    // ========================================================================
    // Batches
    // ========================================================================

    /// Apply a batch of events in order and evaluate the result at `now`
    ///
    /// Events up to the clock skew past `now` are accepted; the result is
    /// then evaluated at the latest event instead. The advisory uses the
    /// latest environment sample in the batch, if any. On error nothing is
    /// returned and the caller's state stays as it was.
    pub fn apply(
        &self,
        state: &VitalityState,
        species: &str,
        events: &[PlantEvent],
        now: DateTime<Utc>,
    ) -> Result<EngineOutcome> {
        let profile = self.profile(species);

        if let Err(err) = self.validate_events(events, now) {
            tracing::warn!("Rejected event batch for {}: {}", profile.species, err);
            return Err(err);
        }

        let mut ordered = events.to_vec();
        order_events(&mut ordered);

        let mut current = state.clone();
        let mut latest_weather: Option<&WeatherSample> = None;

        for event in &ordered {
            current = match self.apply_event(&current, event, profile) {
                Ok(next) => next,
                Err(err) => {
                    tracing::warn!(
                        "Rejected {} event at {} for {}: {}",
                        event.kind(),
                        event.timestamp(),
                        profile.species,
                        err
                    );
                    return Err(err);
                }
            };

            if let PlantEvent::EnvironmentSync(sample) = event {
                latest_weather = Some(sample);
            }

            tracing::debug!(
                "Applied {} at {}: health={:.1} water_stress={:.3} disease_risk={:.3}",
                event.kind(),
                event.timestamp(),
                current.health_score,
                current.water_stress,
                current.disease_risk_index
            );
        }

        let evaluate_at = ordered
            .last()
            .map_or(now, |latest| latest.timestamp().max(now));
        let state = self.advance_to(&current, evaluate_at, profile)?;
        let advisory = generate_advisory(&state, profile, latest_weather);

        Ok(EngineOutcome { state, advisory })
    }

    /// Check every event's values and that none is stamped ahead of `now`
    pub fn validate_events(&self, events: &[PlantEvent], now: DateTime<Utc>) -> Result<()> {
        let latest_allowed = now + Duration::seconds(MAX_EVENT_CLOCK_SKEW_SECS);

        for event in events {
            if event.timestamp() > latest_allowed {
                return Err(EngineError::FutureEvent {
                    event_at: event.timestamp(),
                    now,
                });
            }
            match event {
                PlantEvent::EnvironmentSync(sample) => sample.validate()?,
                PlantEvent::DiseaseAnalysis(reading) => {
                    reading.validate()?;
                }
                PlantEvent::Watering { .. } => {}
            }
        }
        Ok(())
    }

    fn apply_event(
        &self,
        state: &VitalityState,
        event: &PlantEvent,
        profile: &CareProfile,
    ) -> Result<VitalityState> {
        let current = self.advance_to(state, event.timestamp(), profile)?;

        match event {
            PlantEvent::Watering { at } => Ok(apply_watering(&current, *at, &self.config)),
            PlantEvent::EnvironmentSync(sample) => Ok(record_environment(&current, sample)),
            PlantEvent::DiseaseAnalysis(reading) => fuse_disease_event(&current, reading, profile),
        }
    }

    /// Advance to an absolute time; earlier than the last evaluation is stale
    fn advance_to(
        &self,
        state: &VitalityState,
        at: DateTime<Utc>,
        profile: &CareProfile,
    ) -> Result<VitalityState> {
        if at < state.updated_at {
            return Err(EngineError::StaleEvent {
                event_at: at,
                state_at: state.updated_at,
            });
        }
        advance(state, at - state.updated_at, None, profile, &self.config)
    }
}

fn record_environment(state: &VitalityState, sample: &WeatherSample) -> VitalityState {
    let mut next = state.clone();
    next.last_environment_sync_at = Some(sample.observed_at);
    next.last_temperature_c = Some(sample.temperature_c);
    next
}
