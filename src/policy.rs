//! Policy Constants and Engine Configuration
//!
//! The severity and synergy lines are fixed policy: the compound stress
//! detector, the advisory generator and the presentation layer all read the
//! same values, so they live here and nowhere else.
//!
//! The shape of the decay curves (accrual rates, half-life, regrowth) is
//! tunable and loaded from JSON via [`EngineConfig::load`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::care_profiles::{HeatTolerance, WaterNeed};

// ============================================================================
// Fixed Policy Thresholds
// ============================================================================

/// Health below this line is critical (UI "Emergency Recovery Plan").
pub const HEALTH_CRITICAL_THRESHOLD: f64 = 50.0;

/// Health below this line (and not critical) is a warning.
pub const HEALTH_WARNING_THRESHOLD: f64 = 80.0;

/// Water stress must strictly exceed this for synergistic stress.
pub const SYNERGY_WATER_STRESS_THRESHOLD: f64 = 0.3;

/// Disease risk must strictly exceed this for synergistic stress.
pub const SYNERGY_DISEASE_RISK_THRESHOLD: f64 = 0.3;

/// A single stress, risk or heat factor above this raises a warning.
pub const FACTOR_WARNING_THRESHOLD: f64 = 0.3;

/// Temperatures strictly above this (°C) count as heat stress.
pub const HEAT_STRESS_THRESHOLD_C: f64 = 30.0;

/// Degrees above the heat threshold that map to a heat factor of 1.0
/// for a medium-tolerance species.
pub const HEAT_FACTOR_SPAN_C: f64 = 10.0;

pub const MAX_HEALTH_SCORE: f64 = 100.0;

/// Heat sensitivity per tolerance; scales both the heat factor and the
/// default heat acceleration of water stress.
pub const HEAT_SENSITIVITY_LOW: f64 = 1.5;
pub const HEAT_SENSITIVITY_MEDIUM: f64 = 1.0;
pub const HEAT_SENSITIVITY_HIGH: f64 = 0.5;

// ============================================================================
// Input Validation Bounds
// ============================================================================

pub const MIN_PLAUSIBLE_TEMPERATURE_C: f64 = -60.0;
pub const MAX_PLAUSIBLE_TEMPERATURE_C: f64 = 60.0;
pub const MAX_HUMIDITY_PCT: f64 = 100.0;
pub const MAX_WIND_SPEED_MS: f64 = 120.0;

/// Events stamped further than this past the caller's clock are rejected.
pub const MAX_EVENT_CLOCK_SKEW_SECS: i64 = 300;

// ============================================================================
// Late Event Replay
// ============================================================================

/// Committed events kept per plant for replaying late arrivals
pub const JOURNAL_CAPACITY: usize = 256;

/// Events older than this behind a plant's latest evaluation are folded
/// into its checkpoint and can no longer be reordered.
pub const LATE_EVENT_WINDOW_HOURS: i64 = 7 * 24;

/// Heat sensitivity for a tolerance class
pub fn heat_sensitivity(tolerance: HeatTolerance) -> f64 {
    match tolerance {
        HeatTolerance::Low => HEAT_SENSITIVITY_LOW,
        HeatTolerance::Medium => HEAT_SENSITIVITY_MEDIUM,
        HeatTolerance::High => HEAT_SENSITIVITY_HIGH,
    }
}

// ============================================================================
// Tunable Curves
// ============================================================================

/// Tunable parameters of the decay, recovery and fusion curves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Water stress gained per dry day (at or below the heat threshold)
    pub accrual: AccrualRates,
    /// Extra accrual per degree band above the heat threshold
    pub heat_acceleration: HeatAcceleration,
    /// Health lost per day at water stress 1.0
    pub water_decline_per_day: f64,
    /// Health lost per day at disease risk 1.0
    pub disease_decline_per_day: f64,
    /// Decline multiplier while water stress and disease risk are synergistic
    pub synergy_multiplier: f64,
    /// Health regained per day when both stress and risk are low
    pub regrowth_per_day: f64,
    /// Stress and risk must be at or below this for regrowth
    pub regrowth_ceiling: f64,
    /// Length of the post-watering recovery window
    pub recovery_window_hours: f64,
    /// Regrowth multiplier inside the recovery window
    pub recovery_multiplier: f64,
    /// Fraction of water stress left after a watering event
    pub watering_retention: f64,
    /// Half-life of the disease risk index without new readings
    pub disease_half_life_hours: f64,
    /// Longest slice the integrator advances in one step
    pub integration_step_minutes: i64,
}

/// Daily water stress accrual per water need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccrualRates {
    pub sparse: f64,
    pub moderate: f64,
    pub frequent: f64,
}

/// Heat acceleration per heat tolerance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeatAcceleration {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for AccrualRates {
    fn default() -> Self {
        Self {
            sparse: 1.0 / 21.0,
            moderate: 1.0 / 10.0,
            frequent: 1.0 / 5.0,
        }
    }
}

impl Default for HeatAcceleration {
    fn default() -> Self {
        Self {
            low: HEAT_SENSITIVITY_LOW,
            medium: HEAT_SENSITIVITY_MEDIUM,
            high: HEAT_SENSITIVITY_HIGH,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            accrual: AccrualRates::default(),
            heat_acceleration: HeatAcceleration::default(),
            water_decline_per_day: 60.0,
            disease_decline_per_day: 25.0,
            synergy_multiplier: 1.5,
            regrowth_per_day: 2.0,
            regrowth_ceiling: 0.2,
            recovery_window_hours: 72.0,
            recovery_multiplier: 3.0,
            watering_retention: 0.15,
            disease_half_life_hours: 72.0,
            integration_step_minutes: 60,
        }
    }
}

impl EngineConfig {
    /// Load configuration from JSON file (missing fields take defaults)
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {:?}", path))?;

        let config: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse engine config JSON")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject curve parameters that would break the domain invariants
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("accrual.sparse", self.accrual.sparse),
            ("accrual.moderate", self.accrual.moderate),
            ("accrual.frequent", self.accrual.frequent),
            ("disease_half_life_hours", self.disease_half_life_hours),
            ("synergy_multiplier", self.synergy_multiplier),
            ("recovery_multiplier", self.recovery_multiplier),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                anyhow::bail!("{} must be positive, got {}", name, value);
            }
        }

        let non_negative = [
            ("heat_acceleration.low", self.heat_acceleration.low),
            ("heat_acceleration.medium", self.heat_acceleration.medium),
            ("heat_acceleration.high", self.heat_acceleration.high),
            ("water_decline_per_day", self.water_decline_per_day),
            ("disease_decline_per_day", self.disease_decline_per_day),
            ("regrowth_per_day", self.regrowth_per_day),
            ("regrowth_ceiling", self.regrowth_ceiling),
            ("recovery_window_hours", self.recovery_window_hours),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                anyhow::bail!("{} must be non-negative, got {}", name, value);
            }
        }

        // Retention of 1.0 would make watering a no-op
        if !(0.0..1.0).contains(&self.watering_retention) {
            anyhow::bail!(
                "watering_retention must be in [0, 1), got {}",
                self.watering_retention
            );
        }

        if self.integration_step_minutes <= 0 {
            anyhow::bail!(
                "integration_step_minutes must be positive, got {}",
                self.integration_step_minutes
            );
        }

        Ok(())
    }

    pub fn accrual_per_day(&self, need: WaterNeed) -> f64 {
        match need {
            WaterNeed::Sparse => self.accrual.sparse,
            WaterNeed::Moderate => self.accrual.moderate,
            WaterNeed::Frequent => self.accrual.frequent,
        }
    }

    pub fn heat_acceleration_for(&self, tolerance: HeatTolerance) -> f64 {
        match tolerance {
            HeatTolerance::Low => self.heat_acceleration.low,
            HeatTolerance::Medium => self.heat_acceleration.medium,
            HeatTolerance::High => self.heat_acceleration.high,
        }
    }
}
