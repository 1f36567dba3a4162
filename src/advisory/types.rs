use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::care_profiles::CareProfile;

/// Advisory severity, ordered Normal < Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn display_text(&self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Normal => "✅",
            Severity::Warning => "⚠️",
            Severity::Critical => "🚨",
        }
    }
}

/// The factor driving the advisory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantCause {
    None,
    Heat,
    Water,
    Disease,
    /// Water stress and disease risk both above their synergy lines
    Compound,
}

impl DominantCause {
    pub fn display_text(&self) -> &'static str {
        match self {
            DominantCause::None => "None",
            DominantCause::Heat => "Heat",
            DominantCause::Water => "Water",
            DominantCause::Disease => "Disease",
            DominantCause::Compound => "Compound stress",
        }
    }
}

/// Normalised factors the severity and cause rules compare (all 0-1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressFactors {
    pub water: f64,
    pub disease: f64,
    /// `None` when no weather sample was supplied
    pub heat: Option<f64>,
}

/// A single care step shown with the advisory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareAction {
    /// "water", "disease", "heat", "light", "fertilizer", "schedule", "emergency"
    pub category: String,
    pub title: String,
    pub detail: String,
}

impl CareAction {
    pub fn new(category: &str, title: &str, detail: &str) -> Self {
        Self {
            category: category.to_string(),
            title: title.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Severity-tagged recommendation for one plant (not persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub severity: Severity,
    pub dominant_cause: DominantCause,
    pub text: String,
    pub profile: CareProfile,
    pub factors: StressFactors,
    /// Weather above the heat threshold; `None` without a weather sample
    pub heat_stress: Option<bool>,
    pub synergistic: bool,
    pub critical: bool,
    pub actions: Vec<CareAction>,
    pub next_watering_at: DateTime<Utc>,
    pub watering_overdue: bool,
}
