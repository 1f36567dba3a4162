//! Species Care Profiles
//!
//! Static per-species reference data: water need, heat tolerance, care notes
//! and whether leaf photos of the species can be sent for disease analysis.
//!
//! The built-in table covers the species offered when a plant is registered.
//! Anything else resolves to the default "Other" profile.

use anyhow::{Context, Result};
use chrono::Duration;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How often a species wants water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterNeed {
    Sparse,
    Moderate,
    Frequent,
}

impl WaterNeed {
    /// Interval between waterings used for reminders
    pub fn watering_interval(&self) -> Duration {
        match self {
            WaterNeed::Sparse => Duration::days(7),
            WaterNeed::Moderate => Duration::days(3),
            WaterNeed::Frequent => Duration::days(1),
        }
    }

    pub fn display_text(&self) -> &'static str {
        match self {
            WaterNeed::Sparse => "Let the soil dry out between waterings, about once a week",
            WaterNeed::Moderate => "Keep soil moist, water every 2-3 days",
            WaterNeed::Frequent => "Keep soil consistently moist, water daily",
        }
    }
}

/// How well a species copes with temperatures above the heat threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatTolerance {
    Low,
    Medium,
    High,
}

impl HeatTolerance {
    pub fn display_text(&self) -> &'static str {
        match self {
            HeatTolerance::Low => "Low",
            HeatTolerance::Medium => "Medium",
            HeatTolerance::High => "High",
        }
    }
}

/// Care metadata for one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareProfile {
    pub species: String,
    pub water_need: WaterNeed,
    pub heat_tolerance: HeatTolerance,
    pub description: String,
    /// Leaf photos of this species can be classified for disease
    #[serde(default)]
    pub supports_disease_analysis: bool,
    #[serde(default)]
    pub light: String,
    #[serde(default)]
    pub fertilizer: String,
}

// ============================================================================
// EMBEDDED PROFILE DATA
// ============================================================================

struct ProfileSeed {
    species: &'static str,
    aliases: &'static [&'static str],
    water_need: WaterNeed,
    heat_tolerance: HeatTolerance,
    description: &'static str,
    light: &'static str,
    fertilizer: &'static str,
    supports_disease_analysis: bool,
}

pub const DEFAULT_SPECIES: &str = "Other";

static DEFAULT_SEED: ProfileSeed = ProfileSeed {
    species: DEFAULT_SPECIES,
    aliases: &[],
    water_need: WaterNeed::Moderate,
    heat_tolerance: HeatTolerance::Medium,
    description: "General-purpose care: water when the top few centimetres of soil are dry and keep out of harsh midday sun",
    light: "Bright light, some direct sun",
    fertilizer: "Balanced fertilizer monthly during the growing season",
    supports_disease_analysis: false,
};

static BUILTIN_PROFILES: &[ProfileSeed] = &[
    ProfileSeed {
        species: "Apple",
        aliases: &["malus"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::Medium,
        description: "Deep-rooted fruit tree; water deeply rather than often and mulch the root zone",
        light: "Full sun (6-8 hours daily)",
        fertilizer: "Balanced fertilizer in early spring",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Blueberry",
        aliases: &["vaccinium"],
        water_need: WaterNeed::Frequent,
        heat_tolerance: HeatTolerance::Low,
        description: "Shallow-rooted shrub on acidic soil; dries out quickly and dislikes heat",
        light: "Full sun to part shade",
        fertilizer: "Ericaceous fertilizer in spring",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Cherry",
        aliases: &["prunus avium"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::Medium,
        description: "Stone fruit tree; keep evenly moist while fruit swells, avoid waterlogging",
        light: "Full sun (6-8 hours daily)",
        fertilizer: "Balanced fertilizer in early spring",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Corn",
        aliases: &["corn (maize)", "maize", "zea mays"],
        water_need: WaterNeed::Frequent,
        heat_tolerance: HeatTolerance::High,
        description: "Heavy-feeding grass; most sensitive to drought at tasselling and silking",
        light: "Full sun",
        fertilizer: "Nitrogen-rich feed when knee high",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Grape",
        aliases: &["grapevine", "vitis"],
        water_need: WaterNeed::Sparse,
        heat_tolerance: HeatTolerance::High,
        description: "Drought-hardy vine once established; overwatering dilutes fruit and invites mildew",
        light: "Full sun",
        fertilizer: "Light potassium feed in spring",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Orange",
        aliases: &["citrus", "citrus sinensis"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::High,
        description: "Evergreen citrus; water when the top layer dries, never let roots sit wet",
        light: "Full sun",
        fertilizer: "Citrus fertilizer every 6 weeks in the growing season",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Peach",
        aliases: &["prunus persica"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::Medium,
        description: "Stone fruit tree; steady moisture during fruit set, good airflow against leaf curl",
        light: "Full sun (6-8 hours daily)",
        fertilizer: "Balanced fertilizer in early spring",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Pepper",
        aliases: &["pepper, bell", "bell pepper", "capsicum"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::Medium,
        description: "Warm-season fruiting plant; even moisture prevents blossom-end rot",
        light: "Full sun (6-8 hours daily)",
        fertilizer: "Tomato feed weekly once flowering",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Potato",
        aliases: &["solanum tuberosum"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::Low,
        description: "Tuber crop; consistent moisture while tubers form, hill soil around stems",
        light: "Full sun",
        fertilizer: "Balanced fertilizer at planting",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Raspberry",
        aliases: &["rubus idaeus"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::Low,
        description: "Cane fruit; shallow roots need mulch and regular water while fruiting",
        light: "Full sun to part shade",
        fertilizer: "Balanced fertilizer in spring",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Soybean",
        aliases: &["soya", "glycine max"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::High,
        description: "Nitrogen-fixing legume; most water-hungry during pod fill",
        light: "Full sun",
        fertilizer: "Little nitrogen needed; phosphorus at planting",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Squash",
        aliases: &["cucurbita", "zucchini", "courgette"],
        water_need: WaterNeed::Frequent,
        heat_tolerance: HeatTolerance::Medium,
        description: "Large-leaved vine; water at the base to keep foliage dry against mildew",
        light: "Full sun",
        fertilizer: "Balanced feed every 2 weeks once fruiting",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Strawberry",
        aliases: &["fragaria"],
        water_need: WaterNeed::Frequent,
        heat_tolerance: HeatTolerance::Low,
        description: "Shallow-rooted perennial; keep crowns dry and soil moist while fruiting",
        light: "Full sun (6-8 hours daily)",
        fertilizer: "Potassium-rich feed while flowering",
        supports_disease_analysis: false,
    },
    ProfileSeed {
        species: "Tomato",
        aliases: &["solanum lycopersicum"],
        water_need: WaterNeed::Moderate,
        heat_tolerance: HeatTolerance::Medium,
        description: "Warm-season fruiting vine; water at the base, keep leaves dry and stake for airflow",
        light: "Full sun (6-8 hours daily)",
        fertilizer: "Balanced fertilizer every 2 weeks",
        supports_disease_analysis: true,
    },
];

impl ProfileSeed {
    fn to_profile(&self) -> CareProfile {
        CareProfile {
            species: self.species.to_string(),
            water_need: self.water_need,
            heat_tolerance: self.heat_tolerance,
            description: self.description.to_string(),
            supports_disease_analysis: self.supports_disease_analysis,
            light: self.light.to_string(),
            fertilizer: self.fertilizer.to_string(),
        }
    }
}

/// Lowercase, trim and collapse whitespace so "  Bell   Pepper" == "bell pepper"
fn normalize_species(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

// ============================================================================
// Registry
// ============================================================================

/// Species name → care profile, with an alias table and a default fallback
#[derive(Debug, Clone)]
pub struct CareProfileRegistry {
    profiles: FxHashMap<String, CareProfile>,
    aliases: FxHashMap<String, String>,
    default_profile: CareProfile,
}

impl Default for CareProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CareProfileRegistry {
    /// Registry with the embedded species table
    pub fn builtin() -> Self {
        let mut profiles = FxHashMap::default();
        let mut aliases = FxHashMap::default();

        for seed in BUILTIN_PROFILES {
            let key = normalize_species(seed.species);
            for alias in seed.aliases {
                aliases.insert(normalize_species(alias), key.clone());
            }
            profiles.insert(key, seed.to_profile());
        }

        Self {
            profiles,
            aliases,
            default_profile: DEFAULT_SEED.to_profile(),
        }
    }

    /// Merge custom profiles from a JSON array over the current table
    ///
    /// A profile named "Other" replaces the default fallback.
    pub fn load_overrides(&mut self, path: &Path) -> Result<usize> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read care profiles: {:?}", path))?;

        let overrides: Vec<CareProfile> = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse care profiles JSON")?;

        let count = overrides.len();
        for profile in overrides {
            self.insert(profile);
        }

        tracing::info!("Loaded {} care profile overrides from {:?}", count, path);
        Ok(count)
    }

    pub fn insert(&mut self, profile: CareProfile) {
        let key = normalize_species(&profile.species);
        if key == normalize_species(DEFAULT_SPECIES) {
            self.default_profile = profile;
        } else {
            self.profiles.insert(key, profile);
        }
    }

    /// Exact or alias match, `None` for unknown species
    pub fn get(&self, species: &str) -> Option<&CareProfile> {
        let key = normalize_species(species);
        self.profiles.get(&key).or_else(|| {
            self.aliases
                .get(&key)
                .and_then(|canonical| self.profiles.get(canonical))
        })
    }

    /// Profile for a species, falling back to the default profile
    pub fn lookup(&self, species: &str) -> &CareProfile {
        match self.get(species) {
            Some(profile) => profile,
            None => {
                tracing::debug!("No care profile for '{}', using default", species);
                &self.default_profile
            }
        }
    }

    pub fn default_profile(&self) -> &CareProfile {
        &self.default_profile
    }

    /// Species names in the registry (sorted, default excluded)
    pub fn species(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.values().map(|p| p.species.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
