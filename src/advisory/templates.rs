//! Recommendation Templates
//!
//! One template per (severity, dominant cause). Only the species' care
//! profile is interpolated, so the same (severity, cause, species) always
//! yields the same text.

use super::types::{CareAction, DominantCause, Severity};
use crate::care_profiles::{CareProfile, HeatTolerance};

/// Recommendation text for a severity / cause pair
pub fn synthesize_text(severity: Severity, cause: DominantCause, profile: &CareProfile) -> String {
    let species = &profile.species;
    let watering = profile.water_need.display_text();
    let notes = &profile.description;

    match (severity, cause) {
        // ====================================================================
        // Critical
        // ====================================================================
        (Severity::Critical, DominantCause::Compound) => format!(
            "Emergency: disease and drought are compounding on {species}, causing rapid health decline. \
             Isolate the plant, prune infected leaves, water at the base without wetting the foliage \
             and treat with an organic fungicide every 7 days. Care notes: {notes}."
        ),
        (Severity::Critical, DominantCause::Disease) => format!(
            "Emergency: {species} shows strong signs of disease and its health is failing. \
             Isolate it from other plants, remove infected leaves and apply an organic fungicide \
             such as neem oil every 7 days. Care notes: {notes}."
        ),
        (Severity::Critical, DominantCause::Water) => format!(
            "Emergency: {species} is severely dehydrated. Water deeply at the base now and check \
             again in a few hours; recovery can take several waterings. Afterwards: {watering}. \
             Care notes: {notes}."
        ),
        (Severity::Critical, DominantCause::Heat) => format!(
            "Emergency: heat is pushing {species} past its limits. Move it into shade or rig \
             shade cloth, water early in the morning and check the soil twice a day. \
             Care notes: {notes}."
        ),
        (Severity::Critical, DominantCause::None) => format!(
            "Emergency: {species} is in critical condition. Isolate it, inspect leaves, stems and \
             roots, and follow the recovery plan closely. Care notes: {notes}."
        ),

        // ====================================================================
        // Warning
        // ====================================================================
        (Severity::Warning, DominantCause::Compound) | (Severity::Normal, DominantCause::Compound) => {
            format!(
                "Compound stress on {species}: elevated disease risk and water stress together are \
                 accelerating decline. Water at the base now and remove affected leaves before the \
                 damage spreads. Care notes: {notes}."
            )
        }
        (Severity::Warning, DominantCause::Disease) => format!(
            "Keep a close eye on {species}: disease risk is elevated. Remove spotted leaves, keep \
             the foliage dry and improve airflow around the plant. Care notes: {notes}."
        ),
        (Severity::Warning, DominantCause::Water) => format!(
            "{species} is getting thirsty. Water it today, then: {watering}. Care notes: {notes}."
        ),
        (Severity::Warning, DominantCause::Heat) => format!(
            "Hot weather is stressing {species} (heat tolerance: {}). Water in the early morning \
             and give it afternoon shade until temperatures drop. Care notes: {notes}.",
            profile.heat_tolerance.display_text().to_lowercase()
        ),
        (Severity::Warning, DominantCause::None) => format!(
            "{species} is below its best. Review its routine: {watering}. Care notes: {notes}."
        ),

        // ====================================================================
        // Normal
        // ====================================================================
        (Severity::Normal, DominantCause::Disease) => format!(
            "{species} is healthy and an earlier disease signal is fading. Keep the leaves dry and \
             watch for new spots. Care notes: {notes}."
        ),
        (Severity::Normal, DominantCause::Water) => format!(
            "{species} is healthy. Stay on schedule: {watering}. Care notes: {notes}."
        ),
        (Severity::Normal, DominantCause::Heat) => format!(
            "{species} is healthy, but it is warm out. Check soil moisture in the afternoon. \
             Care notes: {notes}."
        ),
        (Severity::Normal, DominantCause::None) => format!(
            "{species} is thriving. {watering}. Care notes: {notes}."
        ),
    }
}

/// The emergency recovery plan
pub fn emergency_plan(cause: DominantCause) -> Vec<CareAction> {
    let mut actions = Vec::new();

    let disease_involved = matches!(
        cause,
        DominantCause::Disease | DominantCause::Compound | DominantCause::None
    );

    if disease_involved {
        actions.push(CareAction::new(
            "emergency",
            "Isolate",
            "Move the plant away from others to prevent spread",
        ));
        actions.push(CareAction::new(
            "emergency",
            "Prune",
            "Remove infected leaves, including any leaf that was analysed",
        ));
    }

    actions.push(CareAction::new(
        "emergency",
        "Hydrate",
        "Water immediately at the base but avoid wetting the leaves",
    ));

    if disease_involved {
        actions.push(CareAction::new(
            "emergency",
            "Treat",
            "Apply an organic fungicide (neem oil) every 7 days",
        ));
    }

    if cause == DominantCause::Heat {
        actions.push(CareAction::new(
            "emergency",
            "Shade",
            "Move into shade or cover with shade cloth during the hottest hours",
        ));
    }

    actions
}

/// Routine care tips from the species profile
pub fn routine_care(profile: &CareProfile) -> Vec<CareAction> {
    let mut actions = vec![CareAction::new(
        "water",
        "Water",
        profile.water_need.display_text(),
    )];

    if !profile.light.is_empty() {
        actions.push(CareAction::new("light", "Light", &profile.light));
    }
    if !profile.fertilizer.is_empty() {
        actions.push(CareAction::new("fertilizer", "Fertilizer", &profile.fertilizer));
    }

    actions
}

/// Extra step when the weather is above the heat threshold
pub fn heat_action(profile: &CareProfile) -> CareAction {
    let detail = match profile.heat_tolerance {
        HeatTolerance::Low => "Shade the plant through the afternoon and water early in the morning",
        HeatTolerance::Medium => "Water early in the morning and check soil moisture in the afternoon",
        HeatTolerance::High => "Tolerates heat well; check that the soil has not dried out",
    };
    CareAction::new("heat", "Heat", detail)
}
