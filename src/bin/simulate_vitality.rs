//! Day-by-day trace of an unwatered plant
//!
//! Usage: simulate_vitality [SPECIES] [DAYS] [TEMPERATURE_C]
//! Defaults: Tomato, 10 days, 25°C

use chrono::{Duration, TimeZone, Utc};
use plant_vitality_rust::{VitalityEngine, VitalityState};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let species = args.get(1).map(String::as_str).unwrap_or("Tomato");
    let days: i64 = args.get(2).map(|s| s.parse::<i64>()).transpose()?.unwrap_or(10);
    let temperature: f64 = args.get(3).map(|s| s.parse::<f64>()).transpose()?.unwrap_or(25.0);

    let engine = VitalityEngine::default();
    let profile = engine.profile(species);
    let start = Utc
        .with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid start time"))?;

    println!("\nSimulating {} ({}) for {} days at {:.1}°C, never watered\n", species, profile.species, days, temperature);
    println!("{:>5} {:>8} {:>8} {:>8}  {:<10} {:<10} {}", "hour", "health", "water", "disease", "severity", "cause", "due");

    let mut state = VitalityState::new(start);
    for hour in (0..=days * 24).step_by(6) {
        if hour > 0 {
            state = engine.advance(&state, species, Duration::hours(6), Some(temperature))?;
        }
        let advisory = engine.advise(&state, species, None);
        println!(
            "{:>5} {:>8.2} {:>7.1}% {:>7.1}%  {:<10} {:<10} {}",
            hour,
            state.health_score,
            state.water_stress * 100.0,
            state.disease_risk_index * 100.0,
            advisory.severity.display_text(),
            advisory.dominant_cause.display_text(),
            if advisory.watering_overdue { "overdue" } else { "" }
        );
    }

    let advisory = engine.advise(&state, species, None);
    println!("\n{} {}", advisory.severity.icon(), advisory.text);
    for action in &advisory.actions {
        println!("  - {}: {}", action.title, action.detail);
    }

    Ok(())
}
