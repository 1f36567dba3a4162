// API Server Binary Entry Point
//
// Purpose: Start the Axum API server over the vitality engine
// Usage: cargo run --features api --bin api_server

use plant_vitality_rust::api_server::{create_router, AppState};
use plant_vitality_rust::VitalityEngine;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "plant_vitality_rust=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let engine_config = std::env::var("ENGINE_CONFIG").ok().map(PathBuf::from);
    let care_profiles = std::env::var("CARE_PROFILES").ok().map(PathBuf::from);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let refresh_secs: u64 = std::env::var("REFRESH_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&s| s > 0)
        .unwrap_or(3600);

    tracing::info!("Configuration:");
    tracing::info!("  ENGINE_CONFIG: {:?}", engine_config);
    tracing::info!("  CARE_PROFILES: {:?}", care_profiles);
    tracing::info!("  PORT: {}", port);
    tracing::info!("  REFRESH_INTERVAL_SECS: {}", refresh_secs);

    let engine = VitalityEngine::from_paths(engine_config.as_deref(), care_profiles.as_deref())?;
    let state = AppState::new(engine);

    // Periodic refresh: evaluate every plant and report due waterings
    let refresh_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(refresh_secs));
        loop {
            interval.tick().await;
            match refresh_state.refresh().await {
                Ok(reminders) => {
                    for reminder in reminders {
                        tracing::info!(
                            "Watering due: plant {} ({}, {}) since {}",
                            reminder.plant_id,
                            reminder.name,
                            reminder.species,
                            reminder.due_at
                        );
                    }
                }
                Err(e) => tracing::warn!("Refresh failed: {}", e),
            }
        }
    });

    // Create router with all endpoints and middleware
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
