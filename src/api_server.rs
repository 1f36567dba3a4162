// Axum API Server Module
//
// Purpose: REST surface over the vitality engine and the in-memory plant ledger
// Reads project state to the current time without committing; writes go
// through the ledger so each plant has a single writer and late events are
// replayed in timestamp order.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::advisory::{generate_advisory, Advisory};
use crate::engine::{EngineOutcome, VitalityEngine};
use crate::error::EngineError;
use crate::ledger::{GrowthLogEntry, NewPlant, PlantLedger, PlantRecord, WateringReminder};
use crate::vitality::{DiseaseEvent, PlantEvent, WeatherSample};

/// How long a weather sample keeps feeding the heat flag
const WEATHER_TTL: Duration = Duration::from_secs(3 * 60 * 60);

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VitalityEngine>,
    pub ledger: Arc<PlantLedger>,
    /// Latest weather sample per plant id
    pub weather_cache: Cache<u64, WeatherSample>,
}

impl AppState {
    pub fn new(engine: VitalityEngine) -> Self {
        tracing::info!("Initializing plant ledger...");
        let ledger = Arc::new(PlantLedger::new());

        tracing::info!("Initializing Moka weather cache...");
        let weather_cache = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(WEATHER_TTL)
            .build();

        Self {
            engine: Arc::new(engine),
            ledger,
            weather_cache,
        }
    }

    /// Evaluate every plant to now on the blocking pool
    pub async fn refresh(&self) -> anyhow::Result<Vec<WateringReminder>> {
        let engine = self.engine.clone();
        let ledger = self.ledger.clone();

        let reminders =
            tokio::task::spawn_blocking(move || ledger.advance_all(&engine, Utc::now())).await?;
        Ok(reminders)
    }

    /// Record projected to now, with its advisory
    async fn view(&self, record: PlantRecord) -> Result<PlantView, AppError> {
        let weather = self.weather_cache.get(&record.id).await;
        let state = self
            .engine
            .project(&record.state, &record.species, Utc::now())?;
        let advisory = self
            .engine
            .advise(&state, &record.species, weather.as_ref());

        Ok(PlantView {
            record: PlantRecord { state, ..record },
            advisory,
        })
    }

    /// Commit events to one plant
    ///
    /// The ledger places late events by timestamp; the clock here only
    /// bounds how far ahead an event may be stamped.
    async fn commit(&self, id: u64, events: Vec<PlantEvent>) -> Result<EngineOutcome, AppError> {
        let mut outcome = self.ledger.apply_events(&self.engine, id, &events, Utc::now())?;

        let incoming = events
            .iter()
            .filter_map(|e| match e {
                PlantEvent::EnvironmentSync(sample) => Some(sample),
                _ => None,
            })
            .max_by_key(|sample| sample.observed_at);
        let cached = self.weather_cache.get(&id).await;

        // Newest sample wins; a late one never replaces it
        let weather = match (incoming, cached) {
            (Some(sample), Some(cached)) if cached.observed_at > sample.observed_at => cached,
            (Some(sample), _) => {
                self.weather_cache.insert(id, sample.clone()).await;
                sample.clone()
            }
            (None, Some(cached)) => cached,
            (None, None) => return Ok(outcome),
        };

        outcome.advisory =
            generate_advisory(&outcome.state, &outcome.advisory.profile, Some(&weather));
        Ok(outcome)
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PlantView {
    #[serde(flatten)]
    pub record: PlantRecord,
    pub advisory: Advisory,
}

#[derive(Debug, Default, Deserialize)]
pub struct WaterRequest {
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct EventsRequest {
    pub events: Vec<PlantEvent>,
}

#[derive(Debug, Deserialize)]
pub struct GrowthLogRequest {
    pub height_cm: f64,
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Plants
        .route("/api/plants", get(list_plants).post(create_plant))
        .route("/api/plants/:id", get(get_plant).delete(delete_plant))
        .route("/api/plants/:id/advisory", get(get_advisory))

        // Engine events
        .route("/api/plants/:id/water", post(water_plant))
        .route("/api/plants/:id/environment", post(sync_environment))
        .route("/api/plants/:id/disease", post(analyse_disease))
        .route("/api/plants/:id/events", post(apply_events))

        // Growth log (stored, not interpreted)
        .route("/api/plants/:id/log", post(log_growth))

        // Care profiles
        .route("/api/care-profiles", get(list_care_profiles))
        .route("/api/care-profiles/:species", get(get_care_profile))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "plants": state.ledger.len(),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn list_plants(State(state): State<AppState>) -> Result<Json<Vec<PlantView>>, AppError> {
    let mut views = Vec::new();
    for record in state.ledger.list() {
        views.push(state.view(record).await?);
    }
    Ok(Json(views))
}

async fn create_plant(
    State(state): State<AppState>,
    Json(payload): Json<NewPlant>,
) -> Result<(StatusCode, Json<PlantView>), AppError> {
    let record = state.ledger.create(payload, Utc::now())?;
    let view = state.view(record).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_plant(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PlantView>, AppError> {
    let record = state.ledger.get(id)?;
    Ok(Json(state.view(record).await?))
}

async fn delete_plant(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.ledger.remove(id)?;
    state.weather_cache.invalidate(&id).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_advisory(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Advisory>, AppError> {
    let record = state.ledger.get(id)?;
    Ok(Json(state.view(record).await?.advisory))
}

async fn water_plant(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<WaterRequest>,
) -> Result<Json<EngineOutcome>, AppError> {
    let at = payload.at.unwrap_or_else(Utc::now);
    tracing::info!("Watering plant {} at {}", id, at);
    Ok(Json(state.commit(id, vec![PlantEvent::Watering { at }]).await?))
}

async fn sync_environment(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(sample): Json<WeatherSample>,
) -> Result<Json<EngineOutcome>, AppError> {
    Ok(Json(
        state
            .commit(id, vec![PlantEvent::EnvironmentSync(sample)])
            .await?,
    ))
}

async fn analyse_disease(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(reading): Json<DiseaseEvent>,
) -> Result<Json<EngineOutcome>, AppError> {
    tracing::info!(
        "Disease analysis for plant {}: {} ({:.0}%)",
        id,
        reading.label,
        reading.confidence * 100.0
    );
    Ok(Json(
        state
            .commit(id, vec![PlantEvent::DiseaseAnalysis(reading)])
            .await?,
    ))
}

async fn apply_events(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<EventsRequest>,
) -> Result<Json<EngineOutcome>, AppError> {
    Ok(Json(state.commit(id, payload.events).await?))
}

async fn log_growth(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<GrowthLogRequest>,
) -> Result<Json<PlantRecord>, AppError> {
    let entry = GrowthLogEntry {
        recorded_at: payload.recorded_at.unwrap_or_else(Utc::now),
        height_cm: payload.height_cm,
    };
    Ok(Json(state.ledger.append_growth(id, entry)?))
}

async fn list_care_profiles(State(state): State<AppState>) -> impl IntoResponse {
    let species = state.engine.profiles().species();
    Json(serde_json::json!({
        "species": species,
        "default": state.engine.profiles().default_profile().species,
    }))
}

async fn get_care_profile(
    State(state): State<AppState>,
    Path(species): Path<String>,
) -> impl IntoResponse {
    let profiles = state.engine.profiles();
    let matched = profiles.get(&species).is_some();
    Json(serde_json::json!({
        "matched": matched,
        "profile": profiles.lookup(&species),
    }))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Engine(err) => {
                let status = match &err {
                    EngineError::PlantNotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::StaleEvent { .. } => StatusCode::CONFLICT,
                    EngineError::UnsupportedSpecies(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status != StatusCode::NOT_FOUND {
                    tracing::warn!("Request rejected: {}", err);
                }
                (status, err.to_string())
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
