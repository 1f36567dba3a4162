//! Plant Ledger - in-memory plant records
//!
//! The map of plants sits behind an `RwLock`; each record has its own
//! `Mutex`. An update holds only its plant's lock while the engine runs
//! (no I/O inside), so two plants never wait on each other and one plant
//! never sees two writers.
//!
//! Each plant keeps a checkpoint state and a journal of the events
//! committed since. Every commit replays the journal from the checkpoint in
//! (timestamp, priority) order, so an event that arrives after a newer one
//! lands where its timestamp puts it. Events leaving the late-event window,
//! or overflowing the journal, are folded into the checkpoint.

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::engine::{EngineOutcome, VitalityEngine};
use crate::error::{EngineError, Result};
use crate::policy::{JOURNAL_CAPACITY, LATE_EVENT_WINDOW_HOURS};
use crate::vitality::{order_events, Coordinate, DiseaseEvent, PlantEvent, VitalityState};

/// Opaque (time, height) pair; stored, never interpreted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthLogEntry {
    pub recorded_at: DateTime<Utc>,
    pub height_cm: f64,
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlant {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: u64,
    pub name: String,
    pub species: String,
    pub coordinate: Option<Coordinate>,
    pub created_at: DateTime<Utc>,
    pub state: VitalityState,
    pub growth_log: Vec<GrowthLogEntry>,
    pub disease_history: Vec<DiseaseEvent>,
}

/// A plant whose next watering is due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WateringReminder {
    pub plant_id: u64,
    pub name: String,
    pub species: String,
    pub due_at: DateTime<Utc>,
}

/// A record plus what a late event needs to be replayed into it
#[derive(Debug)]
struct PlantSlot {
    record: PlantRecord,
    /// State before the first journaled event
    checkpoint: VitalityState,
    /// Committed events since the checkpoint, in application order
    journal: Vec<PlantEvent>,
}

type PlantMap = FxHashMap<u64, Arc<Mutex<PlantSlot>>>;

#[derive(Debug, Default)]
pub struct PlantLedger {
    plants: RwLock<PlantMap>,
    next_id: AtomicU64,
}

impl PlantLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, plant: NewPlant, now: DateTime<Utc>) -> Result<PlantRecord> {
        if let Some(coordinate) = &plant.coordinate {
            coordinate.validate()?;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let record = PlantRecord {
            id,
            name: plant.name,
            species: plant.species,
            coordinate: plant.coordinate,
            created_at: now,
            state: VitalityState::new(now),
            growth_log: Vec::new(),
            disease_history: Vec::new(),
        };

        let slot = PlantSlot {
            record: record.clone(),
            checkpoint: record.state.clone(),
            journal: Vec::new(),
        };
        self.write_plants().insert(id, Arc::new(Mutex::new(slot)));
        tracing::info!("Registered plant {} ({}, {})", id, record.name, record.species);
        Ok(record)
    }

    /// Snapshot of one record
    pub fn get(&self, id: u64) -> Result<PlantRecord> {
        let entry = self.entry(id)?;
        let slot = lock_slot(&entry);
        Ok(slot.record.clone())
    }

    /// Snapshot of every record, ordered by id
    pub fn list(&self) -> Vec<PlantRecord> {
        let entries: Vec<Arc<Mutex<PlantSlot>>> = self.read_plants().values().cloned().collect();
        let mut records: Vec<PlantRecord> = entries
            .iter()
            .map(|entry| lock_slot(entry).record.clone())
            .collect();
        records.sort_by_key(|r| r.id);
        records
    }

    pub fn remove(&self, id: u64) -> Result<PlantRecord> {
        let entry = self
            .write_plants()
            .remove(&id)
            .ok_or(EngineError::PlantNotFound(id))?;
        let record = lock_slot(&entry).record.clone();
        tracing::info!("Removed plant {}", id);
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.read_plants().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_plants().is_empty()
    }

    /// Apply events to a plant and commit the result atomically
    ///
    /// `now` is the caller's clock, used only to reject events stamped in
    /// the future. The plant is evaluated to its latest event or its last
    /// evaluation, whichever is later. Events older than the checkpoint fail
    /// with `StaleEvent`. On error the stored record is unchanged.
    pub fn apply_events(
        &self,
        engine: &VitalityEngine,
        id: u64,
        events: &[PlantEvent],
        now: DateTime<Utc>,
    ) -> Result<EngineOutcome> {
        engine.validate_events(events, now)?;

        let entry = self.entry(id)?;
        let mut slot = lock_slot(&entry);

        let evaluated_at = slot.record.state.updated_at;
        let horizon = events
            .iter()
            .map(PlantEvent::timestamp)
            .fold(evaluated_at, |latest, at| latest.max(at));

        let mut journal = slot.journal.clone();
        journal.extend_from_slice(events);
        order_events(&mut journal);

        let outcome = engine.apply(&slot.checkpoint, &slot.record.species, &journal, horizon)?;
        if events.iter().any(|e| e.timestamp() < evaluated_at) {
            tracing::debug!(
                "Replayed {} events for plant {} to place a late arrival",
                journal.len(),
                id
            );
        }

        let (checkpoint, journal) =
            fold_expired(engine, &slot.record.species, &slot.checkpoint, journal, horizon)?;

        slot.checkpoint = checkpoint;
        slot.journal = journal;
        let record = &mut slot.record;
        record.state = outcome.state.clone();
        for event in events {
            if let PlantEvent::DiseaseAnalysis(reading) = event {
                record.disease_history.push(reading.clone());
            }
        }
        record.disease_history.sort_by_key(|r| r.observed_at);

        Ok(outcome)
    }

    pub fn append_growth(&self, id: u64, entry: GrowthLogEntry) -> Result<PlantRecord> {
        if !entry.height_cm.is_finite() {
            return Err(EngineError::NonFinite { field: "height_cm" });
        }

        let plant = self.entry(id)?;
        let mut slot = lock_slot(&plant);
        let record = &mut slot.record;
        record.growth_log.push(entry);
        record.growth_log.sort_by_key(|e| e.recorded_at);
        Ok(record.clone())
    }

    /// Evaluate every plant up to `now` and report overdue waterings
    pub fn advance_all(&self, engine: &VitalityEngine, now: DateTime<Utc>) -> Vec<WateringReminder> {
        let entries: Vec<Arc<Mutex<PlantSlot>>> = self.read_plants().values().cloned().collect();

        let mut reminders: Vec<WateringReminder> = entries
            .par_iter()
            .filter_map(|entry| {
                let mut slot = lock_slot(entry);
                let record = &mut slot.record;

                match engine.project(&record.state, &record.species, now) {
                    Ok(state) => record.state = state,
                    Err(err) => {
                        tracing::warn!("Could not refresh plant {}: {}", record.id, err);
                        return None;
                    }
                }

                let advisory = engine.advise(&record.state, &record.species, None);
                advisory.watering_overdue.then(|| WateringReminder {
                    plant_id: record.id,
                    name: record.name.clone(),
                    species: record.species.clone(),
                    due_at: advisory.next_watering_at,
                })
            })
            .collect();

        reminders.sort_by_key(|r| r.plant_id);
        tracing::info!(
            "Refreshed {} plants, {} watering reminders due",
            entries.len(),
            reminders.len()
        );
        reminders
    }

    fn entry(&self, id: u64) -> Result<Arc<Mutex<PlantSlot>>> {
        self.read_plants()
            .get(&id)
            .cloned()
            .ok_or(EngineError::PlantNotFound(id))
    }

    fn read_plants(&self) -> RwLockReadGuard<'_, PlantMap> {
        self.plants.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_plants(&self) -> RwLockWriteGuard<'_, PlantMap> {
        self.plants.write().unwrap_or_else(PoisonError::into_inner)
    }
}

// Poisoned locks still guard a whole slot: a commit assigns only after the engine succeeds
fn lock_slot(entry: &Mutex<PlantSlot>) -> MutexGuard<'_, PlantSlot> {
    entry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fold journal events outside the late-event window (or beyond capacity)
/// into the checkpoint
///
/// Folding stops at an event time, where replay would pass through the same
/// intermediate state, so the committed result does not change.
fn fold_expired(
    engine: &VitalityEngine,
    species: &str,
    checkpoint: &VitalityState,
    mut journal: Vec<PlantEvent>,
    horizon: DateTime<Utc>,
) -> Result<(VitalityState, Vec<PlantEvent>)> {
    let cutoff = horizon - Duration::hours(LATE_EVENT_WINDOW_HOURS);
    let expired = journal.iter().take_while(|e| e.timestamp() < cutoff).count();
    let fold = expired.max(journal.len().saturating_sub(JOURNAL_CAPACITY));
    if fold == 0 {
        return Ok((checkpoint.clone(), journal));
    }

    let folded: Vec<PlantEvent> = journal.drain(..fold).collect();
    let fold_at = folded
        .last()
        .map_or(checkpoint.updated_at, PlantEvent::timestamp);
    let next = engine.apply(checkpoint, species, &folded, fold_at)?.state;
    Ok((next, journal))
}
