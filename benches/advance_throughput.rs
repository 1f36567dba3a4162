//! Benchmarks for the update path: advance, event batches, advisory, ledger refresh.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use plant_vitality_rust::{
    DiseaseEvent, NewPlant, PlantEvent, PlantLedger, VitalityEngine, VitalityState,
};

fn update_benchmarks(c: &mut Criterion) {
    let engine = VitalityEngine::default();
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let fresh = VitalityState::new(t0);

    let mut group = c.benchmark_group("advance");
    for days in [1i64, 10, 30] {
        group.bench_with_input(BenchmarkId::from_parameter(days), &days, |b, &days| {
            b.iter(|| {
                engine.advance(
                    black_box(&fresh),
                    "Tomato",
                    Duration::days(days),
                    Some(black_box(27.0)),
                )
            })
        });
    }
    group.finish();

    let events: Vec<PlantEvent> = (0..12)
        .map(|i| {
            let at = t0 + Duration::hours(i * 12);
            if i % 3 == 0 {
                PlantEvent::DiseaseAnalysis(DiseaseEvent {
                    label: "Tomato___Early_blight".to_string(),
                    confidence: 0.6,
                    observed_at: at,
                    image_ref: None,
                })
            } else {
                PlantEvent::Watering { at }
            }
        })
        .collect();

    c.bench_function("apply_12_events", |b| {
        b.iter(|| engine.apply(black_box(&fresh), "Tomato", black_box(&events), t0 + Duration::days(7)))
    });

    let stressed = engine
        .advance(&fresh, "Tomato", Duration::days(6), Some(33.0))
        .unwrap();
    c.bench_function("advise", |b| {
        b.iter(|| engine.advise(black_box(&stressed), "Tomato", None))
    });
}

fn ledger_benchmarks(c: &mut Criterion) {
    let engine = VitalityEngine::default();
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();

    let mut group = c.benchmark_group("advance_all");
    for plants in [100u64, 1_000] {
        let ledger = PlantLedger::new();
        for i in 0..plants {
            ledger
                .create(
                    NewPlant {
                        name: format!("plant-{}", i),
                        species: if i % 2 == 0 { "Tomato" } else { "Grape" }.to_string(),
                        coordinate: None,
                    },
                    t0,
                )
                .unwrap();
        }

        let mut hour = 0;
        group.bench_with_input(BenchmarkId::from_parameter(plants), &ledger, |b, ledger| {
            b.iter(|| {
                hour += 1;
                ledger.advance_all(&engine, t0 + Duration::hours(hour))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, update_benchmarks, ledger_benchmarks);
criterion_main!(benches);
