//! Benchmarks pour la validation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::path::Path;

use openparking::{
    Available, Coordinates, Datasource, GeojsonDatasource, Lot, LotResult, State, Warnings,
};
use openparking_validate::{ValidationConfig, Validator};

fn synthetic_batch(size: usize) -> Vec<LotResult> {
    (0..size)
        .map(|i| {
            let i = i as i64;
            Ok(Lot {
                name: format!("Lot {}", i),
                city: "Dresden".to_string(),
                available: Available::Discrete(i % 120),
                capacity: Some(100),
                state: State::Open,
                coordinates: Some(Coordinates::new(51.0 + (i as f64) * 1e-4, 13.7)),
                ..Default::default()
            })
        })
        .collect()
}

fn bench_check_batch(c: &mut Criterion) {
    let validator = Validator::new(ValidationConfig::default());

    let mut group = c.benchmark_group("check_batch");
    for size in [100usize, 1_000, 10_000] {
        let batch = synthetic_batch(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| {
                let mut warnings = Warnings::new();
                let violations: usize = batch
                    .iter()
                    .map(|lot| validator.check_lot(black_box(lot), &mut warnings).len())
                    .sum();
                black_box(violations)
            })
        });
    }
    group.finish();
}

fn bench_fixture_run(c: &mut Criterion) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures/valid/dresden.geojson");
    if !path.exists() {
        eprintln!("No fixtures found, skipping benchmark");
        return;
    }

    let source = GeojsonDatasource::from_path(&path);
    let validator = Validator::new(ValidationConfig::default());

    c.bench_function(&format!("run_{}", source.name()), |b| {
        b.iter(|| black_box(validator.run(black_box(&source))))
    });
}

criterion_group!(benches, bench_check_batch, bench_fixture_run);
criterion_main!(benches);
