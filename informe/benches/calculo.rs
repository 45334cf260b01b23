//! Benchmarks de la chaîne de calcul

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use informe::types::{Buildability, Cadastral, FloorAreaRatios, NeighborPair};
use informe::{Calculator, ParcelRecord};

fn make_block(size: usize) -> Vec<ParcelRecord> {
    let ids: Vec<String> = (0..size).map(|i| format!("020-045-{:03}", i + 1)).collect();

    (0..size)
        .map(|i| ParcelRecord {
            cadastral: Cadastral {
                parcel_id: ids[i].clone(),
                total_area: Some(250.0 + i as f64 * 25.0),
                covered_area: None,
                frontage: Some(8.66),
                depth: Some(30.0),
                neighboring_parcel_ids: NeighborPair {
                    previous: i.checked_sub(1).map(|p| ids[p].clone()),
                    next: ids.get(i + 1).cloned(),
                },
            },
            buildability: Buildability {
                parcel_area: Some(250.0 + i as f64 * 25.0),
                max_height_by_tier: vec![16.5],
                floor_area_ratio: FloorAreaRatios {
                    party_wall: Some(1.0),
                    ..Default::default()
                },
                district_tax_code: Some("A2".to_string()),
                tax_incidence_value: Some(950.0),
                ..Default::default()
            },
            ..Default::default()
        })
        .collect()
}

fn bench_analyze_single(c: &mut Criterion) {
    let calculator = Calculator::default();
    let record = make_block(1).remove(0);

    c.bench_function("analyze_single", |b| {
        b.iter(|| black_box(calculator.analyze(black_box(&record), None)))
    });
}

fn bench_analyze_batch(c: &mut Criterion) {
    let calculator = Calculator::default();
    let mut group = c.benchmark_group("analyze_batch");

    for size in [2usize, 4, 8] {
        let records = make_block(size);
        let addresses: Vec<String> = (0..size).map(|i| format!("Billinghurst {}", 900 + i * 10)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| {
                let batch = calculator
                    .analyze_batch(black_box(&addresses), black_box(records), None)
                    .unwrap();
                black_box(batch)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze_single, bench_analyze_batch);
criterion_main!(benches);
