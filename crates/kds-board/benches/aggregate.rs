//! Benchmarks for snapshot reconciliation and report aggregation
//!
//! Run with: cargo bench --bench aggregate

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kds_board::{aggregate, BoardState, DateRange, Reconciler};
use kds_types::{Document, Snapshot};
use serde_json::json;

const PRODUCTS: &[&str] = &["taco-pastor", "Torta", "agua-horchata", "QUESADILLA", "gringa"];
const PAYMENTS: &[&str] = &["Efectivo", "Transferencia", "Tarjeta", ""];

/// Create a snapshot of `count` orders, a third of them pending
fn create_snapshot(count: usize) -> Snapshot {
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let documents = (0..count)
        .map(|i| {
            let at = base + Duration::minutes(i as i64 * 7);
            let status = if i % 3 == 0 { "1" } else { "2" };
            Document::from_value(
                format!("order-{i:06}"),
                json!({
                    "status": status,
                    "fecha": at.to_rfc3339(),
                    "fechaListo": (at + Duration::minutes(15)).to_rfc3339(),
                    "metodoPago": PAYMENTS[i % PAYMENTS.len()],
                    "costoEnvio": 25,
                    "carrito": [
                        {"handle": PRODUCTS[i % PRODUCTS.len()], "cantidad": 1 + i % 4, "precio": 45},
                        {"handle": PRODUCTS[(i + 2) % PRODUCTS.len()], "cantidad": 2, "precio": "30.50"}
                    ]
                }),
            )
            .unwrap()
        })
        .collect();
    Snapshot::new(documents)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [50, 500, 5000] {
        let previous = create_snapshot(size);
        let next = create_snapshot(size + 1);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut rec = Reconciler::new();
                rec.apply_snapshot(&previous);
                black_box(rec.apply_snapshot(black_box(&next)))
            })
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");
    let now = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();

    for size in [50, 500, 5000] {
        let mut board = BoardState::new();
        board.apply_snapshot(&create_snapshot(size), now);
        board.set_range(DateRange::Last30Days);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("last_30_days", size), &size, |b, _| {
            b.iter(|| black_box(board.report(&now)))
        });
        group.bench_with_input(BenchmarkId::new("aggregate_all", size), &size, |b, _| {
            b.iter(|| black_box(aggregate(board.completed())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_report);
criterion_main!(benches);
