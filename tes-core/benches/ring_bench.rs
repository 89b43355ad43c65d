//! Benchmark: SignalRing / ReportRing push-pop throughput
//!
//! Purpose: Measure the per-record cost of the shared-memory ring buffers
//! that carry signals in and order reports out (spec §4.1, §4.2). These
//! sit directly on the hot path between the strategy process and the
//! signal-pump thread, so push/pop overhead bounds how many signals per
//! second the engine can ingest.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tes_core::core::{now_ns, OrderReport, OrderStatus, OrderType, Side};
use tes_core::ring::signal::SignalRecord;
use tes_core::ring::{ReportRing, SignalRing};

fn sample_order_report() -> OrderReport {
    OrderReport {
        order_id: "ORD_1_000001".into(),
        symbol: "BTCUSDT".into(),
        side: Side::Buy,
        order_type: OrderType::Limit,
        status: OrderStatus::Filled,
        quantity: 1.0,
        filled_quantity: 1.0,
        price: 30_000.0,
        avg_fill_price: 30_000.0,
        commission: 3.0,
        timestamp_ns: now_ns(),
        error_message: None,
    }
}

fn bench_signal_ring_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring/signal");
    group.significance_level(0.01).sample_size(1000);

    let ring = SignalRing::create(&format!("bench_signal_{}", std::process::id()), 1024).unwrap();
    let mut seq = 0u64;

    group.bench_function("push", |b| {
        b.iter(|| {
            let record = SignalRecord::new(black_box(seq), 0, "BTCUSDT", Side::Buy, 30_000.0, 1.0);
            seq += 1;
            black_box(ring.push(record));
            ring.pop();
        });
    });

    group.bench_function("push_then_pop", |b| {
        b.iter(|| {
            let record = SignalRecord::new(black_box(seq), 0, "BTCUSDT", Side::Buy, 30_000.0, 1.0);
            seq += 1;
            ring.push(record);
            black_box(ring.pop());
        });
    });

    group.finish();
}

fn bench_report_ring_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring/report");
    group.significance_level(0.01).sample_size(1000);

    let ring = ReportRing::create(&format!("bench_report_{}", std::process::id()), 1024).unwrap();
    let report = sample_order_report();

    group.bench_function("push_then_pop", |b| {
        b.iter(|| {
            ring.push(black_box(&report));
            black_box(ring.pop());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_signal_ring_push_pop, bench_report_ring_push);
criterion_main!(benches);
