//! Benchmark: TWAPScheduler execution planning
//!
//! Purpose: Measure slice-planning cost (spec §4.8) for executions of
//! varying slice counts, since `start_execution` runs on the controller's
//! dispatch path every time a signal is promoted to TWAP.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tes_core::core::{Side, TwapParams};
use tes_core::twap::{SliceSubmitter, TWAPScheduler, TwapSchedulerConfig};

struct NullSubmitter {
    calls: AtomicUsize,
}

impl SliceSubmitter for NullSubmitter {
    fn submit_slice(&self, _execution_id: &str, _symbol: &str, _side: Side, _quantity: f64, _price: f64) -> Option<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Some("ORD_bench".to_string())
    }

    fn cancel_child(&self, _order_id: &str) {}
}

fn params(total: f64, minutes: u32, slices: u32) -> TwapParams {
    TwapParams {
        total_quantity: total,
        duration_minutes: minutes,
        slice_count: slices,
        participation_rate: 1.0,
        price_tolerance: 0.01,
    }
}

fn bench_start_execution(c: &mut Criterion) {
    let mut group = c.benchmark_group("twap/start_execution");
    group.significance_level(0.01).sample_size(500);

    let submitter: Arc<dyn SliceSubmitter> = Arc::new(NullSubmitter { calls: AtomicUsize::new(0) });
    let scheduler = TWAPScheduler::new(submitter, TwapSchedulerConfig::default());

    for &slice_count in &[10u32, 50, 200] {
        group.bench_with_input(BenchmarkId::new("plan_slices", slice_count), &slice_count, |b, &slice_count| {
            b.iter(|| {
                black_box(scheduler.start_execution(
                    "bench".into(),
                    "BTCUSDT".into(),
                    Side::Buy,
                    params(100.0, 30, slice_count),
                ));
            });
        });
    }

    group.finish();
}

fn bench_pause_resume_cancel(c: &mut Criterion) {
    let mut group = c.benchmark_group("twap/lifecycle");
    group.significance_level(0.01).sample_size(500);

    let submitter: Arc<dyn SliceSubmitter> = Arc::new(NullSubmitter { calls: AtomicUsize::new(0) });
    let scheduler = TWAPScheduler::new(submitter, TwapSchedulerConfig::default());
    let id = scheduler.start_execution("bench".into(), "BTCUSDT".into(), Side::Buy, params(10.0, 10, 10));

    group.bench_function("pause_then_resume", |b| {
        b.iter(|| {
            black_box(scheduler.pause(&id));
            black_box(scheduler.resume(&id));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_start_execution, bench_pause_resume_cancel);
criterion_main!(benches);
