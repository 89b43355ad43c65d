//! Benchmark: AsyncCallbackManager publish path
//!
//! Purpose: Measure the cost of `publish` (bounded-channel enqueue, spec
//! §4.5) with varying numbers of registered observers, since this runs on
//! every order/trade/execution/rule-violation event and must not become a
//! bottleneck for the dispatch worker threads that call it.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tes_core::callback::{AsyncCallbackManager, CallbackEvent, CallbackManagerConfig, EventKind};
use tes_core::core::{OrderType, Side, TimeInForce};
use tes_core::threadpool::ThreadPool;

fn sample_event() -> CallbackEvent {
    CallbackEvent::Order(tes_core::core::Order::new(
        "ORD_1_000001".into(),
        "bench".into(),
        "BTCUSDT".into(),
        Side::Buy,
        OrderType::Limit,
        TimeInForce::Ioc,
        1.0,
        30_000.0,
    ))
}

fn bench_publish_with_n_observers(c: &mut Criterion) {
    let mut group = c.benchmark_group("callback/publish");
    group.significance_level(0.01).sample_size(500);

    for &observer_count in &[0usize, 1, 8] {
        group.bench_with_input(BenchmarkId::new("observers", observer_count), &observer_count, |b, &observer_count| {
            let pool = Arc::new(ThreadPool::new(2));
            let mut manager = AsyncCallbackManager::start(CallbackManagerConfig::default(), pool);
            for _ in 0..observer_count {
                manager.register_kind(EventKind::Order, Box::new(|_event| {}));
            }
            let event = sample_event();
            b.iter(|| {
                black_box(manager.publish(event.clone()));
            });
            manager.stop();
        });
    }

    group.finish();
}

criterion_group!(benches, bench_publish_with_n_observers);
criterion_main!(benches);
