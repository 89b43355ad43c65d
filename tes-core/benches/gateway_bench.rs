//! Benchmark: GatewayAdapter submit path and CircuitBreaker checks
//!
//! Purpose: Measure the overhead `GatewayAdapter` adds over a bare
//! `ExchangeClient` call (spec §4.9) in the steady-state closed-circuit
//! case, plus the raw cost of a circuit-breaker permission check, since
//! every order submission pays both.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tes_core::core::{Order, OrderType, Side, TimeInForce};
use tes_core::gateway::{GatewayAdapter, GatewayAdapterConfig, SimulatedExchangeClient};
use tes_core::resilience::{CircuitBreaker, CircuitBreakerConfig};
use std::sync::Arc;

fn sample_order(id: &str) -> Order {
    Order::new(
        id.to_string(),
        "bench".into(),
        "BTCUSDT".into(),
        Side::Buy,
        OrderType::Limit,
        TimeInForce::Ioc,
        1.0,
        30_000.0,
    )
}

fn bench_submit_order_closed_circuit(c: &mut Criterion) {
    let mut group = c.benchmark_group("gateway/submit_order");
    group.significance_level(0.01).sample_size(1000);

    let client = Arc::new(SimulatedExchangeClient::default());
    let adapter = GatewayAdapter::new(client, GatewayAdapterConfig::default());
    let mut counter = 0u64;

    group.bench_function("closed_circuit", |b| {
        b.iter(|| {
            counter += 1;
            let order = sample_order(&format!("ORD_bench_{counter}"));
            black_box(adapter.submit_order(&order).unwrap());
        });
    });

    group.finish();
}

fn bench_circuit_breaker_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("gateway/circuit_breaker");
    group.significance_level(0.01).sample_size(10000);

    let breaker = CircuitBreaker::new(CircuitBreakerConfig::default());

    group.bench_function("is_call_permitted_closed", |b| {
        b.iter(|| black_box(breaker.is_call_permitted()));
    });

    group.bench_function("record_success", |b| {
        b.iter(|| breaker.record_success());
    });

    group.finish();
}

criterion_group!(benches, bench_submit_order_closed_circuit, bench_circuit_breaker_check);
criterion_main!(benches);
