//! Benchmark: LockFreeQueue enqueue/dequeue
//!
//! Purpose: Measure the in-process hand-off between the signal pump and
//! worker threads (spec §4.3). Single-producer wait-free enqueue is the
//! common case; the contended multi-producer benchmark shows how dequeue
//! behaves under the "best-effort order" clause.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use std::thread;
use tes_core::queue::LockFreeQueue;

fn bench_single_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue/single_threaded");
    group.significance_level(0.01).sample_size(1000);

    let queue = LockFreeQueue::new();

    group.bench_function("enqueue_then_dequeue", |b| {
        b.iter(|| {
            queue.enqueue(black_box(42u64));
            black_box(queue.dequeue());
        });
    });

    group.finish();
}

fn bench_contended_producers(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue/contended");
    group.significance_level(0.01).sample_size(100);

    group.bench_function("four_producers_one_consumer", |b| {
        b.iter(|| {
            let queue = Arc::new(LockFreeQueue::new());
            let mut producers = Vec::new();
            for p in 0..4 {
                let queue = Arc::clone(&queue);
                producers.push(thread::spawn(move || {
                    for i in 0..250u64 {
                        queue.enqueue(p * 250 + i);
                    }
                }));
            }
            for handle in producers {
                handle.join().unwrap();
            }
            let mut drained = 0;
            while queue.dequeue().is_some() {
                drained += 1;
            }
            black_box(drained)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_threaded, bench_contended_producers);
criterion_main!(benches);
