//! Async callback fan-out: decouples callback invocation from the thread
//! producing the event (spec §4.5).
//!
//! Registrations live in a `RwLock<Vec<Registration>>` (many concurrent
//! publishers, rare registrations). `publish` enqueues into a bounded MPMC
//! channel without blocking; overflow increments `dropped_events` and
//! returns `false`. A single processing thread drains up to `batch_size`
//! events per pass and hands each one to the `ThreadPool` for dispatch —
//! events within one batch are handed off in publication order, but the
//! pool runs their dispatch tasks in parallel, so observers must not assume
//! serialized delivery across events (§5).

use crate::core::{AlgorithmExecution, Order, Trade, TradingRuleEvent};
use crate::threadpool::ThreadPool;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// The event types the manager fans out (§4.10: order events, trade events,
/// TWAP execution events, and rule-gate decisions).
#[derive(Debug, Clone)]
pub enum CallbackEvent {
    Order(Order),
    Trade(Trade),
    Execution(AlgorithmExecution),
    RuleViolation(TradingRuleEvent),
}

/// Type tag used for by-type registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Order,
    Trade,
    Execution,
    RuleViolation,
}

impl CallbackEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CallbackEvent::Order(_) => EventKind::Order,
            CallbackEvent::Trade(_) => EventKind::Trade,
            CallbackEvent::Execution(_) => EventKind::Execution,
            CallbackEvent::RuleViolation(_) => EventKind::RuleViolation,
        }
    }
}

pub type Callback = Box<dyn Fn(&CallbackEvent) + Send + Sync + 'static>;
pub type Predicate = Box<dyn Fn(&CallbackEvent) -> bool + Send + Sync + 'static>;

enum Filter {
    Kind(EventKind),
    Predicate(Predicate),
}

struct Registration {
    id: u64,
    filter: Filter,
    callback: Callback,
}

/// Opaque handle returned by `register*`, used to `unregister`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationId(u64);

/// Tuning knobs for [`AsyncCallbackManager`] (§4.5, §6 monitoring keys).
#[derive(Debug, Clone)]
pub struct CallbackManagerConfig {
    pub queue_capacity: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for CallbackManagerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 4096,
            batch_size: 64,
            flush_interval: Duration::from_millis(100),
        }
    }
}

struct Stats {
    dropped_events: AtomicU64,
    callback_errors: AtomicU64,
    /// EWMA(alpha=0.1) of batch processing time in nanoseconds, stored as
    /// `f64::to_bits` since there is no stable `AtomicF64`.
    avg_processing_ns: AtomicU64,
}

impl Stats {
    fn record_batch(&self, elapsed: Duration) {
        const ALPHA: f64 = 0.1;
        let sample = elapsed.as_nanos() as f64;
        let prev = f64::from_bits(self.avg_processing_ns.load(Ordering::Relaxed));
        let next = if prev == 0.0 {
            sample
        } else {
            ALPHA * sample + (1.0 - ALPHA) * prev
        };
        self.avg_processing_ns.store(next.to_bits(), Ordering::Relaxed);
    }
}

/// Decouples callback invocation from the event's producing thread.
pub struct AsyncCallbackManager {
    registrations: Arc<RwLock<Vec<Registration>>>,
    sender: crossbeam::channel::Sender<CallbackEvent>,
    next_id: AtomicU64,
    stats: Arc<Stats>,
    stop: Arc<AtomicBool>,
    processor: Option<std::thread::JoinHandle<()>>,
}

impl AsyncCallbackManager {
    pub fn start(config: CallbackManagerConfig, pool: Arc<ThreadPool>) -> Self {
        let (sender, receiver) = crossbeam::channel::bounded(config.queue_capacity);
        let registrations: Arc<RwLock<Vec<Registration>>> = Arc::new(RwLock::new(Vec::new()));
        let stats = Arc::new(Stats {
            dropped_events: AtomicU64::new(0),
            callback_errors: AtomicU64::new(0),
            avg_processing_ns: AtomicU64::new(0),
        });
        let stop = Arc::new(AtomicBool::new(false));

        let processor = {
            let registrations = Arc::clone(&registrations);
            let stats = Arc::clone(&stats);
            let stop = Arc::clone(&stop);
            let batch_size = config.batch_size;
            let flush_interval = config.flush_interval;
            std::thread::Builder::new()
                .name("tes-callback-processor".into())
                .spawn(move || {
                    Self::processing_loop(receiver, registrations, stats, stop, pool, batch_size, flush_interval)
                })
                .expect("failed to spawn callback processor thread")
        };

        Self {
            registrations,
            sender,
            next_id: AtomicU64::new(1),
            stats,
            stop,
            processor: Some(processor),
        }
    }

    fn processing_loop(
        receiver: crossbeam::channel::Receiver<CallbackEvent>,
        registrations: Arc<RwLock<Vec<Registration>>>,
        stats: Arc<Stats>,
        stop: Arc<AtomicBool>,
        pool: Arc<ThreadPool>,
        batch_size: usize,
        flush_interval: Duration,
    ) {
        while !stop.load(Ordering::Relaxed) {
            let start = std::time::Instant::now();
            let mut batch = Vec::with_capacity(batch_size);
            while batch.len() < batch_size {
                match receiver.try_recv() {
                    Ok(event) => batch.push(event),
                    Err(_) => break,
                }
            }
            if batch.is_empty() {
                std::thread::sleep(flush_interval);
                continue;
            }
            for event in batch {
                let registrations = Arc::clone(&registrations);
                let stats = Arc::clone(&stats);
                pool.submit_fire_and_forget(move || {
                    let guard = registrations.read();
                    for reg in guard.iter() {
                        let matches = match &reg.filter {
                            Filter::Kind(kind) => *kind == event.kind(),
                            Filter::Predicate(p) => p(&event),
                        };
                        if !matches {
                            continue;
                        }
                        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                            (reg.callback)(&event);
                        }));
                        if result.is_err() {
                            stats.callback_errors.fetch_add(1, Ordering::Relaxed);
                            warn!("callback handler panicked, suppressed");
                        }
                    }
                });
            }
            stats.record_batch(start.elapsed());
        }
    }

    /// Register a callback for every event of `kind`.
    pub fn register_kind(&self, kind: EventKind, callback: Callback) -> RegistrationId {
        self.register(Filter::Kind(kind), callback)
    }

    /// Register a callback gated by a user predicate.
    pub fn register_predicate(&self, predicate: Predicate, callback: Callback) -> RegistrationId {
        self.register(Filter::Predicate(predicate), callback)
    }

    fn register(&self, filter: Filter, callback: Callback) -> RegistrationId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.registrations.write().push(Registration { id, filter, callback });
        RegistrationId(id)
    }

    /// Unregistration takes effect for subsequent publishes; an invocation
    /// already in flight on the thread pool runs to completion (§5).
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let mut guard = self.registrations.write();
        let before = guard.len();
        guard.retain(|r| r.id != id.0);
        guard.len() != before
    }

    /// Non-blocking publish. `false` means the bounded queue was full; the
    /// event is dropped and `dropped_events` increments.
    pub fn publish(&self, event: CallbackEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                self.stats.dropped_events.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Batch publish: all-or-count — publishes as many as fit and returns
    /// how many succeeded (§4.5: "Batch publication is all-or-count").
    pub fn publish_batch(&self, events: impl IntoIterator<Item = CallbackEvent>) -> usize {
        events.into_iter().filter(|event| self.publish(event.clone())).count()
    }

    pub fn dropped_events(&self) -> u64 {
        self.stats.dropped_events.load(Ordering::Relaxed)
    }

    pub fn callback_errors(&self) -> u64 {
        self.stats.callback_errors.load(Ordering::Relaxed)
    }

    pub fn avg_processing_time_ns(&self) -> f64 {
        f64::from_bits(self.stats.avg_processing_ns.load(Ordering::Relaxed))
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.processor.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AsyncCallbackManager {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{now_ns, Side};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn sample_trade() -> Trade {
        Trade {
            order_id: "ORD_1_000001".into(),
            symbol: "BTCUSDT".into(),
            side: Side::Buy,
            price: 30_000.0,
            quantity: 1.0,
            commission: 0.01,
            timestamp_ns: now_ns(),
        }
    }

    #[test]
    fn registered_callback_receives_published_event() {
        let pool = Arc::new(ThreadPool::new(2));
        let mut manager = AsyncCallbackManager::start(CallbackManagerConfig::default(), pool);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = Arc::clone(&hits);
        manager.register_kind(
            EventKind::Trade,
            Box::new(move |_event| {
                hits2.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(manager.publish(CallbackEvent::Trade(sample_trade())));
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        manager.stop();
    }

    #[test]
    fn unregister_stops_future_delivery() {
        let pool = Arc::new(ThreadPool::new(2));
        let mut manager = AsyncCallbackManager::start(CallbackManagerConfig::default(), pool);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = Arc::clone(&hits);
        let id = manager.register_kind(
            EventKind::Trade,
            Box::new(move |_event| {
                hits2.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert!(manager.unregister(id));
        manager.publish(CallbackEvent::Trade(sample_trade()));
        std::thread::sleep(Duration::from_millis(300));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        manager.stop();
    }

    #[test]
    fn publish_overflow_increments_dropped_counter() {
        let pool = Arc::new(ThreadPool::new(1));
        let config = CallbackManagerConfig {
            queue_capacity: 1,
            batch_size: 1,
            flush_interval: Duration::from_secs(60),
        };
        let mut manager = AsyncCallbackManager::start(config, pool);
        // Flood far more publishes than the queue capacity (1) can hold
        // before the processor can drain any of them.
        let mut overflowed = false;
        for _ in 0..1000 {
            if !manager.publish(CallbackEvent::Trade(sample_trade())) {
                overflowed = true;
            }
        }
        manager.stop();
        assert!(overflowed, "expected at least one publish to overflow the bounded queue");
        assert!(manager.dropped_events() > 0);
    }
}
