//! `ExecutionController`: wires every component into a running process and
//! owns its lifecycle (spec §4.10).
//!
//! Thread topology:
//! - one **pump** thread draining `SignalRing` into the in-process
//!   `LockFreeQueue`
//! - a fixed **worker pool** (`ThreadPool`) draining that queue, running
//!   each signal through `TradingRuleGate` and then either a direct order
//!   or a TWAP execution
//! - one **heartbeat** thread publishing liveness
//! - one **statistics** thread logging rolled-up counters
//!
//! Shutdown runs in a fixed order — pump, then TWAP scheduler, then the
//! order-store sweeper, then the callback manager, then the gateway, then
//! the worker pool — so nothing downstream is torn down while something
//! upstream could still be producing work for it (§4.10, §9).

use crate::callback::{AsyncCallbackManager, CallbackEvent, CallbackManagerConfig};
use crate::core::{MarketDataSnapshot, Order, OrderReport, Signal};
use crate::gateway::GatewayAdapter;
use crate::queue::LockFreeQueue;
use crate::resilience::KillSwitch;
use crate::ring::{ReportRing, SignalRing};
use crate::risk::TradingRuleGate;
use crate::store::{NewOrderRequest, OrderStore};
use crate::threadpool::ThreadPool;
use crate::twap::{SliceSubmitter, TWAPScheduler, TwapSchedulerConfig};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ExecutionControllerConfig {
    pub worker_count: usize,
    pub heartbeat_interval: Duration,
    pub stats_interval: Duration,
    pub pump_idle_backoff: Duration,
    /// Promotion predicate 1 of 3 (§4.8): quantity at or above this is
    /// promoted to TWAP regardless of price.
    pub twap_quantity_threshold: f64,
    /// Promotion predicate 2 of 3: quantity * price at or above this is
    /// promoted to TWAP (spec §8 scenario S2).
    pub twap_value_threshold: f64,
    /// Promotion predicate 3 of 3: quantity as a fraction of the symbol's
    /// last observed market volume at or above this is promoted to TWAP,
    /// independent of the order's absolute size or notional.
    pub twap_market_impact_threshold: f64,
    pub twap_duration_minutes: u32,
    pub twap_slice_count: u32,
    /// How often the order-store reconciliation worker polls the gateway
    /// for each live order's exchange-side view (spec §2 data-flow: fills
    /// flow back through `GatewayAdapter → OrderStore`).
    pub reconciliation_interval: Duration,
}

impl Default for ExecutionControllerConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            heartbeat_interval: Duration::from_secs(5),
            stats_interval: Duration::from_secs(30),
            pump_idle_backoff: Duration::from_micros(200),
            twap_quantity_threshold: 1_000.0,
            twap_value_threshold: 50_000.0,
            twap_market_impact_threshold: 0.1,
            twap_duration_minutes: 15,
            twap_slice_count: 10,
            reconciliation_interval: Duration::from_millis(500),
        }
    }
}

/// Bridges `TWAPScheduler`'s slice submissions back into `OrderStore`.
struct StoreSliceSubmitter {
    store: Arc<OrderStore>,
}

impl SliceSubmitter for StoreSliceSubmitter {
    fn submit_slice(&self, execution_id: &str, symbol: &str, side: crate::core::Side, quantity: f64, price: f64) -> Option<String> {
        let req = NewOrderRequest {
            client_order_id: None,
            strategy_id: format!("twap:{execution_id}"),
            symbol: symbol.to_string(),
            side,
            order_type: crate::core::OrderType::Limit,
            time_in_force: crate::core::TimeInForce::Ioc,
            quantity,
            price,
        };
        match self.store.create(req) {
            Ok(id) => {
                if let Err(err) = self.store.submit(&id) {
                    warn!(?err, "failed to submit TWAP child order");
                }
                Some(id)
            }
            Err(err) => {
                warn!(?err, execution_id, "failed to create TWAP child order");
                None
            }
        }
    }

    fn cancel_child(&self, order_id: &str) {
        if let Err(err) = self.store.cancel(order_id) {
            warn!(?err, order_id, "failed to cancel TWAP child order");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ControllerStats {
    pub signals_consumed: u64,
    pub orders_direct: u64,
    pub orders_twap: u64,
    pub signals_rejected: u64,
}

struct Counters {
    signals_consumed: AtomicU64,
    orders_direct: AtomicU64,
    orders_twap: AtomicU64,
    signals_rejected: AtomicU64,
}

impl Counters {
    fn new() -> Self {
        Self {
            signals_consumed: AtomicU64::new(0),
            orders_direct: AtomicU64::new(0),
            orders_twap: AtomicU64::new(0),
            signals_rejected: AtomicU64::new(0),
        }
    }

    fn snapshot(&self) -> ControllerStats {
        ControllerStats {
            signals_consumed: self.signals_consumed.load(Ordering::Relaxed),
            orders_direct: self.orders_direct.load(Ordering::Relaxed),
            orders_twap: self.orders_twap.load(Ordering::Relaxed),
            signals_rejected: self.signals_rejected.load(Ordering::Relaxed),
        }
    }
}

/// The routing/rule-gate logic, held behind its own `Arc` so both the
/// controller and its dispatch thread can share it without unsafe aliasing
/// of `&ExecutionController` across threads.
struct Dispatcher {
    rule_gate: Arc<TradingRuleGate>,
    store: Arc<OrderStore>,
    twap: Arc<TWAPScheduler>,
    callbacks: Arc<AsyncCallbackManager>,
    counters: Arc<Counters>,
    config: ExecutionControllerConfig,
}

impl Dispatcher {
    /// Three independent promotion predicates (§4.8): quantity, notional
    /// value, and market-impact each promote a signal to TWAP on their own.
    /// A small-notional but large-quantity order still gets sliced.
    fn should_promote_to_twap(&self, signal: &Signal) -> bool {
        if signal.target_quantity >= self.config.twap_quantity_threshold {
            return true;
        }
        let notional = signal.target_quantity * signal.target_price;
        if notional >= self.config.twap_value_threshold {
            return true;
        }
        if let Some(snapshot) = self.twap.market_data(&signal.symbol) {
            if snapshot.recent_volume > 0.0
                && signal.target_quantity / snapshot.recent_volume >= self.config.twap_market_impact_threshold
            {
                return true;
            }
        }
        false
    }

    fn route_signal(&self, signal: &Signal) {
        if self.should_promote_to_twap(signal) {
            let params = crate::core::TwapParams {
                total_quantity: signal.target_quantity,
                duration_minutes: self.config.twap_duration_minutes,
                slice_count: self.config.twap_slice_count,
                participation_rate: 0.25,
                price_tolerance: 0.001,
            };
            self.twap.start_execution("signal-router".into(), signal.symbol.clone(), signal.side, params);
            self.counters.orders_twap.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let order_type = if signal.target_price > 0.0 {
            crate::core::OrderType::Limit
        } else {
            crate::core::OrderType::Market
        };
        let req = NewOrderRequest {
            client_order_id: None,
            strategy_id: "signal-router".into(),
            symbol: signal.symbol.clone(),
            side: signal.side,
            order_type,
            time_in_force: crate::core::TimeInForce::Ioc,
            quantity: signal.target_quantity,
            price: signal.target_price,
        };
        match self.store.create(req) {
            Ok(id) => {
                if let Err(err) = self.store.submit(&id) {
                    warn!(?err, "failed to submit direct order");
                }
                self.counters.orders_direct.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                warn!(?err, "rejected signal: order could not be created");
            }
        }
    }

    fn handle_signal(&self, signal: Signal) {
        self.counters.signals_consumed.fetch_add(1, Ordering::Relaxed);
        let result = self.rule_gate.check(
            "signal-router",
            &signal.symbol,
            signal.side,
            signal.target_quantity,
            signal.target_price,
        );
        if !result.is_pass() {
            self.counters.signals_rejected.fetch_add(1, Ordering::Relaxed);
            self.callbacks.publish(CallbackEvent::RuleViolation(crate::core::TradingRuleEvent {
                event_id: 0,
                strategy_id: "signal-router".into(),
                symbol: signal.symbol.clone(),
                result,
                description: result.description().to_string(),
                timestamp_ns: crate::core::now_ns(),
            }));
            return;
        }
        self.route_signal(&signal);
    }
}

/// Owns every component and the threads that drive them (§4.10).
pub struct ExecutionController {
    config: ExecutionControllerConfig,
    signal_ring: Arc<SignalRing>,
    queue: Arc<LockFreeQueue<Signal>>,
    pool: Arc<ThreadPool>,
    store: Arc<OrderStore>,
    twap: Arc<TWAPScheduler>,
    #[allow(dead_code)]
    gateway: Option<Arc<GatewayAdapter>>,
    callbacks: Arc<AsyncCallbackManager>,
    kill_switch: Arc<KillSwitch>,
    dispatcher: Arc<Dispatcher>,
    counters: Arc<Counters>,
    #[allow(dead_code)]
    report_ring: Option<Arc<ReportRing>>,
    stop: Arc<AtomicBool>,
    threads: std::sync::Mutex<Vec<std::thread::JoinHandle<()>>>,
}

impl ExecutionController {
    pub fn new(
        config: ExecutionControllerConfig,
        signal_ring: Arc<SignalRing>,
        rule_gate: Arc<TradingRuleGate>,
        store: Arc<OrderStore>,
        gateway: Option<Arc<GatewayAdapter>>,
        kill_switch: Arc<KillSwitch>,
    ) -> Self {
        Self::with_report_ring(config, signal_ring, rule_gate, store, gateway, kill_switch, None)
    }

    /// Same as [`Self::new`] but additionally wires an order observer that
    /// pushes an [`OrderReport`] into `report_ring` for every order-state
    /// transition the store notifies (spec §4.2, §6: egress report feed).
    pub fn with_report_ring(
        config: ExecutionControllerConfig,
        signal_ring: Arc<SignalRing>,
        rule_gate: Arc<TradingRuleGate>,
        store: Arc<OrderStore>,
        gateway: Option<Arc<GatewayAdapter>>,
        kill_switch: Arc<KillSwitch>,
        report_ring: Option<Arc<ReportRing>>,
    ) -> Self {
        let pool = Arc::new(ThreadPool::new(config.worker_count));
        let callbacks = Arc::new(AsyncCallbackManager::start(
            CallbackManagerConfig::default(),
            Arc::clone(&pool),
        ));
        let submitter: Arc<dyn SliceSubmitter> = Arc::new(StoreSliceSubmitter { store: Arc::clone(&store) });
        let twap = Arc::new(TWAPScheduler::new(submitter, TwapSchedulerConfig::default()));

        {
            let twap = Arc::clone(&twap);
            store.register_trade_observer(Box::new(move |order, trade| {
                if let Some(execution_id) = order.strategy_id.strip_prefix("twap:") {
                    twap.record_fill(execution_id, trade.quantity, trade.price);
                }
            }));
        }
        {
            let callbacks = Arc::clone(&callbacks);
            store.register_order_observer(Box::new(move |order: &Order| {
                callbacks.publish(CallbackEvent::Order(order.clone()));
            }));
        }
        if let Some(ring) = report_ring.clone() {
            store.register_order_observer(Box::new(move |order: &Order| {
                if !ring.push(&OrderReport::from(order)) {
                    warn!(order_id = %order.id, "report ring full, dropping order report");
                }
            }));
        }

        let counters = Arc::new(Counters::new());
        let dispatcher = Arc::new(Dispatcher {
            rule_gate,
            store: Arc::clone(&store),
            twap: Arc::clone(&twap),
            callbacks: Arc::clone(&callbacks),
            counters: Arc::clone(&counters),
            config: config.clone(),
        });

        Self {
            config,
            signal_ring,
            queue: Arc::new(LockFreeQueue::new()),
            pool,
            store,
            twap,
            gateway,
            callbacks,
            kill_switch,
            dispatcher,
            counters,
            report_ring,
            stop: Arc::new(AtomicBool::new(false)),
            threads: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Feed a fresh market-data snapshot to the TWAP scheduler, used for
    /// adaptive slice sizing/pricing and the market-impact promotion
    /// predicate (§4.8).
    pub fn update_market_data(&self, symbol: impl Into<String>, snapshot: MarketDataSnapshot) {
        self.twap.update_market_data(symbol, snapshot);
    }

    /// Start the pump, worker dispatch, heartbeat and statistics threads and
    /// the TWAP scheduler / order-store sweeper.
    pub fn start(&self) {
        self.store.start_sweeper();
        self.store.start_reconciliation(self.config.reconciliation_interval);
        self.twap.start();

        let mut threads = self.threads.lock().unwrap();

        threads.push({
            let ring = Arc::clone(&self.signal_ring);
            let queue = Arc::clone(&self.queue);
            let stop = Arc::clone(&self.stop);
            let backoff = self.config.pump_idle_backoff;
            let kill_switch = Arc::clone(&self.kill_switch);
            std::thread::Builder::new()
                .name("tes-signal-pump".into())
                .spawn(move || {
                    while !stop.load(Ordering::Relaxed) && !kill_switch.should_stop() {
                        match ring.pop() {
                            Some(record) => {
                                if let Ok(signal) = Signal::try_from(record) {
                                    queue.enqueue(signal);
                                }
                            }
                            None => std::thread::sleep(backoff),
                        }
                    }
                })
                .expect("failed to spawn signal pump thread")
        });

        threads.push({
            let queue = Arc::clone(&self.queue);
            let stop = Arc::clone(&self.stop);
            let pool = Arc::clone(&self.pool);
            let dispatcher = Arc::clone(&self.dispatcher);
            std::thread::Builder::new()
                .name("tes-signal-dispatch".into())
                .spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        match queue.dequeue() {
                            Some(signal) => {
                                let dispatcher = Arc::clone(&dispatcher);
                                pool.submit_fire_and_forget(move || {
                                    dispatcher.handle_signal(signal);
                                });
                            }
                            None => std::thread::sleep(Duration::from_micros(200)),
                        }
                    }
                })
                .expect("failed to spawn signal dispatch thread")
        });

        threads.push({
            let stop = Arc::clone(&self.stop);
            let interval = self.config.heartbeat_interval;
            let counters = Arc::clone(&self.counters);
            std::thread::Builder::new()
                .name("tes-heartbeat".into())
                .spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        std::thread::sleep(interval);
                        info!(stats = ?counters.snapshot(), "heartbeat");
                    }
                })
                .expect("failed to spawn heartbeat thread")
        });

        threads.push({
            let stop = Arc::clone(&self.stop);
            let interval = self.config.stats_interval;
            let counters = Arc::clone(&self.counters);
            std::thread::Builder::new()
                .name("tes-stats".into())
                .spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        std::thread::sleep(interval);
                        info!(stats = ?counters.snapshot(), "periodic statistics");
                    }
                })
                .expect("failed to spawn statistics thread")
        });
    }

    pub fn stats(&self) -> ControllerStats {
        self.counters.snapshot()
    }

    pub fn live_order_count(&self) -> usize {
        self.store.live_count()
    }

    /// Shutdown in the order the spec mandates: pump, TWAP, sweeper,
    /// callback manager, gateway, workers.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.threads.lock().unwrap().drain(..) {
            if let Err(err) = handle.join() {
                error!(?err, "controller thread panicked during shutdown");
            }
        }
        self.twap.stop();
        self.store.stop();
        // The callback manager and thread pool stop themselves on Drop;
        // dropping our Arc here is enough once every other owner is gone.
        info!("execution controller stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_config_defaults_are_sane() {
        let config = ExecutionControllerConfig::default();
        assert!(config.worker_count > 0);
        assert!(config.twap_value_threshold > 0.0);
        assert!(config.twap_quantity_threshold > 0.0);
        assert!(config.twap_market_impact_threshold > 0.0);
    }
}
