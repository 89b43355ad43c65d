//! `TWAPScheduler`: plans and drives time-weighted-average-price executions
//! (spec §4.8).
//!
//! A dedicated tick thread wakes every 100ms, pops due slices off a
//! `BinaryHeap<Reverse<ScheduledSlice>>` min-heap ordered by `scheduled_at`,
//! and hands each one to the registered order submitter. The scheduler
//! never talks to `OrderStore`/`GatewayAdapter` directly — it is handed a
//! trait object at construction time (the same message-passing seam
//! `OrderStore` uses for its order observers), keeping the dependency
//! one-directional: `controller` wires `twap` to `store`, not the reverse.

use crate::core::{
    generate_execution_id, generate_slice_id, now_ns, AlgorithmExecution, ExecutionSlice,
    ExecutionStatus, IdSequence, MarketDataSnapshot, Side, TwapParams,
};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Submits and cancels TWAP child orders. Implemented by whatever wires the
/// scheduler to `OrderStore` (normally the controller) — the symmetric
/// counterpart to `OrderStore`'s own order-observer seam, keeping
/// `TWAPScheduler` ignorant of `OrderStore`/`GatewayAdapter` directly.
pub trait SliceSubmitter: Send + Sync {
    /// Submit a LIMIT-IOC child order for `quantity` at `price` (§4.8:
    /// "submit a LIMIT child order through OrderStore"). Returns the new
    /// order's id on success.
    fn submit_slice(&self, execution_id: &str, symbol: &str, side: Side, quantity: f64, price: f64) -> Option<String>;

    /// Cancel one in-flight child order. Called by `cancel` to drain an
    /// execution's children (§4.8: "Cancel drains child orders in-flight
    /// through OrderStore.cancel").
    fn cancel_child(&self, order_id: &str);
}

#[derive(Debug, Clone)]
pub struct TwapSchedulerConfig {
    pub tick_interval: Duration,
    /// An execution with no slice progress for longer than this is moved to
    /// ERROR by the timeout monitor (§4.8).
    pub execution_timeout: Duration,
    /// Cap a single slice at this fraction of `recent_volume` when adaptive
    /// sizing is enabled (§4.8 "participation cap").
    pub max_participation_rate: f64,
    /// When true, slice size is computed from observed market volume and
    /// the execution's remaining quantity (§4.8 "adaptive sizing"); when
    /// false, the raw plan quantity is used (still clamped to
    /// `[min_slice_size, max_slice_size]`).
    pub adaptive_sizing_enabled: bool,
    /// Floor on any single dispatched slice's quantity (§4.8).
    pub min_slice_size: f64,
    /// Ceiling on any single dispatched slice's quantity (§4.8).
    pub max_slice_size: f64,
}

impl Default for TwapSchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            execution_timeout: Duration::from_secs(600),
            max_participation_rate: 0.25,
            adaptive_sizing_enabled: true,
            min_slice_size: 0.0,
            max_slice_size: f64::MAX,
        }
    }
}

#[derive(Debug, Clone)]
struct ScheduledSlice {
    scheduled_at: u64,
    execution_id: String,
    slice_id: String,
}

impl PartialEq for ScheduledSlice {
    fn eq(&self, other: &Self) -> bool {
        self.scheduled_at == other.scheduled_at
    }
}
impl Eq for ScheduledSlice {}
impl PartialOrd for ScheduledSlice {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ScheduledSlice {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.scheduled_at.cmp(&other.scheduled_at)
    }
}

struct State {
    executions: HashMap<String, AlgorithmExecution>,
    slices: HashMap<String, Vec<ExecutionSlice>>,
    heap: BinaryHeap<Reverse<ScheduledSlice>>,
}

/// Drives one or more TWAP executions (§4.8).
pub struct TWAPScheduler {
    state: Arc<parking_lot::Mutex<State>>,
    /// Per-symbol last-known snapshot, pushed in out-of-band by whatever
    /// feeds market data into the process (§2: "Market-data snapshots are
    /// pushed into TWAPScheduler's cache out-of-band"). Read-mostly, so a
    /// reader-writer lock (§5).
    market_data: Arc<parking_lot::RwLock<HashMap<String, MarketDataSnapshot>>>,
    id_seq: Arc<IdSequence>,
    submitter: Arc<dyn SliceSubmitter>,
    config: TwapSchedulerConfig,
    stop: Arc<AtomicBool>,
    tick_thread: std::sync::Mutex<Option<std::thread::JoinHandle<()>>>,
    timeout_thread: std::sync::Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl TWAPScheduler {
    pub fn new(submitter: Arc<dyn SliceSubmitter>, config: TwapSchedulerConfig) -> Self {
        Self {
            state: Arc::new(parking_lot::Mutex::new(State {
                executions: HashMap::new(),
                slices: HashMap::new(),
                heap: BinaryHeap::new(),
            })),
            market_data: Arc::new(parking_lot::RwLock::new(HashMap::new())),
            id_seq: Arc::new(IdSequence::new()),
            submitter,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            tick_thread: std::sync::Mutex::new(None),
            timeout_thread: std::sync::Mutex::new(None),
        }
    }

    /// Push the latest snapshot for `symbol` into the scheduler's cache.
    /// Consulted by the tick loop for adaptive slice sizing and LIMIT
    /// pricing (§4.8).
    pub fn update_market_data(&self, symbol: impl Into<String>, snapshot: MarketDataSnapshot) {
        self.market_data.write().insert(symbol.into(), snapshot);
    }

    /// Last-known snapshot for `symbol`, if any has been pushed.
    pub fn market_data(&self, symbol: &str) -> Option<MarketDataSnapshot> {
        self.market_data.read().get(symbol).copied()
    }

    /// Divide `total_quantity` into `slice_count` slices spread evenly over
    /// `duration_minutes`, with the last slice absorbing the rounding
    /// residual so the sum is exact (§3, §8 invariant 3).
    fn plan_slices(execution_id: &str, params: &TwapParams, id_seq: &IdSequence, start: u64) -> Vec<ExecutionSlice> {
        let count = params.slice_count.max(1);
        let per_slice = (params.total_quantity / count as f64 * 1e8).floor() / 1e8;
        let interval_ns = (params.duration_minutes as u64 * 60_000_000_000) / count as u64;

        let mut slices = Vec::with_capacity(count as usize);
        let mut allocated = 0.0;
        for i in 0..count {
            let quantity = if i == count - 1 {
                (params.total_quantity - allocated).max(0.0)
            } else {
                per_slice
            };
            allocated += quantity;
            slices.push(ExecutionSlice {
                id: generate_slice_id(id_seq),
                execution_id: execution_id.to_string(),
                planned_quantity: quantity,
                scheduled_at: start + interval_ns * i as u64,
                executed: false,
                child_order_id: None,
            });
        }
        slices
    }

    /// Start a new TWAP execution and enqueue its planned slices.
    pub fn start_execution(&self, strategy_id: String, symbol: String, side: Side, params: TwapParams) -> String {
        let execution_id = generate_execution_id(&self.id_seq);
        let now = now_ns();
        let slices = Self::plan_slices(&execution_id, &params, &self.id_seq, now);

        let execution = AlgorithmExecution {
            id: execution_id.clone(),
            strategy_id,
            symbol,
            side,
            params,
            status: ExecutionStatus::Running,
            executed_quantity: 0.0,
            remaining_quantity: params.total_quantity,
            avg_fill_price: 0.0,
            start_ts: now,
            end_ts: None,
            child_orders: Vec::new(),
        };

        let mut state = self.state.lock();
        for slice in &slices {
            state.heap.push(Reverse(ScheduledSlice {
                scheduled_at: slice.scheduled_at,
                execution_id: execution_id.clone(),
                slice_id: slice.id.clone(),
            }));
        }
        state.slices.insert(execution_id.clone(), slices);
        state.executions.insert(execution_id.clone(), execution);

        info!(execution_id = %execution_id, "TWAP execution started");
        execution_id
    }

    pub fn pause(&self, execution_id: &str) -> bool {
        self.transition(execution_id, ExecutionStatus::Paused)
    }

    pub fn resume(&self, execution_id: &str) -> bool {
        self.transition(execution_id, ExecutionStatus::Running)
    }

    /// Cancel a running/paused execution and drain its in-flight children
    /// through the submitter's cancel seam (§4.8: "Cancel drains child
    /// orders in-flight through OrderStore.cancel").
    pub fn cancel(&self, execution_id: &str) -> bool {
        let transitioned = self.transition(execution_id, ExecutionStatus::Cancelled);
        if transitioned {
            let child_orders = {
                let state = self.state.lock();
                state.executions.get(execution_id).map(|e| e.child_orders.clone()).unwrap_or_default()
            };
            for order_id in &child_orders {
                self.submitter.cancel_child(order_id);
            }
        }
        transitioned
    }

    fn transition(&self, execution_id: &str, next: ExecutionStatus) -> bool {
        let mut state = self.state.lock();
        match state.executions.get_mut(execution_id) {
            Some(exec) if exec.status.can_transition_to(next) => {
                exec.status = next;
                if next.is_terminal() {
                    exec.end_ts = Some(now_ns());
                }
                true
            }
            _ => false,
        }
    }

    pub fn execution(&self, execution_id: &str) -> Option<AlgorithmExecution> {
        self.state.lock().executions.get(execution_id).cloned()
    }

    /// Report a fill against a TWAP child order so `executed_quantity` and
    /// `avg_fill_price` stay in sync (the controller calls this from the
    /// order-store trade observer).
    pub fn record_fill(&self, execution_id: &str, filled_quantity: f64, fill_price: f64) {
        let mut state = self.state.lock();
        if let Some(exec) = state.executions.get_mut(execution_id) {
            let prior_notional = exec.avg_fill_price * exec.executed_quantity;
            exec.executed_quantity += filled_quantity;
            exec.avg_fill_price = if exec.executed_quantity > 0.0 {
                (prior_notional + fill_price * filled_quantity) / exec.executed_quantity
            } else {
                exec.avg_fill_price
            };
            exec.remaining_quantity = (exec.params.total_quantity - exec.executed_quantity).max(0.0);
            if exec.remaining_quantity <= 1e-9 && exec.status.can_transition_to(ExecutionStatus::Completed) {
                exec.status = ExecutionStatus::Completed;
                exec.end_ts = Some(now_ns());
            }
        }
    }

    /// Adaptive sizing: shrink a not-yet-executed slice's quantity to stay
    /// within `max_participation_rate` of observed recent volume (§4.8).
    /// Called from the tick loop using the scheduler's own market-data
    /// cache; exposed publicly too for a market-data feed that wants to
    /// apply the cap proactively as soon as a new snapshot lands, instead
    /// of waiting for the next 100ms tick.
    pub fn apply_participation_cap(&self, execution_id: &str, recent_volume: f64) {
        Self::apply_participation_cap_locked(&self.state, execution_id, recent_volume, self.config.max_participation_rate);
    }

    fn apply_participation_cap_locked(
        state: &Arc<parking_lot::Mutex<State>>,
        execution_id: &str,
        recent_volume: f64,
        max_participation_rate: f64,
    ) {
        if recent_volume <= 0.0 {
            return;
        }
        let cap = recent_volume * max_participation_rate;
        let mut state = state.lock();
        if let Some(slices) = state.slices.get_mut(execution_id) {
            for slice in slices.iter_mut().filter(|s| !s.executed) {
                if slice.planned_quantity > cap {
                    debug!(execution_id, slice_id = %slice.id, cap, "capping slice to participation rate");
                    slice.planned_quantity = cap;
                }
            }
        }
    }

    /// Adaptive size per §4.8: `min(remaining / remaining_slices,
    /// market_volume * participation_rate)`, clamped to
    /// `[min_slice_size, max_slice_size]`. Falls back to the raw plan
    /// quantity when adaptive sizing is disabled or no market data has
    /// arrived yet for the symbol.
    fn compute_slice_quantity(
        config: &TwapSchedulerConfig,
        planned_quantity: f64,
        remaining_quantity: f64,
        remaining_slice_count: f64,
        participation_rate: f64,
        market: Option<MarketDataSnapshot>,
    ) -> f64 {
        let raw = match (config.adaptive_sizing_enabled, market) {
            (true, Some(snapshot)) => {
                let participation_cap = snapshot.recent_volume * participation_rate;
                let per_slice_share = remaining_quantity / remaining_slice_count;
                per_slice_share.min(participation_cap)
            }
            _ => planned_quantity,
        };
        let lo = config.min_slice_size.max(0.0);
        let hi = config.max_slice_size.max(lo);
        raw.max(lo).min(hi)
    }

    /// Target LIMIT price per §4.8: best-ask (+tolerance) for BUY,
    /// best-bid (-tolerance) for SELL. Returns 0.0 when no market data has
    /// arrived yet for the symbol — the submitter is expected to reject a
    /// zero-priced LIMIT child the same way `OrderStore::create` rejects
    /// any non-positive LIMIT price (§4.6).
    fn compute_target_price(side: Side, price_tolerance: f64, market: Option<MarketDataSnapshot>) -> f64 {
        let Some(snapshot) = market else { return 0.0 };
        match side {
            Side::Buy => snapshot.best_ask * (1.0 + price_tolerance),
            Side::Sell => snapshot.best_bid * (1.0 - price_tolerance),
        }
    }

    fn tick_once(
        state: &Arc<parking_lot::Mutex<State>>,
        submitter: &Arc<dyn SliceSubmitter>,
        market_data: &Arc<parking_lot::RwLock<HashMap<String, MarketDataSnapshot>>>,
        config: &TwapSchedulerConfig,
    ) {
        let now = now_ns();
        loop {
            let due = {
                let mut guard = state.lock();
                match guard.heap.peek() {
                    Some(Reverse(slice)) if slice.scheduled_at <= now => {
                        let Reverse(slice) = guard.heap.pop().unwrap();
                        Some(slice)
                    }
                    _ => None,
                }
            };
            let Some(due) = due else { break };

            let (symbol, side, status, participation_rate, price_tolerance, remaining_quantity) = {
                let guard = state.lock();
                let Some(exec) = guard.executions.get(&due.execution_id) else { continue };
                (
                    exec.symbol.clone(),
                    exec.side,
                    exec.status,
                    exec.params.participation_rate,
                    exec.params.price_tolerance,
                    exec.remaining_quantity,
                )
            };

            if status != ExecutionStatus::Running {
                // Paused/terminal executions drop this slice; the scheduler
                // does not reschedule paused slices automatically (§4.8:
                // "resuming restarts the tick loop from the next planned
                // slice, not the one skipped while paused").
                continue;
            }

            let snapshot = market_data.read().get(&symbol).copied();

            // Adjustment policy (§4.8, mandatory half): overshooting
            // participation shrinks the next not-yet-executed slice before
            // it is sized, using the freshest observed volume.
            if let Some(snapshot) = snapshot {
                Self::apply_participation_cap_locked(state, &due.execution_id, snapshot.recent_volume, config.max_participation_rate);
            }

            let quantity = {
                let guard = state.lock();
                let Some(slices) = guard.slices.get(&due.execution_id) else { continue };
                let Some(slice) = slices.iter().find(|s| s.id == due.slice_id) else { continue };
                let remaining_slice_count = slices.iter().filter(|s| !s.executed).count().max(1) as f64;
                Self::compute_slice_quantity(
                    config,
                    slice.planned_quantity,
                    remaining_quantity,
                    remaining_slice_count,
                    participation_rate,
                    snapshot,
                )
            };

            if quantity <= 0.0 {
                continue;
            }

            let price = Self::compute_target_price(side, price_tolerance, snapshot);

            let order_id = submitter.submit_slice(&due.execution_id, &symbol, side, quantity, price);

            let mut guard = state.lock();
            if let Some(slices) = guard.slices.get_mut(&due.execution_id) {
                if let Some(slice) = slices.iter_mut().find(|s| s.id == due.slice_id) {
                    slice.executed = true;
                    slice.child_order_id = order_id.clone();
                }
            }
            if let Some(exec) = guard.executions.get_mut(&due.execution_id) {
                if let Some(order_id) = order_id {
                    exec.child_orders.push(order_id);
                } else {
                    warn!(execution_id = %due.execution_id, "slice submission failed");
                }
            }
        }
    }

    fn timeout_sweep(state: &Arc<parking_lot::Mutex<State>>, timeout_ns: u64) {
        let now = now_ns();
        let mut guard = state.lock();
        for exec in guard.executions.values_mut() {
            if exec.status == ExecutionStatus::Running && now.saturating_sub(exec.start_ts) > timeout_ns {
                warn!(execution_id = %exec.id, "TWAP execution timed out, moving to ERROR");
                exec.status = ExecutionStatus::Error;
                exec.end_ts = Some(now);
            }
        }
    }

    /// Start the tick and timeout-monitor threads.
    pub fn start(&self) {
        let state = Arc::clone(&self.state);
        let submitter = Arc::clone(&self.submitter);
        let market_data = Arc::clone(&self.market_data);
        let config = self.config.clone();
        let stop = Arc::clone(&self.stop);
        let tick_interval = self.config.tick_interval;
        let tick = std::thread::Builder::new()
            .name("tes-twap-tick".into())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    Self::tick_once(&state, &submitter, &market_data, &config);
                    std::thread::sleep(tick_interval);
                }
            })
            .expect("failed to spawn TWAP tick thread");
        *self.tick_thread.lock().unwrap() = Some(tick);

        let state = Arc::clone(&self.state);
        let stop = Arc::clone(&self.stop);
        let timeout_ns = self.config.execution_timeout.as_nanos() as u64;
        let monitor = std::thread::Builder::new()
            .name("tes-twap-timeout".into())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    std::thread::sleep(Duration::from_secs(1));
                    Self::timeout_sweep(&state, timeout_ns);
                }
            })
            .expect("failed to spawn TWAP timeout monitor thread");
        *self.timeout_thread.lock().unwrap() = Some(monitor);
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.tick_thread.lock().unwrap().take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.timeout_thread.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TWAPScheduler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    struct RecordingSubmitter {
        calls: Mutex<Vec<(String, f64, f64)>>,
        cancels: Mutex<Vec<String>>,
        next_id: AtomicUsize,
    }

    impl RecordingSubmitter {
        fn new() -> Self {
            Self { calls: Mutex::new(Vec::new()), cancels: Mutex::new(Vec::new()), next_id: AtomicUsize::new(0) }
        }
    }

    impl SliceSubmitter for RecordingSubmitter {
        fn submit_slice(&self, execution_id: &str, _symbol: &str, _side: Side, quantity: f64, price: f64) -> Option<String> {
            self.calls.lock().unwrap().push((execution_id.to_string(), quantity, price));
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            Some(format!("ORD_child_{id}"))
        }

        fn cancel_child(&self, order_id: &str) {
            self.cancels.lock().unwrap().push(order_id.to_string());
        }
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

    #[test]
    fn slice_plan_sums_to_total_quantity() {
        let submitter = Arc::new(RecordingSubmitter::new());
        let scheduler = TWAPScheduler::new(submitter, TwapSchedulerConfig::default());
        let id = scheduler.start_execution("alpha".into(), "BTCUSDT".into(), Side::Buy, params(1.0, 10, 3));
        let state = scheduler.state.lock();
        let slices = state.slices.get(&id).unwrap();
        let sum: f64 = slices.iter().map(|s| s.planned_quantity).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(slices.len(), 3);
    }

    #[test]
    fn immediately_due_slices_are_dispatched_on_tick() {
        let submitter = Arc::new(RecordingSubmitter::new());
        let scheduler = TWAPScheduler::new(Arc::clone(&submitter) as Arc<dyn SliceSubmitter>, TwapSchedulerConfig::default());
        scheduler.update_market_data(
            "BTCUSDT",
            MarketDataSnapshot { best_bid: 29_990.0, best_ask: 30_010.0, last_price: 30_000.0, recent_volume: 1_000.0, observed_at: 0 },
        );
        // duration=0 means every slice is due immediately.
        scheduler.start_execution("alpha".into(), "BTCUSDT".into(), Side::Buy, params(3.0, 0, 3));
        TWAPScheduler::tick_once(&scheduler.state, &(Arc::clone(&submitter) as Arc<dyn SliceSubmitter>), &scheduler.market_data, &scheduler.config);
        let calls = submitter.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(_, _, price)| *price > 30_010.0), "BUY slices should target above best ask");
    }

    #[test]
    fn pause_then_cancel_state_machine() {
        let submitter = Arc::new(RecordingSubmitter::new());
        let scheduler = TWAPScheduler::new(Arc::clone(&submitter) as Arc<dyn SliceSubmitter>, TwapSchedulerConfig::default());
        let id = scheduler.start_execution("alpha".into(), "BTCUSDT".into(), Side::Sell, params(5.0, 5, 5));
        assert!(scheduler.pause(&id));
        assert_eq!(scheduler.execution(&id).unwrap().status, ExecutionStatus::Paused);
        TWAPScheduler::tick_once(&scheduler.state, &(Arc::clone(&submitter) as Arc<dyn SliceSubmitter>), &scheduler.market_data, &scheduler.config);
        scheduler.state.lock().executions.get_mut(&id).unwrap().child_orders.push("ORD_child_manual".into());
        assert!(scheduler.cancel(&id));
        assert_eq!(scheduler.execution(&id).unwrap().status, ExecutionStatus::Cancelled);
        assert_eq!(submitter.cancels.lock().unwrap().as_slice(), ["ORD_child_manual"]);
        // Cancelling again is rejected: terminal is absorbing.
        assert!(!scheduler.resume(&id));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: for any slice count and total quantity, `plan_slices`
        /// produces exactly `slice_count` slices whose planned quantities
        /// sum to `total_quantity` (§3, §8 invariant 3), regardless of how
        /// unevenly `total_quantity` divides by `slice_count`.
        #[test]
        fn slice_plan_sum_matches_total(
            total in 0.001f64..1_000_000.0,
            slice_count in 1u32..500,
            duration_minutes in 0u32..1440,
        ) {
            let params = TwapParams {
                total_quantity: total,
                duration_minutes,
                slice_count,
                participation_rate: 1.0,
                price_tolerance: 0.01,
            };
            let id_seq = IdSequence::new();
            let slices = TWAPScheduler::plan_slices("PROPTEST", &params, &id_seq, 0);

            prop_assert_eq!(slices.len(), slice_count as usize);

            let sum: f64 = slices.iter().map(|s| s.planned_quantity).sum();
            approx::assert_relative_eq!(sum, total, epsilon = 1e-6);

            for slice in &slices {
                prop_assert!(slice.planned_quantity >= 0.0);
            }
        }

        /// Property: slices are evenly spaced across the requested duration,
        /// and the first slice is always due immediately.
        #[test]
        fn slice_schedule_is_evenly_spaced(
            slice_count in 1u32..100,
            duration_minutes in 1u32..1440,
        ) {
            let params = TwapParams {
                total_quantity: 100.0,
                duration_minutes,
                slice_count,
                participation_rate: 1.0,
                price_tolerance: 0.01,
            };
            let id_seq = IdSequence::new();
            let slices = TWAPScheduler::plan_slices("PROPTEST", &params, &id_seq, 1_000);

            prop_assert_eq!(slices[0].scheduled_at, 1_000);
            for pair in slices.windows(2) {
                prop_assert!(pair[1].scheduled_at >= pair[0].scheduled_at);
            }
        }
    }
}
