//! Core data types shared by every component: the wire-adjacent domain
//! objects described in spec §3 (Signal, Order, Trade, AlgorithmExecution,
//! ExecutionSlice, MarketData, Position, TradingRuleEvent) plus the id
//! formats used to name orders, executions and slices.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch. Used for every timestamp field in this
/// crate so orderings are comparable without an external library.
#[inline]
pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

#[inline]
fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

/// Monotonic counter used to make generated ids unique within a process even
/// when two are minted in the same microsecond.
#[derive(Debug, Default)]
pub struct IdSequence(AtomicU64);

impl IdSequence {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) % 1_000_000
    }
}

/// `ORD_<microseconds>_<6-digit-sequence>` per spec §4.6.
pub fn generate_order_id(seq: &IdSequence) -> String {
    format!("ORD_{}_{:06}", now_micros(), seq.next())
}

/// `TWAP_<microseconds>_<6-digit-sequence>` per spec §4.8.
pub fn generate_execution_id(seq: &IdSequence) -> String {
    format!("TWAP_{}_{:06}", now_micros(), seq.next())
}

/// `SLICE_<8-digit-sequence>` per spec §4.8.
pub fn generate_slice_id(seq: &IdSequence) -> String {
    format!("SLICE_{:08}", seq.next())
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

/// Time-in-force (§3, glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TimeInForce {
    Gtc,
    Ioc,
    Fok,
    Day,
}

/// Order lifecycle state (§4.6). Terminal variants are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderStatus {
    Pending,
    Submitted,
    PartiallyFilled,
    Filled,
    Cancelled,
    Rejected,
    Error,
}

impl OrderStatus {
    /// Terminal states admit no further transition (§4.6, §8 invariant 4).
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Filled
                | OrderStatus::Cancelled
                | OrderStatus::Rejected
                | OrderStatus::Error
        )
    }

    /// Whether `self -> next` is a legal transition per the §4.6 state machine.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Submitted)
                | (Pending, Cancelled)
                | (Pending, Rejected)
                | (Submitted, PartiallyFilled)
                | (Submitted, Filled)
                | (Submitted, Cancelled)
                | (Submitted, Error)
                | (PartiallyFilled, PartiallyFilled)
                | (PartiallyFilled, Filled)
                | (PartiallyFilled, Cancelled)
                | (PartiallyFilled, Error)
        )
    }
}

/// An upstream trading directive (§3). Immutable once read off the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub symbol: String,
    pub side: Side,
    /// Target price, or 0.0 for a market order.
    pub target_price: f64,
    pub target_quantity: f64,
    pub sequence_id: u64,
    pub timestamp_ns: u64,
}

/// Unit of execution (§3). `0 <= filled <= quantity` and `updated_at >=
/// created_at` are invariants maintained exclusively by `OrderStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub client_order_id: Option<String>,
    pub strategy_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub quantity: f64,
    pub filled_quantity: f64,
    pub price: f64,
    pub avg_fill_price: f64,
    pub status: OrderStatus,
    pub created_at: u64,
    pub updated_at: u64,
    pub error_message: Option<String>,
}

impl Order {
    /// Build a fresh, unsubmitted order. `id` is assigned by the caller
    /// (normally `OrderStore::create`) once duplicate checks pass.
    pub fn new(
        id: String,
        strategy_id: String,
        symbol: String,
        side: Side,
        order_type: OrderType,
        time_in_force: TimeInForce,
        quantity: f64,
        price: f64,
    ) -> Self {
        let now = now_ns();
        Self {
            id,
            client_order_id: None,
            strategy_id,
            symbol,
            side,
            order_type,
            time_in_force,
            quantity,
            filled_quantity: 0.0,
            price,
            avg_fill_price: 0.0,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            error_message: None,
        }
    }

    pub fn remaining(&self) -> f64 {
        (self.quantity - self.filled_quantity).max(0.0)
    }

    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// A fill against an order (§3). Many fills may accumulate against one order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub quantity: f64,
    pub commission: f64,
    pub timestamp_ns: u64,
}

/// Outbound record mirroring an order's state for `ReportRing`/callback
/// consumers (§6).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReport {
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub quantity: f64,
    pub filled_quantity: f64,
    pub price: f64,
    pub avg_fill_price: f64,
    pub commission: f64,
    pub timestamp_ns: u64,
    pub error_message: Option<String>,
}

impl From<&Order> for OrderReport {
    fn from(o: &Order) -> Self {
        Self {
            order_id: o.id.clone(),
            symbol: o.symbol.clone(),
            side: o.side,
            order_type: o.order_type,
            status: o.status,
            quantity: o.quantity,
            filled_quantity: o.filled_quantity,
            price: o.price,
            avg_fill_price: o.avg_fill_price,
            commission: 0.0,
            timestamp_ns: o.updated_at,
            error_message: o.error_message.clone(),
        }
    }
}

/// TWAP run-time parameters (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwapParams {
    pub total_quantity: f64,
    pub duration_minutes: u32,
    pub slice_count: u32,
    pub participation_rate: f64,
    pub price_tolerance: f64,
}

/// TWAP execution status (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Running,
    Paused,
    Completed,
    Cancelled,
    Error,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Cancelled | ExecutionStatus::Error
        )
    }

    pub fn can_transition_to(self, next: ExecutionStatus) -> bool {
        use ExecutionStatus::*;
        match (self, next) {
            (Running, Paused) | (Running, Completed) | (Running, Cancelled) | (Running, Error) => {
                true
            }
            (Paused, Running) | (Paused, Cancelled) => true,
            _ => false,
        }
    }
}

/// A TWAP run (§3). `executed + remaining == params.total_quantity` at every
/// observation point (§8 invariant 3).
#[derive(Debug, Clone)]
pub struct AlgorithmExecution {
    pub id: String,
    pub strategy_id: String,
    pub symbol: String,
    pub side: Side,
    pub params: TwapParams,
    pub status: ExecutionStatus,
    pub executed_quantity: f64,
    pub remaining_quantity: f64,
    pub avg_fill_price: f64,
    pub start_ts: u64,
    pub end_ts: Option<u64>,
    pub child_orders: Vec<String>,
}

/// One planned child of a TWAP execution (§3). The final slice absorbs the
/// rounding residual so that `sum(slice.quantity) == total_quantity` exactly.
#[derive(Debug, Clone)]
pub struct ExecutionSlice {
    pub id: String,
    pub execution_id: String,
    pub planned_quantity: f64,
    pub scheduled_at: u64,
    pub executed: bool,
    pub child_order_id: Option<String>,
}

/// Read-only last-known market snapshot for a symbol (§3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketDataSnapshot {
    pub best_bid: f64,
    pub best_ask: f64,
    pub last_price: f64,
    pub recent_volume: f64,
    pub observed_at: u64,
}

/// Cache-line aligned, lock-free per-(strategy, symbol) position (§3).
///
/// Fields are stored as `f64::to_bits` in `AtomicU64`s guarded by a SeqLock
/// (`sequence`, even = stable). Writers always hold an external mutex (one
/// position per key is only ever mutated by `OrderStore::process_trade`), so
/// the SeqLock exists purely to give lock-free readers (metrics, dashboards)
/// a consistent snapshot without blocking the writer.
#[repr(C, align(64))]
pub struct Position {
    pub sequence: AtomicU64,
    long_qty: AtomicU64,
    short_qty: AtomicU64,
    avg_cost: AtomicU64,
    unrealized_pnl: AtomicU64,
    realized_pnl: AtomicU64,
    updated_at: AtomicU64,
}

/// Consistent point-in-time snapshot returned by `Position::read`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSnapshot {
    pub long_qty: f64,
    pub short_qty: f64,
    pub net_qty: f64,
    pub avg_cost: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,
    pub updated_at: u64,
}

impl Position {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
            long_qty: AtomicU64::new(0f64.to_bits()),
            short_qty: AtomicU64::new(0f64.to_bits()),
            avg_cost: AtomicU64::new(0f64.to_bits()),
            unrealized_pnl: AtomicU64::new(0f64.to_bits()),
            realized_pnl: AtomicU64::new(0f64.to_bits()),
            updated_at: AtomicU64::new(0),
        }
    }

    /// Apply a fill: `writer` runs under the caller's exclusive lock, so the
    /// sequence bump only needs to keep concurrent lock-free readers honest.
    pub fn update<F>(&self, updated_at: u64, f: F)
    where
        F: FnOnce(&mut PositionSnapshot),
    {
        let mut snap = self.read();
        f(&mut snap);
        snap.updated_at = updated_at;

        self.sequence.fetch_add(1, Ordering::AcqRel);
        self.long_qty.store(snap.long_qty.to_bits(), Ordering::Relaxed);
        self.short_qty.store(snap.short_qty.to_bits(), Ordering::Relaxed);
        self.avg_cost.store(snap.avg_cost.to_bits(), Ordering::Relaxed);
        self.unrealized_pnl
            .store(snap.unrealized_pnl.to_bits(), Ordering::Relaxed);
        self.realized_pnl
            .store(snap.realized_pnl.to_bits(), Ordering::Relaxed);
        self.updated_at.store(snap.updated_at, Ordering::Relaxed);
        self.sequence.fetch_add(1, Ordering::Release);
    }

    /// Retry-until-consistent read (SeqLock reader side).
    pub fn read(&self) -> PositionSnapshot {
        loop {
            let seq1 = self.sequence.load(Ordering::Acquire);
            if seq1 % 2 != 0 {
                std::hint::spin_loop();
                continue;
            }
            let long_qty = f64::from_bits(self.long_qty.load(Ordering::Relaxed));
            let short_qty = f64::from_bits(self.short_qty.load(Ordering::Relaxed));
            let avg_cost = f64::from_bits(self.avg_cost.load(Ordering::Relaxed));
            let unrealized_pnl = f64::from_bits(self.unrealized_pnl.load(Ordering::Relaxed));
            let realized_pnl = f64::from_bits(self.realized_pnl.load(Ordering::Relaxed));
            let updated_at = self.updated_at.load(Ordering::Relaxed);
            std::sync::atomic::fence(Ordering::Acquire);
            let seq2 = self.sequence.load(Ordering::Acquire);
            if seq1 == seq2 {
                return PositionSnapshot {
                    long_qty,
                    short_qty,
                    net_qty: long_qty - short_qty,
                    avg_cost,
                    unrealized_pnl,
                    realized_pnl,
                    updated_at,
                };
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position").field("snapshot", &self.read()).finish()
    }
}

/// Outcome of a `TradingRuleGate::check` call (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleResult {
    Pass,
    RejectSymbolNotTrading,
    RejectQuantityTooSmall,
    RejectQuantityTooLarge,
    RejectQuantityPrecision,
    RejectPriceTooLow,
    RejectPriceTooHigh,
    RejectPricePrecision,
    RejectMinNotional,
    RejectInvalidParams,
    RejectSymbolNotFound,
    RejectSystemError,
}

impl RuleResult {
    pub fn is_pass(self) -> bool {
        matches!(self, RuleResult::Pass)
    }

    /// Human-readable description keyed off the result code (§7).
    pub fn description(self) -> &'static str {
        match self {
            RuleResult::Pass => "order passes all pre-trade checks",
            RuleResult::RejectSymbolNotTrading => "symbol is not currently tradable",
            RuleResult::RejectQuantityTooSmall => "order quantity below the symbol minimum",
            RuleResult::RejectQuantityTooLarge => "order quantity above the symbol maximum",
            RuleResult::RejectQuantityPrecision => "order quantity violates the symbol step size",
            RuleResult::RejectPriceTooLow => "order price below the symbol minimum",
            RuleResult::RejectPriceTooHigh => "order price above the symbol maximum",
            RuleResult::RejectPricePrecision => "order price violates the symbol tick size",
            RuleResult::RejectMinNotional => "order notional below the symbol minimum",
            RuleResult::RejectInvalidParams => "order parameters are invalid",
            RuleResult::RejectSymbolNotFound => "symbol is unknown to the exchange-info source",
            RuleResult::RejectSystemError => "trading rule gate encountered an internal error",
        }
    }
}

/// Record of a gate decision (§4.7), retained in a bounded recent window.
#[derive(Debug, Clone)]
pub struct TradingRuleEvent {
    pub event_id: u64,
    pub strategy_id: String,
    pub symbol: String,
    pub result: RuleResult,
    pub description: String,
    pub timestamp_ns: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Submitted));
        assert!(OrderStatus::Submitted.can_transition_to(OrderStatus::PartiallyFilled));
        assert!(OrderStatus::PartiallyFilled.can_transition_to(OrderStatus::Filled));
        assert!(!OrderStatus::Filled.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Filled));
    }

    #[test]
    fn order_status_terminal_is_absorbing() {
        for terminal in [
            OrderStatus::Filled,
            OrderStatus::Cancelled,
            OrderStatus::Rejected,
            OrderStatus::Error,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(OrderStatus::Pending));
        }
    }

    #[test]
    fn id_generation_is_unique_and_well_formed() {
        let seq = IdSequence::new();
        let a = generate_order_id(&seq);
        let b = generate_order_id(&seq);
        assert_ne!(a, b);
        assert!(a.starts_with("ORD_"));
        assert_eq!(a.split('_').count(), 3);
    }

    #[test]
    fn position_round_trips_updates() {
        let pos = Position::new();
        pos.update(1, |s| {
            s.long_qty = 1.5;
            s.avg_cost = 30_000.0;
        });
        let snap = pos.read();
        assert_eq!(snap.long_qty, 1.5);
        assert_eq!(snap.net_qty, 1.5);
        assert_eq!(snap.avg_cost, 30_000.0);
        assert_eq!(snap.updated_at, 1);
    }

    #[test]
    fn order_report_mirrors_order() {
        let seq = IdSequence::new();
        let order = Order::new(
            generate_order_id(&seq),
            "alpha".into(),
            "BTCUSDT".into(),
            Side::Buy,
            OrderType::Limit,
            TimeInForce::Ioc,
            1.0,
            30_000.0,
        );
        let report = OrderReport::from(&order);
        assert_eq!(report.order_id, order.id);
        assert_eq!(report.status, OrderStatus::Pending);
    }
}
