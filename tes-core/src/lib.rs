//! tes-core - TWAP trade execution engine
//!
//! Sits between upstream strategy processes and an exchange gateway: it
//! accepts trading signals over a shared-memory ring, slices large orders
//! into a time-weighted average price (TWAP) schedule, enforces per-symbol
//! trading rules, submits child orders through a resilient gateway adapter,
//! and reconciles fills back into positions and an outbound report ring.
//!
//! ## Core modules
//! - [`core`]: domain types (Signal, Order, Trade, AlgorithmExecution, Position).
//! - [`ring`]: cross-process shared-memory ring buffers (SignalRing, ReportRing).
//! - [`queue`]: in-process lock-free MPMC queue decoupling ingress from workers.
//! - [`threadpool`]: fixed-size worker pool behind one mutex/condvar.
//! - [`callback`]: async, batched fan-out of lifecycle events to observers.
//! - [`store`]: the order lifecycle manager (`OrderStore`).
//! - [`risk`]: pre-trade rule gate (`TradingRuleGate`).
//! - [`twap`]: the TWAP scheduler (`TWAPScheduler`).
//! - [`gateway`]: the exchange-facing adapter and its simulated test double.
//! - [`controller`]: the top-level orchestrator (`ExecutionController`).
//!
//! ## Ambient modules
//! - [`config`]: JSON configuration loading/validation with env overrides.
//! - [`monitoring`]: Prometheus metrics registry and HTTP export server.
//! - [`resilience`]: `CircuitBreaker` and `KillSwitch`.
//! - [`perf`]: CPU affinity, cache-aligned counters, object pools.
//! - [`utils`]: logging initialization.
//! - [`testing`]: shared test/bench fixtures (builders, symbol tables).

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

pub mod callback;
pub mod config;
pub mod controller;
pub mod core;
pub mod errors;
pub mod gateway;
pub mod monitoring;
pub mod perf;
pub mod queue;
pub mod resilience;
pub mod ring;
pub mod risk;
pub mod store;
pub mod testing;
pub mod threadpool;
pub mod twap;
pub mod utils;

pub use errors::{ConfigError, GatewayError, OrderStoreError, RingError, TradingRuleError};

pub use core::{
    generate_execution_id, generate_order_id, generate_slice_id, now_ns, AlgorithmExecution,
    ExecutionSlice, ExecutionStatus, MarketDataSnapshot, Order, OrderReport, OrderStatus,
    OrderType, Position, PositionSnapshot, RuleResult, Side, Signal, TimeInForce, Trade,
    TradingRuleEvent, TwapParams,
};

pub use ring::{OrderReportRecord, ReportRing, SignalRecord, SignalRing};
pub use queue::LockFreeQueue;
pub use threadpool::ThreadPool;
pub use callback::{AsyncCallbackManager, CallbackEvent, CallbackManagerConfig};
pub use store::{NewOrderRequest, OrderStore, OrderStoreConfig, OrderStoreStats};
pub use risk::{
    RuleResultCounts, StaticSymbolInfoSource, SymbolInfoSource, SymbolRules, TradingRuleGate, TradingRuleGateConfig,
};
pub use twap::{SliceSubmitter, TWAPScheduler, TwapSchedulerConfig};
pub use gateway::{ExchangeClient, GatewayAdapter, GatewayAdapterConfig, SimulatedExchangeClient};
pub use controller::{ControllerStats, ExecutionController, ExecutionControllerConfig};
pub use config::Config;
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, KillSwitch, KillSwitchState};

// Re-export error types for the controller/binary boundary (spec §7).
pub use anyhow::{Error, Result};

/// Convenience imports for binaries and integration tests.
pub mod prelude {
    pub use crate::core::{
        AlgorithmExecution, Order, OrderStatus, OrderType, Side, Signal, TimeInForce, Trade,
        TwapParams,
    };
    pub use crate::controller::{ExecutionController, ExecutionControllerConfig};
    pub use crate::gateway::{ExchangeClient, GatewayAdapter, SimulatedExchangeClient};
    pub use crate::resilience::KillSwitch;
    pub use crate::ring::{ReportRing, SignalRing};
    pub use crate::risk::TradingRuleGate;
    pub use crate::store::OrderStore;
    pub use crate::twap::TWAPScheduler;
    pub use crate::{Error, Result};
}
