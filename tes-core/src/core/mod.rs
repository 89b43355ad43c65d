//! Domain types shared by every component: signals, orders, trades, TWAP
//! executions and slices, market-data snapshots, positions and trading-rule
//! events (spec §3).

pub mod types;

pub use types::{
    generate_execution_id, generate_order_id, generate_slice_id, now_ns, AlgorithmExecution,
    ExecutionSlice, ExecutionStatus, IdSequence, MarketDataSnapshot, Order, OrderReport,
    OrderStatus, OrderType, Position, PositionSnapshot, RuleResult, Side, Signal, TimeInForce,
    Trade, TradingRuleEvent, TwapParams,
};
