//! Monitoring and observability module
//!
//! Prometheus metrics export plus the HTTP server that scrapes them, wired
//! into the execution pipeline at the controller boundary only (spec §2:
//! ambient, not on the hot path).

pub mod metrics;
pub mod server;

pub use metrics::{
    MetricsRegistry, OrderMetrics, RingMetrics, RiskMetrics, RuleMetrics, SignalMetrics,
    SystemMetrics, TwapMetrics,
};
pub use server::{MetricsServer, MetricsServerConfig};
