//! Prometheus metrics for the execution pipeline.
//!
//! Mirrors the controller's own in-process counters ([`crate::controller::ControllerStats`])
//! into a [`prometheus::Registry`], grouped by subsystem: signal ingress,
//! orders/trades, rule violations, TWAP executions, the shared-memory rings,
//! and general system health (spec §4.10, ambient monitoring stack).

use prometheus::{
    Counter, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry,
};
use std::sync::Arc;
use tracing::info;

/// Central registry for all Prometheus metrics.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Arc<Registry>,
    signals: Arc<SignalMetrics>,
    orders: Arc<OrderMetrics>,
    rules: Arc<RuleMetrics>,
    twap: Arc<TwapMetrics>,
    rings: Arc<RingMetrics>,
    risk: Arc<RiskMetrics>,
    system: Arc<SystemMetrics>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Arc::new(Registry::new());

        let signals = Arc::new(SignalMetrics::new(&registry)?);
        let orders = Arc::new(OrderMetrics::new(&registry)?);
        let rules = Arc::new(RuleMetrics::new(&registry)?);
        let twap = Arc::new(TwapMetrics::new(&registry)?);
        let rings = Arc::new(RingMetrics::new(&registry)?);
        let risk = Arc::new(RiskMetrics::new(&registry)?);
        let system = Arc::new(SystemMetrics::new(&registry)?);

        info!("Prometheus metrics registry initialized");

        Ok(Self { registry, signals, orders, rules, twap, rings, risk, system })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn signals(&self) -> &SignalMetrics {
        &self.signals
    }

    pub fn orders(&self) -> &OrderMetrics {
        &self.orders
    }

    pub fn rules(&self) -> &RuleMetrics {
        &self.rules
    }

    pub fn twap(&self) -> &TwapMetrics {
        &self.twap
    }

    pub fn rings(&self) -> &RingMetrics {
        &self.rings
    }

    pub fn risk(&self) -> &RiskMetrics {
        &self.risk
    }

    pub fn system(&self) -> &SystemMetrics {
        &self.system
    }
}

impl Default for MetricsRegistry {
    #[allow(clippy::panic)]
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            tracing::error!("FATAL: failed to create metrics registry: {}", e);
            panic!("cannot create metrics registry")
        })
    }
}

/// `ExecutionMetrics` is the umbrella alias the rest of the engine imports
/// when it just wants "the execution-pipeline metric groups" without
/// spelling out every subsystem.
pub type ExecutionMetrics = MetricsRegistry;

/// Signal-ingress metrics: what arrived on `SignalRing` and what happened to it.
pub struct SignalMetrics {
    pub consumed_total: IntCounter,
    pub rejected_total: IntCounter,
    pub pump_idle_total: IntCounter,
}

impl SignalMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let consumed_total =
            IntCounter::new("tes_signals_consumed_total", "Total signals dequeued from SignalRing")?;
        registry.register(Box::new(consumed_total.clone()))?;

        let rejected_total = IntCounter::new(
            "tes_signals_rejected_total",
            "Total signals rejected by the trading rule gate",
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        let pump_idle_total = IntCounter::new(
            "tes_signals_pump_idle_total",
            "Total pump-thread iterations that found an empty ring",
        )?;
        registry.register(Box::new(pump_idle_total.clone()))?;

        Ok(Self { consumed_total, rejected_total, pump_idle_total })
    }
}

/// Order/trade lifecycle metrics, sourced from `OrderStore`.
pub struct OrderMetrics {
    pub created_total: IntCounterVec,
    pub fills_total: IntCounterVec,
    pub rejections_total: IntCounterVec,
    pub cancellations_total: IntCounterVec,
    pub orders_by_status: IntGaugeVec,
    pub late_sync_after_terminal_total: IntCounter,
    pub submit_to_fill_latency_ms: Histogram,
    pub volume_total: Counter,
}

impl OrderMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let created_total = IntCounterVec::new(
            Opts::new("orders_created_total", "Total orders created").namespace("tes"),
            &["symbol", "side", "type"],
        )?;
        registry.register(Box::new(created_total.clone()))?;

        let fills_total = IntCounterVec::new(
            Opts::new("orders_fills_total", "Total fills received").namespace("tes"),
            &["symbol", "side"],
        )?;
        registry.register(Box::new(fills_total.clone()))?;

        let rejections_total = IntCounterVec::new(
            Opts::new("orders_rejections_total", "Total order rejections").namespace("tes"),
            &["reason"],
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let cancellations_total = IntCounterVec::new(
            Opts::new("orders_cancellations_total", "Total order cancellations").namespace("tes"),
            &["symbol"],
        )?;
        registry.register(Box::new(cancellations_total.clone()))?;

        let orders_by_status = IntGaugeVec::new(
            Opts::new("orders_by_status", "Current number of live orders by status").namespace("tes"),
            &["status"],
        )?;
        registry.register(Box::new(orders_by_status.clone()))?;

        let late_sync_after_terminal_total = IntCounter::new(
            "tes_orders_late_sync_after_terminal_total",
            "Reconciliation updates dropped because the order was already terminal",
        )?;
        registry.register(Box::new(late_sync_after_terminal_total.clone()))?;

        let submit_to_fill_latency_ms = Histogram::with_opts(
            HistogramOpts::new(
                "tes_orders_submit_to_fill_latency_ms",
                "Milliseconds between order submission and terminal fill",
            )
            .buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]),
        )?;
        registry.register(Box::new(submit_to_fill_latency_ms.clone()))?;

        let volume_total = Counter::new("tes_orders_volume_quote_total", "Total executed notional (quote currency)")?;
        registry.register(Box::new(volume_total.clone()))?;

        Ok(Self {
            created_total,
            fills_total,
            rejections_total,
            cancellations_total,
            orders_by_status,
            late_sync_after_terminal_total,
            submit_to_fill_latency_ms,
            volume_total,
        })
    }
}

/// Trading-rule gate outcomes, mirroring `TradingRuleGate`'s counters.
pub struct RuleMetrics {
    pub passed_total: IntCounter,
    pub rejected_total: IntCounterVec,
}

impl RuleMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let passed_total =
            IntCounter::new("tes_rule_gate_passed_total", "Total orders that passed the trading rule gate")?;
        registry.register(Box::new(passed_total.clone()))?;

        let rejected_total = IntCounterVec::new(
            Opts::new("rule_gate_rejected_total", "Total orders rejected by the trading rule gate")
                .namespace("tes"),
            &["result"],
        )?;
        registry.register(Box::new(rejected_total.clone()))?;

        Ok(Self { passed_total, rejected_total })
    }
}

/// TWAP execution metrics, sourced from `TWAPScheduler`.
pub struct TwapMetrics {
    pub executions_started_total: IntCounter,
    pub executions_completed_total: IntCounter,
    pub executions_cancelled_total: IntCounter,
    pub slices_dispatched_total: IntCounter,
    pub active_executions: IntGauge,
    pub participation_rate: Gauge,
}

impl TwapMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let executions_started_total =
            IntCounter::new("tes_twap_executions_started_total", "Total TWAP executions started")?;
        registry.register(Box::new(executions_started_total.clone()))?;

        let executions_completed_total =
            IntCounter::new("tes_twap_executions_completed_total", "Total TWAP executions completed")?;
        registry.register(Box::new(executions_completed_total.clone()))?;

        let executions_cancelled_total =
            IntCounter::new("tes_twap_executions_cancelled_total", "Total TWAP executions cancelled")?;
        registry.register(Box::new(executions_cancelled_total.clone()))?;

        let slices_dispatched_total =
            IntCounter::new("tes_twap_slices_dispatched_total", "Total TWAP child slices dispatched")?;
        registry.register(Box::new(slices_dispatched_total.clone()))?;

        let active_executions =
            IntGauge::new("tes_twap_active_executions", "Number of TWAP executions currently running or paused")?;
        registry.register(Box::new(active_executions.clone()))?;

        let participation_rate = Gauge::new(
            "tes_twap_participation_rate",
            "Most recently observed participation rate across active executions",
        )?;
        registry.register(Box::new(participation_rate.clone()))?;

        Ok(Self {
            executions_started_total,
            executions_completed_total,
            executions_cancelled_total,
            slices_dispatched_total,
            active_executions,
            participation_rate,
        })
    }
}

/// Shared-memory ring health: depth and writer-side drops.
pub struct RingMetrics {
    pub signal_ring_dropped_total: IntCounter,
    pub report_ring_dropped_total: IntCounter,
    pub ingress_queue_depth: IntGauge,
}

impl RingMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let signal_ring_dropped_total = IntCounter::new(
            "tes_signal_ring_dropped_total",
            "Total signal records dropped at the writer because the ring was full",
        )?;
        registry.register(Box::new(signal_ring_dropped_total.clone()))?;

        let report_ring_dropped_total = IntCounter::new(
            "tes_report_ring_dropped_total",
            "Total order reports dropped at the writer because the ring was full",
        )?;
        registry.register(Box::new(report_ring_dropped_total.clone()))?;

        let ingress_queue_depth =
            IntGauge::new("tes_ingress_queue_depth", "Current depth of the in-process signal queue")?;
        registry.register(Box::new(ingress_queue_depth.clone()))?;

        Ok(Self { signal_ring_dropped_total, report_ring_dropped_total, ingress_queue_depth })
    }
}

/// Position/PnL metrics (spec §3 Position model).
pub struct RiskMetrics {
    pub net_position: Gauge,
    pub realized_pnl_usd: Gauge,
    pub unrealized_pnl_usd: Gauge,
}

impl RiskMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let net_position = Gauge::new("tes_risk_net_position", "Net position quantity (long - short)")?;
        registry.register(Box::new(net_position.clone()))?;

        let realized_pnl_usd = Gauge::new("tes_risk_realized_pnl_usd", "Realized profit and loss in USD")?;
        registry.register(Box::new(realized_pnl_usd.clone()))?;

        let unrealized_pnl_usd = Gauge::new("tes_risk_unrealized_pnl_usd", "Unrealized profit and loss in USD")?;
        registry.register(Box::new(unrealized_pnl_usd.clone()))?;

        Ok(Self { net_position, realized_pnl_usd, unrealized_pnl_usd })
    }
}

/// General process/exchange health.
pub struct SystemMetrics {
    pub exchange_connected: IntGauge,
    pub circuit_breaker_open: IntGauge,
    pub errors_total: IntCounterVec,
    pub callback_errors_total: IntCounter,
    pub callback_dropped_events_total: IntCounter,
    pub uptime_seconds: IntGauge,
}

impl SystemMetrics {
    fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let exchange_connected = IntGauge::new(
            "tes_system_exchange_connected",
            "Exchange gateway connection status (1 = connected, 0 = disconnected)",
        )?;
        registry.register(Box::new(exchange_connected.clone()))?;

        let circuit_breaker_open =
            IntGauge::new("tes_system_circuit_breaker_open", "1 if the gateway circuit breaker is open")?;
        registry.register(Box::new(circuit_breaker_open.clone()))?;

        let errors_total = IntCounterVec::new(
            Opts::new("system_errors_total", "Total system errors").namespace("tes"),
            &["component", "severity"],
        )?;
        registry.register(Box::new(errors_total.clone()))?;

        let callback_errors_total =
            IntCounter::new("tes_system_callback_errors_total", "Total callback dispatch errors (panics caught)")?;
        registry.register(Box::new(callback_errors_total.clone()))?;

        let callback_dropped_events_total = IntCounter::new(
            "tes_system_callback_dropped_events_total",
            "Total callback events dropped because the publish queue was full",
        )?;
        registry.register(Box::new(callback_dropped_events_total.clone()))?;

        let uptime_seconds = IntGauge::new("tes_system_uptime_seconds", "Process uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            exchange_connected,
            circuit_breaker_open,
            errors_total,
            callback_errors_total,
            callback_dropped_events_total,
            uptime_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_registers_every_subsystem() {
        let registry = MetricsRegistry::new().unwrap();
        assert!(!registry.registry().gather().is_empty());
    }

    #[test]
    fn order_metrics_record() {
        let registry = MetricsRegistry::new().unwrap();
        registry.orders().created_total.with_label_values(&["BTCUSDT", "buy", "limit"]).inc();
        registry.orders().fills_total.with_label_values(&["BTCUSDT", "buy"]).inc();
        registry.orders().orders_by_status.with_label_values(&["FILLED"]).set(1);
        assert!(!registry.registry().gather().is_empty());
    }

    #[test]
    fn twap_metrics_record() {
        let registry = MetricsRegistry::new().unwrap();
        registry.twap().executions_started_total.inc();
        registry.twap().active_executions.set(2);
        registry.twap().participation_rate.set(0.2);
        assert!(!registry.registry().gather().is_empty());
    }

    #[test]
    fn rule_metrics_record() {
        let registry = MetricsRegistry::new().unwrap();
        registry.rules().passed_total.inc();
        registry.rules().rejected_total.with_label_values(&["RejectMinNotional"]).inc();
        assert!(!registry.registry().gather().is_empty());
    }

    #[test]
    fn ring_and_system_metrics_record() {
        let registry = MetricsRegistry::new().unwrap();
        registry.rings().signal_ring_dropped_total.inc();
        registry.rings().ingress_queue_depth.set(5);
        registry.system().exchange_connected.set(1);
        registry.system().uptime_seconds.set(120);
        assert!(!registry.registry().gather().is_empty());
    }
}
