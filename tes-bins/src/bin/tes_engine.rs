//! Trade execution engine binary (spec §6: "minimal, not the core").
//!
//! Loads a JSON config, wires every component together the way
//! `ExecutionController::new` expects, installs the kill switch, and blocks
//! until a shutdown signal arrives. Exit code 0 is a clean shutdown; any
//! other code means initialization failed before the engine ever started
//! processing signals.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tes_core::config::{Config, MonitoringConfig, PlaintextCredentials};
use tes_core::gateway::{GatewayAdapter, GatewayAdapterConfig, SimulatedExchangeClient};
use tes_core::monitoring::{MetricsRegistry, MetricsServer, MetricsServerConfig};
use tes_core::resilience::KillSwitch;
use tes_core::ring::{ReportRing, SignalRing};
use tes_core::risk::{StaticSymbolInfoSource, SymbolInfoSource, SymbolRules, TradingRuleGate, TradingRuleGateConfig};
use tes_core::store::{OrderStore, OrderStoreConfig};
use tes_core::{ControllerStats, ExecutionController, ExecutionControllerConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "tes-engine", about = "TWAP trade execution engine")]
struct Args {
    /// Path to the JSON configuration file (spec §6).
    #[arg(long)]
    config: PathBuf,
}

/// Symbol metadata this engine ships with out of the box. Exchange
/// `exchangeInfo` ingestion is out of scope (spec §9 Non-goals: "does not
/// implement the exchange protocol"); operators running against a real
/// exchange replace this with a source backed by that exchange's symbol
/// table before going live.
fn bootstrap_symbol_source() -> StaticSymbolInfoSource {
    let source = StaticSymbolInfoSource::new();
    source.insert(
        "BTCUSDT",
        SymbolRules {
            trading_enabled: true,
            min_quantity: 0.0001,
            max_quantity: 1000.0,
            step_size: 0.0001,
            min_price: 0.01,
            max_price: 10_000_000.0,
            tick_size: 0.01,
            min_notional: 10.0,
        },
    );
    source.insert(
        "ETHUSDT",
        SymbolRules {
            trading_enabled: true,
            min_quantity: 0.001,
            max_quantity: 5000.0,
            step_size: 0.001,
            min_price: 0.01,
            max_price: 100_000.0,
            tick_size: 0.01,
            min_notional: 10.0,
        },
    );
    source
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::load(&args.config, &PlaintextCredentials)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    tes_core::utils::init_logger(&config.system.log_level, config.logging.json_logs);
    info!(name = %config.system.name, version = %config.system.version, "tes-engine starting");

    let signal_ring = Arc::new(
        SignalRing::create(&config.system.name, config.shared_memory_config.signal_buffer_size)
            .context("failed to create signal ring")?,
    );

    let gateway = if config.trading.enable_direct_orders || config.trading.enable_twap {
        let client: Arc<dyn tes_core::gateway::ExchangeClient> = Arc::new(SimulatedExchangeClient::default());
        Some(Arc::new(GatewayAdapter::new(client, GatewayAdapterConfig::default())))
    } else {
        None
    };

    let store = Arc::new(OrderStore::new(
        OrderStoreConfig {
            max_pending: config.risk_control.max_pending_orders,
            reject_duplicates: config.risk_control.enable_duplicate_check,
            order_timeout: Duration::from_secs(config.risk_control.order_timeout_seconds),
            cleanup_interval: Duration::from_secs(30),
            retention: Duration::from_secs(config.risk_control.retention_seconds),
        },
        gateway.clone(),
    ));

    let symbol_source: Box<dyn SymbolInfoSource> = Box::new(bootstrap_symbol_source());
    let rule_gate = Arc::new(TradingRuleGate::new(
        symbol_source,
        TradingRuleGateConfig {
            fail_closed_on_missing_symbol: config.risk_control.fail_closed_on_missing_symbol,
            ..Default::default()
        },
    ));

    let kill_switch = Arc::new(KillSwitch::install());

    {
        let kill_switch = Arc::clone(&kill_switch);
        ctrlc::set_handler(move || {
            kill_switch.shutdown("Ctrl+C received");
        })
        .context("failed to install Ctrl+C handler")?;
    }

    let controller_config = ExecutionControllerConfig {
        worker_count: config.execution.worker_thread_count,
        heartbeat_interval: Duration::from_millis(config.execution.heartbeat_interval_ms),
        stats_interval: Duration::from_millis(config.execution.statistics_update_interval_ms),
        twap_quantity_threshold: config.twap_algorithm.quantity_threshold,
        twap_value_threshold: config.twap_algorithm.value_threshold,
        twap_market_impact_threshold: config.twap_algorithm.market_impact_threshold,
        twap_duration_minutes: config.twap_algorithm.default_duration_minutes,
        twap_slice_count: config.twap_algorithm.max_slices,
        ..ExecutionControllerConfig::default()
    };

    let report_ring = if config.trading.enable_order_reports {
        Some(Arc::new(
            ReportRing::create(&config.system.name, config.shared_memory_config.order_report_buffer_size)
                .context("failed to create order report ring")?,
        ))
    } else {
        None
    };

    let controller = Arc::new(ExecutionController::with_report_ring(
        controller_config,
        signal_ring,
        rule_gate,
        store,
        gateway,
        Arc::clone(&kill_switch),
        report_ring,
    ));
    controller.start();

    if config.monitoring.enable_prometheus {
        let registry = Arc::new(MetricsRegistry::new().context("failed to build metrics registry")?);
        spawn_metrics_server(Arc::clone(&registry), &config.monitoring)?;
        spawn_stats_mirror(Arc::clone(&controller), Arc::clone(&registry), Arc::clone(&kill_switch));
    }

    while !kill_switch.should_stop() {
        std::thread::sleep(Duration::from_millis(100));
    }

    info!(reason = ?kill_switch.shutdown_reason(), "shutdown requested, draining");
    controller.stop();
    log_final_stats(controller.stats());
    info!("tes-engine exited cleanly");
    Ok(())
}

/// Runs the Prometheus `/metrics` HTTP endpoint on its own current-thread
/// tokio runtime, since `main` is synchronous and the rest of this binary
/// has no other reason to pull in an async executor.
fn spawn_metrics_server(registry: Arc<MetricsRegistry>, monitoring: &MonitoringConfig) -> anyhow::Result<()> {
    let listen_addr = monitoring
        .metrics_addr
        .parse()
        .with_context(|| format!("invalid monitoring.metrics_addr: {}", monitoring.metrics_addr))?;
    let server_config = MetricsServerConfig { listen_addr, metrics_path: monitoring.metrics_path.clone() };

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!(%e, "failed to start metrics server runtime");
                return;
            }
        };
        let server = MetricsServer::new(server_config, registry);
        if let Err(e) = runtime.block_on(server.serve()) {
            error!(%e, "metrics server exited with an error");
        }
    });

    Ok(())
}

/// Mirrors the coarse controller counters into the Prometheus registry every
/// second until the kill switch fires, per `monitoring::metrics`'s own
/// documented intent ("mirrors the controller's own in-process counters").
fn spawn_stats_mirror(controller: Arc<ExecutionController>, registry: Arc<MetricsRegistry>, kill_switch: Arc<KillSwitch>) {
    std::thread::spawn(move || {
        let mut last = ControllerStats::default();
        while !kill_switch.should_stop() {
            std::thread::sleep(Duration::from_secs(1));
            let current = controller.stats();

            let signals = registry.signals();
            signals.consumed_total.inc_by(current.signals_consumed.saturating_sub(last.signals_consumed));
            signals.rejected_total.inc_by(current.signals_rejected.saturating_sub(last.signals_rejected));
            registry
                .twap()
                .executions_started_total
                .inc_by(current.orders_twap.saturating_sub(last.orders_twap));

            last = current;
        }
    });
}

fn log_final_stats(stats: ControllerStats) {
    info!(
        signals_consumed = stats.signals_consumed,
        orders_direct = stats.orders_direct,
        orders_twap = stats.orders_twap,
        signals_rejected = stats.signals_rejected,
        "final statistics"
    );
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        error!(?err, "tes-engine failed to initialize");
        eprintln!("tes-engine: {err:#}");
        std::process::exit(1);
    }
}
