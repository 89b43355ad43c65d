//! Configuration schema (spec §6): the JSON file this engine loads and
//! validates at startup. Section names and field names follow the spec's
//! wire format exactly so operator-facing JSON stays stable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub system: SystemConfig,
    pub signaltrans_mode: SignalTransportMode,
    pub shared_memory_config: SharedMemoryConfig,
    pub trading: TradingConfig,
    pub exchanges: HashMap<String, ExchangeConfig>,
    pub execution: ExecutionConfig,
    pub twap_algorithm: TwapAlgorithmConfig,
    pub risk_control: RiskControlConfig,
    pub market_data: MarketDataConfig,
    pub logging: LoggingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    pub version: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub max_threads: usize,
}

/// How signals arrive: shared memory (production) or a JSON file (replay/testing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SignalTransportMode {
    SharedMemory = 0,
    JsonFile = 1,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedMemoryConfig {
    pub buffer_size: usize,
    pub max_signals: u64,
    pub signal_buffer_size: u64,
    pub order_report_buffer_size: u64,
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    pub trading_exchanges: Vec<String>,
    /// "spot" | "futures"
    pub trading_type: Vec<String>,
    pub default_quantity: f64,
    pub max_order_size: f64,
    #[serde(default = "default_true")]
    pub enable_direct_orders: bool,
    #[serde(default = "default_true")]
    pub enable_twap: bool,
    #[serde(default = "default_true")]
    pub enable_order_reports: bool,
    #[serde(default)]
    pub enable_duplicate_orders_check: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseUrlSet {
    pub live: String,
    pub testnet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseUrls {
    pub spot: BaseUrlSet,
    pub futures: BaseUrlSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Plain or `CredentialUnwrap`-wrapped; see `CredentialUnwrap`.
    pub api_key: String,
    pub api_secret: String,
    #[serde(default)]
    pub testnet: bool,
    #[serde(default = "default_true")]
    pub enable_websocket: bool,
    #[serde(default = "default_true")]
    pub enable_user_data_stream: bool,
    pub sync_interval_ms: u64,
    pub timeout_ms: u64,
    pub base_urls: BaseUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    #[serde(default = "default_worker_thread_count")]
    pub worker_thread_count: usize,
    #[serde(default = "default_signal_processing_interval_ms")]
    pub signal_processing_interval_ms: u64,
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    #[serde(default = "default_statistics_update_interval_ms")]
    pub statistics_update_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwapAlgorithmConfig {
    pub quantity_threshold: f64,
    pub value_threshold: f64,
    pub market_impact_threshold: f64,
    pub default_duration_minutes: u32,
    pub min_slice_size: f64,
    pub max_slices: u32,
    pub default_participation_rate: f64,
    pub max_price_deviation_bps: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskControlConfig {
    #[serde(default = "default_max_pending_orders")]
    pub max_pending_orders: usize,
    #[serde(default = "default_order_timeout_seconds")]
    pub order_timeout_seconds: u64,
    #[serde(default = "default_retention_seconds")]
    pub retention_seconds: u64,
    #[serde(default = "default_true")]
    pub enable_duplicate_check: bool,
    /// Open Question resolution (spec §4.7): default fail-open; set true for
    /// the stricter fail-closed posture.
    #[serde(default)]
    pub fail_closed_on_missing_symbol: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDataConfig {
    #[serde(default = "default_snapshot_staleness_ms")]
    pub snapshot_staleness_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_true")]
    pub enable_prometheus: bool,
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_prometheus: true,
            metrics_addr: default_metrics_addr(),
            metrics_path: default_metrics_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cleanup_interval_ms() -> u64 {
    30_000
}

fn default_worker_thread_count() -> usize {
    4
}

fn default_signal_processing_interval_ms() -> u64 {
    100
}

fn default_heartbeat_interval_ms() -> u64 {
    5_000
}

fn default_statistics_update_interval_ms() -> u64 {
    30_000
}

fn default_max_pending_orders() -> usize {
    10_000
}

fn default_order_timeout_seconds() -> u64 {
    300
}

fn default_retention_seconds() -> u64 {
    3_600
}

fn default_snapshot_staleness_ms() -> u64 {
    5_000
}

fn default_metrics_addr() -> String {
    "127.0.0.1:9090".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}
