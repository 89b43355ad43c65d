//! `TradingRuleGate`: pre-trade rule checks every order passes through
//! before submission (spec §4.7).
//!
//! The gate runs an ordered pipeline — symbol status, then quantity rules,
//! then price rules, then minimum notional — and returns on the first
//! failing rule rather than collecting every violation, matching the
//! "first rejecting rule wins" wording in §4.7. Exchange symbol metadata
//! (tick size, step size, min/max quantity, min notional) is supplied by a
//! pluggable [`SymbolInfoSource`] so the gate itself carries no
//! exchange-specific knowledge.

use crate::core::{now_ns, RuleResult, Side, TradingRuleEvent};
use crate::errors::TradingRuleError;
use rust_decimal::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Static per-symbol trading rules (spec §3, §4.7). Mirrors the
/// subset of Binance's `exchangeInfo` fields this engine needs.
#[derive(Debug, Clone, Copy)]
pub struct SymbolRules {
    pub trading_enabled: bool,
    pub min_quantity: f64,
    pub max_quantity: f64,
    pub step_size: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub tick_size: f64,
    pub min_notional: f64,
}

/// Supplies [`SymbolRules`] for a symbol. Looking up an unknown symbol is a
/// legitimate, recoverable outcome (`RejectSymbolNotFound`) rather than an
/// error, matching the result-code posture in the error-handling doc comment
/// on [`crate::errors`] — `Err` is reserved for the source itself being
/// unavailable (§9 open question: fail-open when the source can't be
/// reached, fail-closed on the symbol itself being unknown).
pub trait SymbolInfoSource: Send + Sync {
    fn lookup(&self, symbol: &str) -> Result<Option<SymbolRules>, TradingRuleError>;
}

/// In-memory symbol table, sufficient for tests and the simulated exchange.
#[derive(Default)]
pub struct StaticSymbolInfoSource {
    symbols: parking_lot::RwLock<HashMap<String, SymbolRules>>,
}

impl StaticSymbolInfoSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, symbol: impl Into<String>, rules: SymbolRules) {
        self.symbols.write().insert(symbol.into(), rules);
    }
}

impl SymbolInfoSource for StaticSymbolInfoSource {
    fn lookup(&self, symbol: &str) -> Result<Option<SymbolRules>, TradingRuleError> {
        Ok(self.symbols.read().get(symbol).copied())
    }
}

#[derive(Debug, Clone)]
pub struct TradingRuleGateConfig {
    /// Cap on the retained `TradingRuleEvent` log (spec §4.7: "a bounded
    /// recent-event log, not an unbounded audit trail").
    pub event_log_capacity: usize,
    /// When the symbol-info source itself errors (not "symbol unknown", but
    /// the lookup failing outright), fail open and let the order proceed
    /// rather than blocking all trading on a metadata outage.
    pub fail_open_on_source_error: bool,
    /// Open Question resolution (spec §4.7, §9): a symbol the source has
    /// simply never heard of defaults to fail-open (`Pass`) rather than
    /// `RejectSymbolNotFound`, since an unrecognized symbol is far more often
    /// a metadata-sync lag than an actual attempt to trade something
    /// forbidden. Set true (`risk_control.fail_closed_on_missing_symbol` in
    /// config) for the stricter posture.
    pub fail_closed_on_missing_symbol: bool,
}

impl Default for TradingRuleGateConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: 1000,
            fail_open_on_source_error: true,
            fail_closed_on_missing_symbol: false,
        }
    }
}

/// Rounds `value` down to the nearest multiple of `step` (quantity step
/// size / price tick size), using `rust_decimal` so repeated roundings don't
/// accumulate binary-float error (spec §4.7: "fix_quantity/fix_price must be
/// idempotent").
fn round_down_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    let value = Decimal::from_f64(value).unwrap_or_default();
    let step = Decimal::from_f64(step).unwrap_or(Decimal::ONE);
    let steps = (value / step).floor();
    (steps * step).to_f64().unwrap_or(0.0)
}

/// Per-`RuleResult` rejection counters (§4.7, S6: "a typed counter per
/// rejecting rule, not just one aggregate"). One `AtomicU64` per non-`Pass`
/// variant.
#[derive(Default)]
struct RuleResultCounters {
    symbol_not_trading: AtomicU64,
    quantity_too_small: AtomicU64,
    quantity_too_large: AtomicU64,
    quantity_precision: AtomicU64,
    price_too_low: AtomicU64,
    price_too_high: AtomicU64,
    price_precision: AtomicU64,
    min_notional: AtomicU64,
    invalid_params: AtomicU64,
    symbol_not_found: AtomicU64,
    system_error: AtomicU64,
}

impl RuleResultCounters {
    fn record(&self, result: RuleResult) {
        let counter = match result {
            RuleResult::Pass => return,
            RuleResult::RejectSymbolNotTrading => &self.symbol_not_trading,
            RuleResult::RejectQuantityTooSmall => &self.quantity_too_small,
            RuleResult::RejectQuantityTooLarge => &self.quantity_too_large,
            RuleResult::RejectQuantityPrecision => &self.quantity_precision,
            RuleResult::RejectPriceTooLow => &self.price_too_low,
            RuleResult::RejectPriceTooHigh => &self.price_too_high,
            RuleResult::RejectPricePrecision => &self.price_precision,
            RuleResult::RejectMinNotional => &self.min_notional,
            RuleResult::RejectInvalidParams => &self.invalid_params,
            RuleResult::RejectSymbolNotFound => &self.symbol_not_found,
            RuleResult::RejectSystemError => &self.system_error,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RuleResultCounts {
        RuleResultCounts {
            symbol_not_trading: self.symbol_not_trading.load(Ordering::Relaxed),
            quantity_too_small: self.quantity_too_small.load(Ordering::Relaxed),
            quantity_too_large: self.quantity_too_large.load(Ordering::Relaxed),
            quantity_precision: self.quantity_precision.load(Ordering::Relaxed),
            price_too_low: self.price_too_low.load(Ordering::Relaxed),
            price_too_high: self.price_too_high.load(Ordering::Relaxed),
            price_precision: self.price_precision.load(Ordering::Relaxed),
            min_notional_violations: self.min_notional.load(Ordering::Relaxed),
            invalid_params: self.invalid_params.load(Ordering::Relaxed),
            symbol_not_found: self.symbol_not_found.load(Ordering::Relaxed),
            system_error: self.system_error.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of [`RuleResultCounters`], one field per
/// rejecting `RuleResult` variant (§8 scenario S6).
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleResultCounts {
    pub symbol_not_trading: u64,
    pub quantity_too_small: u64,
    pub quantity_too_large: u64,
    pub quantity_precision: u64,
    pub price_too_low: u64,
    pub price_too_high: u64,
    pub price_precision: u64,
    pub min_notional_violations: u64,
    pub invalid_params: u64,
    pub symbol_not_found: u64,
    pub system_error: u64,
}

/// Pre-trade rule gate (§4.7). Stateless with respect to orders — every
/// call to `check` is independent — but keeps a bounded log of recent
/// decisions for observability.
pub struct TradingRuleGate {
    source: Box<dyn SymbolInfoSource>,
    config: TradingRuleGateConfig,
    events: parking_lot::Mutex<VecDeque<TradingRuleEvent>>,
    next_event_id: AtomicU64,
    rejected: AtomicU64,
    passed: AtomicU64,
    rule_counters: RuleResultCounters,
}

impl TradingRuleGate {
    pub fn new(source: Box<dyn SymbolInfoSource>, config: TradingRuleGateConfig) -> Self {
        Self {
            source,
            config,
            events: parking_lot::Mutex::new(VecDeque::new()),
            next_event_id: AtomicU64::new(1),
            rejected: AtomicU64::new(0),
            passed: AtomicU64::new(0),
            rule_counters: RuleResultCounters::default(),
        }
    }

    /// Round a candidate quantity down to the symbol's step size.
    pub fn fix_quantity(&self, symbol: &str, quantity: f64) -> f64 {
        match self.source.lookup(symbol) {
            Ok(Some(rules)) => round_down_to_step(quantity, rules.step_size),
            _ => quantity,
        }
    }

    /// Round a candidate price down to the symbol's tick size.
    pub fn fix_price(&self, symbol: &str, price: f64) -> f64 {
        match self.source.lookup(symbol) {
            Ok(Some(rules)) => round_down_to_step(price, rules.tick_size),
            _ => price,
        }
    }

    /// Evaluate the pipeline: symbol status, quantity, price, min notional.
    /// Returns the first failing rule, or `Pass` (spec §4.7).
    pub fn check(
        &self,
        strategy_id: &str,
        symbol: &str,
        _side: Side,
        quantity: f64,
        price: f64,
    ) -> RuleResult {
        let result = self.evaluate(symbol, quantity, price);
        self.record(strategy_id, symbol, result);
        result
    }

    fn evaluate(&self, symbol: &str, quantity: f64, price: f64) -> RuleResult {
        if quantity <= 0.0 || price < 0.0 {
            return RuleResult::RejectInvalidParams;
        }

        let rules = match self.source.lookup(symbol) {
            Ok(Some(rules)) => rules,
            Ok(None) => {
                return if self.config.fail_closed_on_missing_symbol {
                    RuleResult::RejectSymbolNotFound
                } else {
                    RuleResult::Pass
                };
            }
            Err(err) => {
                warn!(symbol, ?err, "symbol-info source error in trading rule gate");
                if self.config.fail_open_on_source_error {
                    return RuleResult::Pass;
                }
                return RuleResult::RejectSystemError;
            }
        };

        if !rules.trading_enabled {
            return RuleResult::RejectSymbolNotTrading;
        }
        if quantity < rules.min_quantity {
            return RuleResult::RejectQuantityTooSmall;
        }
        if quantity > rules.max_quantity {
            return RuleResult::RejectQuantityTooLarge;
        }
        if rules.step_size > 0.0 && (round_down_to_step(quantity, rules.step_size) - quantity).abs() > 1e-9 {
            return RuleResult::RejectQuantityPrecision;
        }
        if price > 0.0 {
            if price < rules.min_price {
                return RuleResult::RejectPriceTooLow;
            }
            if price > rules.max_price {
                return RuleResult::RejectPriceTooHigh;
            }
            if rules.tick_size > 0.0 && (round_down_to_step(price, rules.tick_size) - price).abs() > 1e-9 {
                return RuleResult::RejectPricePrecision;
            }
            if quantity * price < rules.min_notional {
                return RuleResult::RejectMinNotional;
            }
        }

        RuleResult::Pass
    }

    fn record(&self, strategy_id: &str, symbol: &str, result: RuleResult) {
        if result.is_pass() {
            self.passed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            self.rule_counters.record(result);
        }
        let event = TradingRuleEvent {
            event_id: self.next_event_id.fetch_add(1, Ordering::Relaxed),
            strategy_id: strategy_id.to_string(),
            symbol: symbol.to_string(),
            result,
            description: result.description().to_string(),
            timestamp_ns: now_ns(),
        };
        let mut events = self.events.lock();
        events.push_back(event);
        while events.len() > self.config.event_log_capacity {
            events.pop_front();
        }
    }

    pub fn recent_events(&self, limit: usize) -> Vec<TradingRuleEvent> {
        let events = self.events.lock();
        events.iter().rev().take(limit).cloned().collect()
    }

    pub fn passed_count(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Typed breakdown of rejections by rule (§8 scenario S6).
    pub fn rejection_counts(&self) -> RuleResultCounts {
        self.rule_counters.snapshot()
    }

    pub fn min_notional_violations(&self) -> u64 {
        self.rule_counters.min_notional.load(Ordering::Relaxed)
    }
}
