//! Builders for the domain types, used by scenario tests and benchmarks so
//! every test doesn't hand-roll the same `Order`/`Signal` literals.

use crate::core::{Order, OrderType, Side, Signal, TimeInForce};
use crate::risk::{StaticSymbolInfoSource, SymbolRules};

/// Trading rules for `BTCUSDT`, loose enough that most test orders pass.
pub fn btcusdt_rules() -> SymbolRules {
    SymbolRules {
        trading_enabled: true,
        min_quantity: 0.0001,
        max_quantity: 1000.0,
        step_size: 0.0001,
        min_price: 0.01,
        max_price: 10_000_000.0,
        tick_size: 0.01,
        min_notional: 10.0,
    }
}

/// A `StaticSymbolInfoSource` pre-populated with `BTCUSDT` and `ETHUSDT`.
pub fn test_symbol_source() -> StaticSymbolInfoSource {
    let source = StaticSymbolInfoSource::new();
    source.insert("BTCUSDT", btcusdt_rules());
    source.insert(
        "ETHUSDT",
        SymbolRules {
            min_quantity: 0.001,
            max_quantity: 5000.0,
            step_size: 0.001,
            min_price: 0.01,
            max_price: 100_000.0,
            tick_size: 0.01,
            min_notional: 10.0,
            trading_enabled: true,
        },
    );
    source
}

/// Builds a `BUY`/`SELL` market `Signal` with a monotonic sequence id.
pub fn make_signal(sequence_id: u64, symbol: &str, side: Side, quantity: f64, price: f64) -> Signal {
    Signal {
        symbol: symbol.to_string(),
        side,
        target_price: price,
        target_quantity: quantity,
        sequence_id,
        timestamp_ns: crate::core::now_ns(),
    }
}

/// Builds a plain limit `Order` for store/gateway tests.
pub fn make_order(id: &str, strategy_id: &str, symbol: &str, side: Side, quantity: f64, price: f64) -> Order {
    Order::new(
        id.to_string(),
        strategy_id.to_string(),
        symbol.to_string(),
        side,
        OrderType::Limit,
        TimeInForce::Ioc,
        quantity,
        price,
    )
}
