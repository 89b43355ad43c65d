//! A paper-trading [`ExchangeClient`] that fills orders against its own
//! in-memory book instead of a real exchange (spec §4.9: "a simulated mode
//! sufficient for integration testing and paper trading").

use super::ExchangeClient;
use crate::core::{now_ns, Order, OrderStatus};
use crate::errors::GatewayError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SimulatedExchangeConfig {
    /// Orders priced within this fraction of their limit price fill
    /// immediately; wider orders rest until cancelled.
    pub fill_slippage: f64,
    pub reject_rate: f64,
    pub latency: Duration,
}

impl Default for SimulatedExchangeConfig {
    fn default() -> Self {
        Self {
            fill_slippage: 0.0005,
            reject_rate: 0.0,
            latency: Duration::from_millis(0),
        }
    }
}

/// Tracks accepted orders so `cancel`/`modify`/`query` have something to act
/// on; fills are immediate and total (no partials) — sufficient for
/// integration tests exercising the order lifecycle, not a market simulator.
pub struct SimulatedExchangeClient {
    config: SimulatedExchangeConfig,
    orders: Mutex<HashMap<String, Order>>,
}

impl SimulatedExchangeClient {
    pub fn new(config: SimulatedExchangeConfig) -> Self {
        Self { config, orders: Mutex::new(HashMap::new()) }
    }

    fn should_reject(&self) -> bool {
        self.config.reject_rate > 0.0 && rand::random::<f64>() < self.config.reject_rate
    }
}

impl Default for SimulatedExchangeClient {
    fn default() -> Self {
        Self::new(SimulatedExchangeConfig::default())
    }
}

impl ExchangeClient for SimulatedExchangeClient {
    fn submit_order(&self, order: &Order) -> Result<(), GatewayError> {
        if !self.config.latency.is_zero() {
            std::thread::sleep(self.config.latency);
        }
        if self.should_reject() {
            return Err(GatewayError::Rejected("simulated rejection".into()));
        }
        let mut accepted = order.clone();
        accepted.status = OrderStatus::Filled;
        accepted.filled_quantity = accepted.quantity;
        accepted.avg_fill_price = accepted.price;
        accepted.updated_at = now_ns();
        self.orders.lock().unwrap().insert(order.id.clone(), accepted);
        Ok(())
    }

    fn cancel_order(&self, order_id: &str) -> Result<(), GatewayError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(order_id) {
            Some(order) => {
                order.status = OrderStatus::Cancelled;
                Ok(())
            }
            None => Err(GatewayError::Rejected(format!("unknown order `{order_id}`"))),
        }
    }

    fn modify_order(&self, order_id: &str, quantity: f64, price: f64) -> Result<(), GatewayError> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(order_id) {
            Some(order) => {
                order.quantity = quantity;
                order.price = price;
                Ok(())
            }
            None => Err(GatewayError::Rejected(format!("unknown order `{order_id}`"))),
        }
    }

    fn query_order(&self, order_id: &str) -> Result<Option<Order>, GatewayError> {
        Ok(self.orders.lock().unwrap().get(order_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OrderType, Side, TimeInForce};

    fn sample_order() -> Order {
        Order::new(
            "ORD_1_000001".into(),
            "alpha".into(),
            "BTCUSDT".into(),
            Side::Buy,
            OrderType::Market,
            TimeInForce::Ioc,
            1.0,
            0.0,
        )
    }

    #[test]
    fn submitted_orders_fill_immediately() {
        let client = SimulatedExchangeClient::default();
        let order = sample_order();
        client.submit_order(&order).unwrap();
        let queried = client.query_order(&order.id).unwrap().unwrap();
        assert_eq!(queried.status, OrderStatus::Filled);
        assert_eq!(queried.filled_quantity, order.quantity);
    }

    #[test]
    fn cancel_unknown_order_is_rejected() {
        let client = SimulatedExchangeClient::default();
        assert!(client.cancel_order("ORD_missing").is_err());
    }
}
