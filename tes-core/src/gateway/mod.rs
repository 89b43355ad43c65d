//! Gateway adapter: the seam between this engine and an exchange (spec
//! §4.9).
//!
//! `ExchangeClient` is a trait, not a singleton, so tests and the simulated
//! binary can swap in [`SimulatedExchangeClient`] without touching
//! `OrderStore`/`ExecutionController` — the same collaborator-substitution
//! idiom the teacher uses for its market-data feed trait. `GatewayAdapter`
//! wraps a concrete client with the shared [`CircuitBreaker`] and a bounded
//! retry/backoff loop so `OrderStore`/`TWAPScheduler` never talk to the
//! exchange directly.

pub mod simulated;

pub use simulated::SimulatedExchangeClient;

use crate::core::Order;
use crate::errors::GatewayError;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Minimal exchange surface the rest of the engine depends on. Each method
/// is expected to be synchronous from the caller's perspective — adapters
/// that talk to an async exchange API block internally on their own runtime.
pub trait ExchangeClient: Send + Sync {
    fn submit_order(&self, order: &Order) -> Result<(), GatewayError>;
    fn cancel_order(&self, order_id: &str) -> Result<(), GatewayError>;
    fn modify_order(&self, order_id: &str, quantity: f64, price: f64) -> Result<(), GatewayError>;
    /// Pull the exchange's current view of an order, for reconciliation.
    fn query_order(&self, order_id: &str) -> Result<Option<Order>, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct GatewayAdapterConfig {
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for GatewayAdapterConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_backoff: Duration::from_millis(200),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

/// Wraps an [`ExchangeClient`] with retry/backoff and a circuit breaker
/// (spec §4.9: "transport failures retry with exponential backoff up to a
/// configured limit; exhausting the budget trips the circuit breaker").
pub struct GatewayAdapter {
    client: Arc<dyn ExchangeClient>,
    breaker: CircuitBreaker,
    max_retries: u32,
    retry_backoff: Duration,
}

impl GatewayAdapter {
    pub fn new(client: Arc<dyn ExchangeClient>, config: GatewayAdapterConfig) -> Self {
        Self {
            client,
            breaker: CircuitBreaker::new(config.circuit_breaker),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        }
    }

    fn with_retry<F>(&self, op_name: &str, mut call: F) -> Result<(), GatewayError>
    where
        F: FnMut() -> Result<(), GatewayError>,
    {
        if !self.breaker.is_call_permitted() {
            return Err(GatewayError::CircuitOpen);
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            match call() {
                Ok(()) => {
                    self.breaker.record_success();
                    return Ok(());
                }
                Err(GatewayError::Rejected(reason)) => {
                    // A rejection is the exchange's authoritative answer, not a
                    // transport fault: don't retry, don't trip the breaker.
                    return Err(GatewayError::Rejected(reason));
                }
                Err(err) => {
                    self.breaker.record_failure();
                    if attempts > self.max_retries {
                        warn!(op = op_name, attempts, "gateway call exhausted retry budget");
                        return Err(GatewayError::TransportExhausted {
                            attempts,
                            message: err.to_string(),
                        });
                    }
                    debug!(op = op_name, attempts, ?err, "retrying gateway call");
                    std::thread::sleep(self.retry_backoff * attempts);
                }
            }
        }
    }

    pub fn submit_order(&self, order: &Order) -> Result<(), GatewayError> {
        self.with_retry("submit_order", || self.client.submit_order(order))
    }

    pub fn cancel_order(&self, order_id: &str) -> Result<(), GatewayError> {
        self.with_retry("cancel_order", || self.client.cancel_order(order_id))
    }

    pub fn modify_order(&self, order_id: &str, quantity: f64, price: f64) -> Result<(), GatewayError> {
        self.with_retry("modify_order", || self.client.modify_order(order_id, quantity, price))
    }

    pub fn query_order(&self, order_id: &str) -> Result<Option<Order>, GatewayError> {
        if !self.breaker.is_call_permitted() {
            return Err(GatewayError::CircuitOpen);
        }
        match self.client.query_order(order_id) {
            Ok(result) => {
                self.breaker.record_success();
                Ok(result)
            }
            Err(err) => {
                self.breaker.record_failure();
                Err(err)
            }
        }
    }

    pub fn circuit_state(&self) -> crate::resilience::CircuitState {
        self.breaker.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OrderType, Side, TimeInForce};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyClient {
        failures_remaining: AtomicU32,
    }

    impl ExchangeClient for FlakyClient {
        fn submit_order(&self, _order: &Order) -> Result<(), GatewayError> {
            if self.failures_remaining.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n > 0 {
                    Some(n - 1)
                } else {
                    None
                }
            }).is_ok()
            {
                Err(GatewayError::TransportExhausted { attempts: 1, message: "timeout".into() })
            } else {
                Ok(())
            }
        }
        fn cancel_order(&self, _order_id: &str) -> Result<(), GatewayError> {
            Ok(())
        }
        fn modify_order(&self, _order_id: &str, _q: f64, _p: f64) -> Result<(), GatewayError> {
            Ok(())
        }
        fn query_order(&self, _order_id: &str) -> Result<Option<Order>, GatewayError> {
            Ok(None)
        }
    }

    fn sample_order() -> Order {
        Order::new(
            "ORD_1_000001".into(),
            "alpha".into(),
            "BTCUSDT".into(),
            Side::Buy,
            OrderType::Limit,
            TimeInForce::Ioc,
            1.0,
            30_000.0,
        )
    }

    #[test]
    fn retries_until_success_within_budget() {
        let client = Arc::new(FlakyClient { failures_remaining: AtomicU32::new(2) });
        let adapter = GatewayAdapter::new(
            client,
            GatewayAdapterConfig {
                max_retries: 5,
                retry_backoff: Duration::from_millis(1),
                circuit_breaker: CircuitBreakerConfig::default(),
            },
        );
        assert!(adapter.submit_order(&sample_order()).is_ok());
    }

    #[test]
    fn exhausting_retries_reports_transport_error() {
        let client = Arc::new(FlakyClient { failures_remaining: AtomicU32::new(100) });
        let adapter = GatewayAdapter::new(
            client,
            GatewayAdapterConfig {
                max_retries: 2,
                retry_backoff: Duration::from_millis(1),
                circuit_breaker: CircuitBreakerConfig::default(),
            },
        );
        let result = adapter.submit_order(&sample_order());
        assert!(matches!(result, Err(GatewayError::TransportExhausted { .. })));
    }
}
