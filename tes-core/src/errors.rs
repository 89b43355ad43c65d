//! Component-boundary error types.
//!
//! Validation, capacity, and protocol/state outcomes are represented as
//! plain result codes or `Option`/`bool` returns from component methods, not
//! as errors — a rejected signal or a duplicate order is an expected
//! outcome, not a fault. These types are reserved for conditions a caller
//! cannot recover from by inspecting a result code alone: malformed
//! configuration, a shared-memory segment that cannot be opened, an
//! exchange call that exhausted its retry budget.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RingError {
    #[error("shared memory segment `{name}` already exists")]
    AlreadyExists { name: String },

    #[error("failed to open shared memory segment `{name}`: {source}")]
    Open {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to map shared memory segment `{name}`: {source}")]
    Map {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out waiting for segment `{name}` to be initialized")]
    InitTimeout { name: String },
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("exchange rejected order: {0}")]
    Rejected(String),

    #[error("transport error after {attempts} attempt(s): {message}")]
    TransportExhausted { attempts: u32, message: String },

    #[error("circuit breaker open, call not permitted")]
    CircuitOpen,
}

#[derive(Debug, Error)]
pub enum OrderStoreError {
    #[error("order `{0}` not found")]
    NotFound(String),

    #[error("order rejected: {0}")]
    Invalid(String),

    #[error("duplicate live order for (strategy, symbol, side, quantity, price)")]
    Duplicate,

    #[error("live order count at capacity ({max_pending})")]
    AtCapacity { max_pending: usize },

    #[error("illegal transition from {from:?} to {to:?} rejected, order left unchanged")]
    IllegalTransition {
        from: crate::core::OrderStatus,
        to: crate::core::OrderStatus,
    },
}

#[derive(Debug, Error)]
pub enum TradingRuleError {
    #[error("symbol `{0}` has no exchange-info entry")]
    SymbolInfoUnavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::TransportExhausted {
            attempts: 3,
            message: "connection reset".into(),
        };
        assert!(err.to_string().contains("3 attempt"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid("max_threads must be > 0".into());
        assert!(err.to_string().contains("max_threads"));
    }
}
