//! Resilience primitives shared by the gateway and controller: a circuit
//! breaker guarding exchange calls, and a signal-driven kill switch for
//! controlled shutdown/pause (spec §4.9, §4.10, §9).

pub mod circuit_breaker;
pub mod kill_switch;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use kill_switch::{KillSwitch, KillSwitchState};
