//! A programmable writer for [`SignalRing`], standing in for the upstream
//! strategy process in integration tests (the signal-side analogue of
//! [`crate::gateway::SimulatedExchangeClient`] on the exchange side).

use crate::core::{now_ns, Side};
use crate::ring::{SignalRecord, SignalRing};
use std::sync::atomic::{AtomicU64, Ordering};

/// Wraps a [`SignalRing`] writer with an auto-incrementing sequence id, so
/// scenario tests can push signals without tracking sequence numbers by hand.
pub struct MockSignalFeed {
    ring: std::sync::Arc<SignalRing>,
    next_sequence: AtomicU64,
}

impl MockSignalFeed {
    pub fn new(ring: std::sync::Arc<SignalRing>) -> Self {
        Self { ring, next_sequence: AtomicU64::new(1) }
    }

    fn next_id(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Pushes a BUY or SELL signal. Returns `false` if the ring was full
    /// (the writer-side drop the spec mandates for overflow).
    pub fn push_order(&self, symbol: &str, side: Side, price: f64, quantity: f64) -> bool {
        let record = SignalRecord::new(self.next_id(), now_ns(), symbol, side, price, quantity);
        self.ring.push(record)
    }

    /// Pushes a HOLD signal (accepted on the wire but dropped by the ingress
    /// pump before it becomes a domain `Signal`; see `ring::signal`).
    pub fn push_hold(&self, symbol: &str) -> bool {
        let mut record = SignalRecord::new(self.next_id(), now_ns(), symbol, Side::Buy, 0.0, 0.0);
        record.signal_type = crate::ring::signal::WireSignalType::Hold as u8;
        self.ring.push(record)
    }
}
