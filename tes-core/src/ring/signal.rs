//! `SignalRing`: the ingress ring carrying `Signal` records from the
//! upstream strategy process (spec §4.1, §6).

use super::record::{pack_fixed_str, unpack_fixed_str, RingRecord};
use super::RawRing;
use crate::core::{Side, Signal};
use crate::errors::RingError;
use std::time::Duration;

/// `1=BUY,2=SELL,3=HOLD,4=CLOSE` per spec §6's wire layout. Only BUY/SELL
/// carry through to a domain `Signal` (§3); HOLD/CLOSE are accepted on the
/// wire but the ingress side drops them rather than modeling a no-op order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireSignalType {
    Buy = 1,
    Sell = 2,
    Hold = 3,
    Close = 4,
}

impl WireSignalType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Buy),
            2 => Some(Self::Sell),
            3 => Some(Self::Hold),
            4 => Some(Self::Close),
            _ => None,
        }
    }

    pub fn to_side(self) -> Option<Side> {
        match self {
            Self::Buy => Some(Side::Buy),
            Self::Sell => Some(Side::Sell),
            Self::Hold | Self::Close => None,
        }
    }
}

/// Fixed-layout, little-endian, packed signal record (spec §6).
#[derive(Clone, Copy, Debug)]
#[repr(C, packed)]
pub struct SignalRecord {
    pub sequence_id: u64,
    pub timestamp_ns: u64,
    pub instrument_symbol: [u8; 32],
    pub signal_type: u8,
    pub _pad: [u8; 7],
    pub target_price: f64,
    pub target_volume: i64,
}

unsafe impl RingRecord for SignalRecord {}

impl SignalRecord {
    pub fn new(sequence_id: u64, timestamp_ns: u64, symbol: &str, side: Side, price: f64, volume: f64) -> Self {
        let signal_type = match side {
            Side::Buy => WireSignalType::Buy,
            Side::Sell => WireSignalType::Sell,
        } as u8;
        Self {
            sequence_id,
            timestamp_ns,
            instrument_symbol: pack_fixed_str(symbol),
            signal_type,
            _pad: [0; 7],
            target_price: price,
            target_volume: (volume * 1_000_000.0).round() as i64,
        }
    }

    pub fn symbol(&self) -> String {
        unpack_fixed_str(&self.instrument_symbol)
    }
}

/// A wire record whose `signal_type` is HOLD/CLOSE carries no domain
/// `Signal` equivalent; the ingress pump drops these rather than modeling a
/// no-op order (see [`WireSignalType`]).
impl TryFrom<SignalRecord> for Signal {
    type Error = ();

    fn try_from(record: SignalRecord) -> Result<Self, Self::Error> {
        let side = WireSignalType::from_u8(record.signal_type).and_then(WireSignalType::to_side).ok_or(())?;
        Ok(Signal {
            symbol: record.symbol(),
            side,
            target_price: record.target_price,
            target_quantity: record.target_volume as f64 / 1_000_000.0,
            sequence_id: record.sequence_id,
            timestamp_ns: record.timestamp_ns,
        })
    }
}

/// Single-writer (strategy process), single-reader (this process) ring of
/// `SignalRecord`s. Shared-memory name: `/tes_signal_<tag>` (spec §6).
pub struct SignalRing {
    inner: RawRing<SignalRecord>,
}

impl SignalRing {
    pub fn ring_name(tag: &str) -> String {
        format!("/tes_signal_{tag}")
    }

    pub fn create(tag: &str, capacity: u64) -> Result<Self, RingError> {
        Ok(Self {
            inner: RawRing::create(&Self::ring_name(tag), capacity)?,
        })
    }

    pub fn open(tag: &str, timeout: Duration) -> Result<Self, RingError> {
        Ok(Self {
            inner: RawRing::open(&Self::ring_name(tag), timeout)?,
        })
    }

    /// Writer side (strategy process in production; ExecutionController's
    /// tests use this to inject signals).
    pub fn push(&self, record: SignalRecord) -> bool {
        self.inner.push(record)
    }

    /// Reader side. `None` on an empty ring — callers must not treat this as
    /// an error (§4.1: "the reader MUST tolerate gaps").
    pub fn pop(&self) -> Option<SignalRecord> {
        self.inner.pop()
    }

    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_record_round_trips_symbol_and_side() {
        let record = SignalRecord::new(1, 1000, "BTCUSDT", Side::Buy, 30_000.0, 0.5);
        assert_eq!(record.symbol(), "BTCUSDT");
        assert_eq!(WireSignalType::from_u8(record.signal_type).unwrap().to_side(), Some(Side::Buy));
    }

    #[test]
    fn hold_and_close_do_not_convert_to_a_domain_signal() {
        let mut record = SignalRecord::new(1, 0, "BTCUSDT", Side::Buy, 1.0, 1.0);
        record.signal_type = WireSignalType::Hold as u8;
        assert!(Signal::try_from(record).is_err());
        record.signal_type = WireSignalType::Close as u8;
        assert!(Signal::try_from(record).is_err());
    }

    #[test]
    fn buy_sell_convert_to_a_domain_signal() {
        let record = SignalRecord::new(7, 42, "ETHUSDT", Side::Sell, 2_000.0, 1.5);
        let signal = Signal::try_from(record).unwrap();
        assert_eq!(signal.symbol, "ETHUSDT");
        assert_eq!(signal.side, Side::Sell);
        assert_eq!(signal.sequence_id, 7);
        assert!((signal.target_quantity - 1.5).abs() < 1e-9);
    }

    #[test]
    fn ring_tolerates_gaps_in_sequence_id() {
        let tag = format!("gap_{}", std::process::id());
        let ring = SignalRing::create(&tag, 8).unwrap();
        ring.push(SignalRecord::new(1, 0, "BTCUSDT", Side::Buy, 1.0, 1.0));
        ring.push(SignalRecord::new(5, 0, "BTCUSDT", Side::Buy, 1.0, 1.0));
        let first = ring.pop().unwrap();
        let second = ring.pop().unwrap();
        assert_eq!(first.sequence_id, 1);
        assert_eq!(second.sequence_id, 5);
        assert!(ring.pop().is_none());
    }
}
