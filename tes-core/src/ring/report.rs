//! `ReportRing`: the egress ring carrying `OrderReport` records to
//! downstream consumers (spec §4.2, §6).

use super::record::{pack_fixed_str, unpack_fixed_str, RingRecord};
use super::RawRing;
use crate::core::{OrderReport, OrderStatus, OrderType, Side};
use crate::errors::RingError;
use std::time::Duration;

/// Fixed-layout, little-endian, packed order-report record (spec §6).
#[derive(Clone, Copy, Debug)]
#[repr(C, packed)]
pub struct OrderReportRecord {
    pub order_id_hash: u64,
    pub symbol: [u8; 32],
    pub side: u8,
    pub order_type: u8,
    pub status: u8,
    pub _pad: [u8; 5],
    pub quantity: f64,
    pub filled_quantity: f64,
    pub price: f64,
    pub avg_fill_price: f64,
    pub commission: f64,
    pub timestamp_ns: u64,
    pub error_message: [u8; 128],
}

unsafe impl RingRecord for OrderReportRecord {}

fn hash_order_id(id: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

fn side_byte(side: Side) -> u8 {
    match side {
        Side::Buy => 1,
        Side::Sell => 2,
    }
}

fn order_type_byte(t: OrderType) -> u8 {
    match t {
        OrderType::Market => 1,
        OrderType::Limit => 2,
        OrderType::Stop => 3,
        OrderType::StopLimit => 4,
    }
}

fn status_byte(s: OrderStatus) -> u8 {
    match s {
        OrderStatus::Pending => 1,
        OrderStatus::Submitted => 2,
        OrderStatus::PartiallyFilled => 3,
        OrderStatus::Filled => 4,
        OrderStatus::Cancelled => 5,
        OrderStatus::Rejected => 6,
        OrderStatus::Error => 7,
    }
}

impl From<&OrderReport> for OrderReportRecord {
    fn from(r: &OrderReport) -> Self {
        let mut error_message = [0u8; 128];
        if let Some(msg) = &r.error_message {
            let bytes = msg.as_bytes();
            let len = bytes.len().min(127);
            error_message[..len].copy_from_slice(&bytes[..len]);
        }
        Self {
            order_id_hash: hash_order_id(&r.order_id),
            symbol: pack_fixed_str(&r.symbol),
            side: side_byte(r.side),
            order_type: order_type_byte(r.order_type),
            status: status_byte(r.status),
            _pad: [0; 5],
            quantity: r.quantity,
            filled_quantity: r.filled_quantity,
            price: r.price,
            avg_fill_price: r.avg_fill_price,
            commission: r.commission,
            timestamp_ns: r.timestamp_ns,
            error_message,
        }
    }
}

impl OrderReportRecord {
    pub fn symbol(&self) -> String {
        unpack_fixed_str(&self.symbol)
    }

    pub fn error_message(&self) -> Option<String> {
        let msg = unpack_fixed_str(&self.error_message);
        if msg.is_empty() {
            None
        } else {
            Some(msg)
        }
    }
}

/// Writer is this process; reader is a downstream consumer. Shared-memory
/// name: `/tes_order_report_<tag>` (spec §6).
pub struct ReportRing {
    inner: RawRing<OrderReportRecord>,
}

impl ReportRing {
    pub fn ring_name(tag: &str) -> String {
        format!("/tes_order_report_{tag}")
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

    pub fn push(&self, report: &OrderReport) -> bool {
        self.inner.push(OrderReportRecord::from(report))
    }

    pub fn pop(&self) -> Option<OrderReportRecord> {
        self.inner.pop()
    }

    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{now_ns, OrderReport};

    fn sample_report() -> OrderReport {
        OrderReport {
            order_id: "ORD_1_000001".into(),
            symbol: "ETHUSDT".into(),
            side: Side::Sell,
            order_type: OrderType::Limit,
            status: OrderStatus::Filled,
            quantity: 2.0,
            filled_quantity: 2.0,
            price: 2_000.0,
            avg_fill_price: 2_000.0,
            commission: 0.4,
            timestamp_ns: now_ns(),
            error_message: None,
        }
    }

    #[test]
    fn report_round_trips_through_ring() {
        let tag = format!("report_{}", std::process::id());
        let ring = ReportRing::create(&tag, 4).unwrap();
        let report = sample_report();
        assert!(ring.push(&report));
        let popped = ring.pop().unwrap();
        assert_eq!(popped.symbol(), "ETHUSDT");
        assert_eq!({ popped.status }, status_byte(OrderStatus::Filled));
    }
}
