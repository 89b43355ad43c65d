//! Lock-Free Performance Metrics
//!
//! Cache-aligned atomic counters for zero-overhead hot-path tracking,
//! distinct from the Prometheus-facing counters in `monitoring::metrics`:
//! these are meant to be touched on the signal-pump/dispatch fast path
//! without contending a shared cache line with their neighbors.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cache-aligned metrics structure
///
/// Each metric is an atomic counter on its own cache line to prevent
/// false sharing between CPU cores.
#[repr(C, align(64))]
pub struct Metrics {
    /// Signals consumed off the ring
    pub signals_consumed: AtomicU64,

    _padding1: [u8; 56],

    /// Orders created (direct + TWAP slices combined)
    pub orders_created: AtomicU64,

    _padding2: [u8; 56],

    /// Fills received from the gateway/reconciliation worker
    pub fills_received: AtomicU64,

    _padding3: [u8; 56],

    /// TWAP slices dispatched
    pub slices_dispatched: AtomicU64,

    _padding4: [u8; 56],

    /// Total signal-to-dispatch latency in nanoseconds (cumulative)
    pub total_latency_ns: AtomicU64,

    _padding5: [u8; 56],
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            signals_consumed: AtomicU64::new(0),
            _padding1: [0; 56],
            orders_created: AtomicU64::new(0),
            _padding2: [0; 56],
            fills_received: AtomicU64::new(0),
            _padding3: [0; 56],
            slices_dispatched: AtomicU64::new(0),
            _padding4: [0; 56],
            total_latency_ns: AtomicU64::new(0),
            _padding5: [0; 56],
        }
    }

    #[inline(always)]
    pub fn inc_signals(&self) {
        self.signals_consumed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_orders(&self) {
        self.orders_created.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_fills(&self) {
        self.fills_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_slices(&self) {
        self.slices_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn add_latency(&self, latency_ns: u64) {
        self.total_latency_ns.fetch_add(latency_ns, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            signals_consumed: self.signals_consumed.load(Ordering::Relaxed),
            orders_created: self.orders_created.load(Ordering::Relaxed),
            fills_received: self.fills_received.load(Ordering::Relaxed),
            slices_dispatched: self.slices_dispatched.load(Ordering::Relaxed),
            total_latency_ns: self.total_latency_ns.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.signals_consumed.store(0, Ordering::Relaxed);
        self.orders_created.store(0, Ordering::Relaxed);
        self.fills_received.store(0, Ordering::Relaxed);
        self.slices_dispatched.store(0, Ordering::Relaxed);
        self.total_latency_ns.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub signals_consumed: u64,
    pub orders_created: u64,
    pub fills_received: u64,
    pub slices_dispatched: u64,
    pub total_latency_ns: u64,
}

impl MetricsSnapshot {
    /// Average signal-to-dispatch latency, in nanoseconds
    pub fn avg_latency_ns(&self) -> f64 {
        if self.signals_consumed > 0 {
            self.total_latency_ns as f64 / self.signals_consumed as f64
        } else {
            0.0
        }
    }

    /// Orders created per signal consumed
    pub fn order_rate(&self) -> f64 {
        if self.signals_consumed > 0 {
            self.orders_created as f64 / self.signals_consumed as f64
        } else {
            0.0
        }
    }

    /// Fills received per order created
    pub fn fill_rate(&self) -> f64 {
        if self.orders_created > 0 {
            self.fills_received as f64 / self.orders_created as f64
        } else {
            0.0
        }
    }
}

/// Cache-aligned wrapper for any type
#[repr(C, align(64))]
pub struct CacheAligned<T> {
    inner: T,
}

impl<T> CacheAligned<T> {
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn get(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_counters_are_cache_line_separated() {
        assert_eq!(std::mem::align_of::<Metrics>(), 64);

        let metrics = Metrics::new();
        let signals_ptr = &metrics.signals_consumed as *const _ as usize;
        let orders_ptr = &metrics.orders_created as *const _ as usize;
        assert_eq!(orders_ptr - signals_ptr, 64);
    }

    #[test]
    fn metrics_operations_accumulate() {
        let metrics = Metrics::new();

        metrics.inc_signals();
        metrics.inc_signals();
        metrics.inc_orders();
        metrics.inc_fills();
        metrics.inc_slices();
        metrics.add_latency(100);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.signals_consumed, 2);
        assert_eq!(snapshot.orders_created, 1);
        assert_eq!(snapshot.fills_received, 1);
        assert_eq!(snapshot.slices_dispatched, 1);
        assert_eq!(snapshot.total_latency_ns, 100);
    }

    #[test]
    fn snapshot_rate_calculations() {
        let snapshot = MetricsSnapshot {
            signals_consumed: 100,
            orders_created: 50,
            fills_received: 20,
            slices_dispatched: 30,
            total_latency_ns: 10_000,
        };

        assert_eq!(snapshot.avg_latency_ns(), 100.0);
        assert_eq!(snapshot.order_rate(), 0.5);
        assert_eq!(snapshot.fill_rate(), 0.4);
    }

    #[test]
    fn cache_aligned_wraps_value() {
        let aligned = CacheAligned::new(42u64);
        assert_eq!(std::mem::align_of::<CacheAligned<u64>>(), 64);
        assert_eq!(*aligned.get(), 42);
    }

    #[test]
    fn metrics_reset_clears_all_counters() {
        let metrics = Metrics::new();

        metrics.inc_signals();
        metrics.inc_orders();
        assert_eq!(metrics.snapshot().signals_consumed, 1);

        metrics.reset();
        assert_eq!(metrics.snapshot().signals_consumed, 0);
        assert_eq!(metrics.snapshot().orders_created, 0);
    }
}
