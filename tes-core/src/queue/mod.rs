//! In-process MPMC queue decoupling ring ingress from worker threads
//! (spec §4.3).
//!
//! The spec describes a hand-rolled intrusive atomic singly-linked list
//! (allocate a node, CAS-swap the tail to enqueue; CAS-advance the head to
//! dequeue). [`crossbeam::queue::SegQueue`] is the idiomatic Rust expression
//! of that same contract — wait-free enqueue once allocation succeeds,
//! best-effort FIFO dequeue that never blocks — without hand-rolled unsafe
//! pointer chasing, so this module is a thin typed wrapper over it.

use crossbeam::queue::SegQueue;

/// Unbounded MPMC queue. `enqueue` is wait-free for the producer once
/// allocation succeeds; `dequeue` never blocks, looping internally under
/// contention. FIFO per single producer; best-effort ordering across
/// multiple producers (spec §4.3).
pub struct LockFreeQueue<T> {
    inner: SegQueue<T>,
}

impl<T> LockFreeQueue<T> {
    pub fn new() -> Self {
        Self { inner: SegQueue::new() }
    }

    pub fn enqueue(&self, item: T) {
        self.inner.push(item);
    }

    pub fn dequeue(&self) -> Option<T> {
        self.inner.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T> Default for LockFreeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn fifo_per_single_producer() {
        let q = LockFreeQueue::new();
        for i in 0..10 {
            q.enqueue(i);
        }
        for i in 0..10 {
            assert_eq!(q.dequeue(), Some(i));
        }
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn concurrent_producers_all_items_delivered() {
        let q = Arc::new(LockFreeQueue::new());
        let mut handles = vec![];
        for p in 0..4 {
            let q = Arc::clone(&q);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    q.enqueue(p * 100 + i);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let mut seen = vec![];
        while let Some(item) = q.dequeue() {
            seen.push(item);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..400).collect::<Vec<_>>());
    }
}
