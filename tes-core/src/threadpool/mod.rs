//! Fixed-size worker pool with a shared task queue (spec §4.4).
//!
//! Workers block on one condvar for `stop || !tasks.empty()`, pop the front
//! of a `VecDeque`, run it, and loop. `submit` hands back a
//! `crossbeam_channel::Receiver<R>` as the `future<R>` named in the spec.
//! Shutdown sets `stop`, broadcasts the condvar, and joins every worker;
//! whatever is still queued is dropped, never run.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    tasks: Mutex<VecDeque<Job>>,
    condvar: Condvar,
    stop: Mutex<bool>,
}

/// Fixed-size worker set draining a shared FIFO task queue.
///
/// Queue depth is unbounded — the spec is explicit that callers, not the
/// pool, own backpressure (§4.4: "callers must not submit unboundedly
/// without backpressure").
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let shared = Arc::new(Shared {
            tasks: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            stop: Mutex::new(false),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for idx in 0..worker_count {
            let shared = Arc::clone(&shared);
            workers.push(
                std::thread::Builder::new()
                    .name(format!("tes-pool-{idx}"))
                    .spawn(move || Self::worker_loop(shared))
                    .expect("failed to spawn thread pool worker"),
            );
        }

        Self { shared, workers }
    }

    fn worker_loop(shared: Arc<Shared>) {
        loop {
            let mut tasks = shared.tasks.lock();
            loop {
                if *shared.stop.lock() {
                    return;
                }
                if !tasks.is_empty() {
                    break;
                }
                shared.condvar.wait(&mut tasks);
            }
            let job = tasks.pop_front();
            drop(tasks);
            if let Some(job) = job {
                job();
            }
        }
    }

    /// Submit work, returning a receiver that yields the result once run.
    /// If every worker has already shut down the task is dropped unrun and
    /// the receiver observes a disconnected channel.
    pub fn submit<F, R>(&self, f: F) -> crossbeam::channel::Receiver<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = crossbeam::channel::bounded(1);
        let job: Job = Box::new(move || {
            let result = f();
            let _ = tx.send(result);
        });
        {
            let mut tasks = self.shared.tasks.lock();
            tasks.push_back(job);
        }
        self.shared.condvar.notify_one();
        rx
    }

    /// Fire-and-forget submission for callers that don't need a result
    /// (e.g. the callback manager's per-event dispatch tasks).
    pub fn submit_fire_and_forget<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut tasks = self.shared.tasks.lock();
            tasks.push_back(Box::new(f));
        }
        self.shared.condvar.notify_one();
    }

    pub fn queue_depth(&self) -> usize {
        self.shared.tasks.lock().len()
    }

    /// Stop accepting new work conceptually, wake every worker, and join
    /// them all. Pending tasks are dropped, not run. Idempotent.
    pub fn shutdown(&mut self) {
        {
            let mut stop = self.shared.stop.lock();
            if *stop {
                return;
            }
            *stop = true;
        }
        self.shared.condvar.notify_all();
        for worker in self.workers.drain(..) {
            if let Err(err) = worker.join() {
                warn!(?err, "thread pool worker panicked during shutdown");
            }
        }
        debug!("thread pool shut down");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn submit_runs_and_returns_result() {
        let pool = ThreadPool::new(2);
        let rx = pool.submit(|| 2 + 2);
        assert_eq!(rx.recv().unwrap(), 4);
    }

    #[test]
    fn many_tasks_all_complete() {
        let pool = ThreadPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let receivers: Vec<_> = (0..100)
            .map(|_| {
                let counter = Arc::clone(&counter);
                pool.submit(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();
        for rx in receivers {
            rx.recv().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut pool = ThreadPool::new(2);
        pool.shutdown();
        pool.shutdown();
    }
}
