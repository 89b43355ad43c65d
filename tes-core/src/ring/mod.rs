//! Cross-process shared-memory ring buffers (spec §4.1, §4.2, §6).
//!
//! A ring is a fixed-capacity slot array behind a small header (capacity,
//! atomic head/tail, an atomic `initialized` flag) inside a POSIX shared
//! memory segment. One process creates the segment with exclusive-create
//! semantics and publishes `initialized = true` once the slot array has been
//! zeroed; every other process opens the same name and spins until that flag
//! flips. The protocol itself (writer publishes at `head` then advances it,
//! reader consumes at `tail` then advances it, full when
//! `(head+1) % capacity == tail`) lives in [`RawRing`] and is shared by
//! [`signal::SignalRing`] and [`report::ReportRing`].

pub mod record;
pub mod report;
pub mod signal;

use crate::errors::RingError;
use std::ffi::CString;
use std::fs::File;
use std::marker::PhantomData;
use std::os::unix::io::FromRawFd;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};

pub use record::RingRecord;
pub use report::{OrderReportRecord, ReportRing};
pub use signal::{SignalRecord, SignalRing};

/// Shared header at the front of every ring's mapping. `head` is advanced
/// only by the writer, `tail` only by the reader; both use
/// acquire/release so the reader never observes a slot before the writer's
/// publish of it is visible (§5, "Ordering guarantees").
#[repr(C)]
struct RingHeader {
    capacity: AtomicU64,
    head: AtomicU64,
    tail: AtomicU64,
    initialized: AtomicU8,
}

const HEADER_SIZE: usize = std::mem::size_of::<RingHeader>();

/// Outcome of a `pop` with no record ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopOutcome {
    Empty,
}

/// Generic POSIX-shared-memory ring buffer of fixed-layout `R` records.
///
/// `push` drops at the writer on overflow (never blocks, never overwrites an
/// unread slot); `pop` returns `None` on an empty ring. Neither spins
/// internally — callers that need retry-with-timeout semantics (ring "pop
/// with timeout" in §5) loop on `pop` themselves with their own sleep/yield.
pub struct RawRing<R: RingRecord> {
    mmap: memmap2::MmapMut,
    name: String,
    is_creator: bool,
    dropped: std::sync::Arc<std::sync::atomic::AtomicU64>,
    _marker: PhantomData<R>,
}

unsafe impl<R: RingRecord> Send for RawRing<R> {}
unsafe impl<R: RingRecord> Sync for RawRing<R> {}

impl<R: RingRecord> RawRing<R> {
    fn slot_size() -> usize {
        std::mem::size_of::<R>()
    }

    fn segment_size(capacity: u64) -> usize {
        HEADER_SIZE + capacity as usize * Self::slot_size()
    }

    /// Create the named segment (exclusive-create) and publish it.
    pub fn create(name: &str, capacity: u64) -> Result<Self, RingError> {
        assert!(capacity >= 2, "ring capacity must allow at least one free slot");
        let cname = CString::new(name).expect("ring name must not contain NUL");
        let size = Self::segment_size(capacity);

        let fd = unsafe {
            libc::shm_open(
                cname.as_ptr(),
                libc::O_CREAT | libc::O_EXCL | libc::O_RDWR,
                0o600,
            )
        };
        if fd < 0 {
            return Err(RingError::AlreadyExists { name: name.to_string() });
        }
        let file = unsafe { File::from_raw_fd(fd) };
        file.set_len(size as u64).map_err(|source| RingError::Open {
            name: name.to_string(),
            source,
        })?;

        let mut mmap = unsafe {
            memmap2::MmapMut::map_mut(&file).map_err(|source| RingError::Map {
                name: name.to_string(),
                source,
            })?
        };
        // Leak `file`'s fd ownership into the mapping's lifetime; the mapping
        // itself keeps the segment alive, the fd can be closed immediately.
        drop(file);

        {
            let header = unsafe { &mut *(mmap.as_mut_ptr() as *mut RingHeader) };
            header.capacity = AtomicU64::new(capacity);
            header.head = AtomicU64::new(0);
            header.tail = AtomicU64::new(0);
            header.initialized = AtomicU8::new(0);
            std::sync::atomic::fence(Ordering::Release);
            header.initialized.store(1, Ordering::Release);
        }

        Ok(Self {
            mmap,
            name: name.to_string(),
            is_creator: true,
            dropped: Default::default(),
            _marker: PhantomData,
        })
    }

    /// Open an existing segment, waiting up to `timeout` for the creator to
    /// finish publishing it.
    pub fn open(name: &str, timeout: Duration) -> Result<Self, RingError> {
        let cname = CString::new(name).expect("ring name must not contain NUL");
        let fd = unsafe { libc::shm_open(cname.as_ptr(), libc::O_RDWR, 0o600) };
        if fd < 0 {
            return Err(RingError::Open {
                name: name.to_string(),
                source: std::io::Error::last_os_error(),
            });
        }
        let file = unsafe { File::from_raw_fd(fd) };
        let mmap = unsafe {
            memmap2::MmapMut::map_mut(&file).map_err(|source| RingError::Map {
                name: name.to_string(),
                source,
            })?
        };
        drop(file);

        let header = unsafe { &*(mmap.as_ptr() as *const RingHeader) };
        let deadline = Instant::now() + timeout;
        while header.initialized.load(Ordering::Acquire) == 0 {
            if Instant::now() >= deadline {
                return Err(RingError::InitTimeout { name: name.to_string() });
            }
            std::thread::sleep(Duration::from_micros(100));
        }

        Ok(Self {
            mmap,
            name: name.to_string(),
            is_creator: false,
            dropped: Default::default(),
            _marker: PhantomData,
        })
    }

    fn header(&self) -> &RingHeader {
        unsafe { &*(self.mmap.as_ptr() as *const RingHeader) }
    }

    fn capacity(&self) -> u64 {
        self.header().capacity.load(Ordering::Relaxed)
    }

    fn slot_ptr(&self, index: u64) -> *mut R {
        unsafe {
            self.mmap
                .as_ptr()
                .add(HEADER_SIZE + index as usize * Self::slot_size()) as *mut R
        }
    }

    /// Writer side. Returns `false` (and increments the drop counter) when
    /// the ring is full; never blocks.
    pub fn push(&self, record: R) -> bool {
        let header = self.header();
        let capacity = self.capacity();
        let head = header.head.load(Ordering::Relaxed);
        let tail = header.tail.load(Ordering::Acquire);
        let next = (head + 1) % capacity;
        if next == tail {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        unsafe { std::ptr::write_unaligned(self.slot_ptr(head), record) };
        header.head.store(next, Ordering::Release);
        true
    }

    /// Reader side. Returns `None` when the ring is empty; never blocks.
    /// Tolerates gaps in the record's own sequence id — it only reports
    /// structural emptiness, not content validity.
    pub fn pop(&self) -> Option<R> {
        let header = self.header();
        let capacity = self.capacity();
        let tail = header.tail.load(Ordering::Relaxed);
        let head = header.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let record = unsafe { std::ptr::read_unaligned(self.slot_ptr(tail)) };
        header.tail.store((tail + 1) % capacity, Ordering::Release);
        Some(record)
    }

    /// Number of records the writer has dropped due to a full ring.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        let header = self.header();
        header.head.load(Ordering::Acquire) == header.tail.load(Ordering::Acquire)
    }
}

impl<R: RingRecord> Drop for RawRing<R> {
    fn drop(&mut self) {
        if self.is_creator {
            if let Ok(cname) = CString::new(self.name.as_str()) {
                unsafe {
                    libc::shm_unlink(cname.as_ptr());
                }
            }
        }
    }
}
