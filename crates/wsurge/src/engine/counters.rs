use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Aggregate connection statistics shared by every worker.
///
/// Each field is an independent atomic; updates are single-field increments
/// and no cross-field consistency is promised. `active` is maintained through
/// [`ActiveGuard`] so no worker exit path can leak the count.
#[derive(Debug, Default)]
pub struct Counters {
    successful: AtomicU64,
    failed: AtomicU64,
    active: AtomicI64,
    bytes_read: AtomicU64,
}

impl Counters {
    /// Records one successful connect (initial or reconnect) and returns the
    /// guard holding the active-connection slot.
    pub fn connection_opened(self: &Arc<Self>) -> ActiveGuard {
        self.successful.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_add(1, Ordering::SeqCst);
        ActiveGuard {
            counters: Arc::clone(self),
        }
    }

    /// Records one failed connect or heartbeat attempt.
    pub fn add_failure(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Records the payload size of one successfully read message.
    pub fn add_bytes(&self, n: usize) {
        self.bytes_read.fetch_add(n as u64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            active: self.active.load(Ordering::SeqCst),
            successful: self.successful.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            bytes_read: self.bytes_read.load(Ordering::SeqCst),
        }
    }
}

/// Point-in-time view of the counters. Fields are individually consistent,
/// not read atomically as a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub active: i64,
    pub successful: u64,
    pub failed: u64,
    pub bytes_read: u64,
}

/// Holds one slot of the `active` gauge for as long as its connection lives.
#[derive(Debug)]
pub struct ActiveGuard {
    counters: Arc<Counters>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
    }
}
