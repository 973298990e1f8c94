//! Point-in-time pool statistics.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::SystemTime;

use serde::Serialize;

/// Snapshot of pool counters.
///
/// Each field is read independently, so a snapshot is eventually
/// consistent: good for monitoring and scaling, not for exact accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStat {
    /// When the snapshot was taken.
    pub timestamp: SystemTime,
    /// Configured maximum workers.
    pub max_workers: i64,
    /// Configured minimum workers.
    pub min_workers: i64,
    /// Live worker threads.
    pub workers: i64,
    /// Work items that finished (including ones that failed or panicked).
    pub executed: u64,
    /// Submissions waiting for a worker to accept them.
    pub pending: i64,
    /// Work items currently running.
    pub active: i64,
}

impl PoolStat {
    /// Workers not running anything.
    pub fn idle(&self) -> i64 {
        (self.workers - self.active).max(0)
    }

    /// Busy workers as a fraction of live workers (0.0 - 1.0).
    pub fn utilization(&self) -> f64 {
        if self.workers > 0 {
            self.active as f64 / self.workers as f64
        } else {
            0.0
        }
    }
}

/// Pool-wide atomic counters.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub current_workers: AtomicI64,
    /// Scaling tokens issued but not yet applied.
    pub update_pending: AtomicI64,
    /// Workers told to stop by a scale-down that have not exited yet.
    pub retiring: AtomicI64,
    pub active_work: AtomicI64,
    pub pending_work: AtomicI64,
    pub executed_work: AtomicU64,
}

impl Counters {
    pub fn snapshot(&self, min_workers: i64, max_workers: i64) -> PoolStat {
        PoolStat {
            timestamp: SystemTime::now(),
            max_workers,
            min_workers,
            workers: self.current_workers.load(Ordering::SeqCst),
            executed: self.executed_work.load(Ordering::SeqCst),
            pending: self.pending_work.load(Ordering::SeqCst),
            active: self.active_work.load(Ordering::SeqCst),
        }
    }
}
