/*!
 * Lock-Free Pool Statistics
 * Uses atomic counters for zero-contention stats tracking in hot scheduling paths
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of pool activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Worker threads in the pool
    pub workers: usize,
    /// Tasks waiting in queues when the snapshot was taken
    pub queued: usize,
    /// Tasks accepted by `post_work` / `post_task`
    pub submitted: u64,
    /// Tasks that have finished running (including ones that panicked)
    pub executed: u64,
    /// Tasks a worker took from a peer's queue
    pub stolen: u64,
    /// Tasks whose body panicked
    pub panicked: u64,
    /// Submissions that found every candidate queue full and blocked
    pub blocking_fallbacks: u64,
}

/// Atomic pool counters for lock-free updates
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering; counters are for monitoring only
#[repr(C, align(64))]
#[derive(Default)]
pub struct AtomicPoolStats {
    submitted: AtomicU64,
    executed: AtomicU64,
    stolen: AtomicU64,
    panicked: AtomicU64,
    blocking_fallbacks: AtomicU64,
}

impl AtomicPoolStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_executed(&self) {
        self.executed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_stolen(&self) {
        self.stolen.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_panicked(&self) {
        self.panicked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_blocking_fallbacks(&self) {
        self.blocking_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current counters
    ///
    /// # Note
    /// Counter values may not be perfectly consistent with each other due to
    /// concurrent updates, but each individual value is accurate.
    pub fn snapshot(&self, workers: usize, queued: usize) -> PoolStats {
        PoolStats {
            workers,
            queued,
            submitted: self.submitted.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            stolen: self.stolen.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            blocking_fallbacks: self.blocking_fallbacks.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_snapshot() {
        let stats = AtomicPoolStats::new();
        stats.inc_submitted();
        stats.inc_submitted();
        stats.inc_executed();
        stats.inc_stolen();
        stats.inc_panicked();
        stats.inc_blocking_fallbacks();

        let snapshot = stats.snapshot(4, 1);
        assert_eq!(
            snapshot,
            PoolStats {
                workers: 4,
                queued: 1,
                submitted: 2,
                executed: 1,
                stolen: 1,
                panicked: 1,
                blocking_fallbacks: 1,
            }
        );

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: PoolStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
