/*!
 * Worker Loop
 *
 * Each worker owns one queue (its home) and sees every peer queue read-only.
 *
 * ```text
 *   RUNNING ── own/peer try_pop hit ──► execute ──► RUNNING
 *      │
 *      └── nothing anywhere ──► park on home pop ──┬─ job ──► execute ──► RUNNING
 *                                                  ├─ idle_park elapsed ──► RUNNING (rescan)
 *                                                  └─ closed + drained ──► TERMINATED
 * ```
 *
 * The scan starts at the worker's own index, so the home queue is always
 * tried first and peers are visited round-robin after it. The park is
 * bounded: submissions only ever wake the owner of the queue they land on,
 * so an idle worker has to come back and look at its peers on its own.
 */

use super::atomic_stats::AtomicPoolStats;
use super::task::Job;
use crate::core::queue::BoundedQueue;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace};

pub(super) struct Worker {
    index: usize,
    queues: Arc<[BoundedQueue<Job>]>,
    stats: Arc<AtomicPoolStats>,
    idle_park: Duration,
}

impl Worker {
    pub(super) fn new(
        index: usize,
        queues: Arc<[BoundedQueue<Job>]>,
        stats: Arc<AtomicPoolStats>,
        idle_park: Duration,
    ) -> Self {
        Self {
            index,
            queues,
            stats,
            idle_park,
        }
    }

    /// Run jobs until the home queue is closed and drained
    pub(super) fn run(self) {
        debug!(worker = self.index, "worker started");
        while let Some(job) = self.next_job() {
            self.execute(job);
        }
        debug!(worker = self.index, "worker exiting");
    }

    fn next_job(&self) -> Option<Job> {
        let home = &self.queues[self.index];
        loop {
            if let Some(job) = self.scan() {
                return Some(job);
            }
            if let Some(job) = home.pop_timeout(self.idle_park) {
                return Some(job);
            }
            // Every other queue has its own worker to drain it
            if home.is_closed() && home.is_empty() {
                return None;
            }
        }
    }

    fn scan(&self) -> Option<Job> {
        let count = self.queues.len();
        for offset in 0..count {
            let victim = (self.index + offset) % count;
            if let Some(job) = self.queues[victim].try_pop() {
                if offset != 0 {
                    self.stats.inc_stolen();
                    trace!(worker = self.index, victim, "stole job");
                }
                return Some(job);
            }
        }
        None
    }

    fn execute(&self, job: Job) {
        if let Err(message) = job() {
            self.stats.inc_panicked();
            error!(worker = self.index, panic = %message, "task panicked");
        }
        self.stats.inc_executed();
    }
}
