/*!
 * Pool Configuration
 *
 * Construction-time knobs for the work-stealing pool.
 */

use crate::core::errors::{PoolError, PoolResult};
use crate::core::limits::{
    DEFAULT_IDLE_PARK, DEFAULT_QUEUE_CAPACITY, DEFAULT_STEAL_FACTOR, DEFAULT_THREAD_NAME,
    FALLBACK_WORKER_COUNT,
};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// Thread pool configuration
///
/// | Knob           | Effect                                                  |
/// |----------------|---------------------------------------------------------|
/// | workers        | OS threads, and per-worker queues                       |
/// | queue_capacity | Slots per worker queue before submitters see "full"     |
/// | steal_factor   | Non-blocking push attempts = `steal_factor × workers`   |
/// | thread_name    | Worker threads are named `{thread_name}-{index}`        |
/// | idle_park      | Longest an idle worker sleeps before rescanning peers   |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads (and queues)
    pub workers: usize,
    /// Capacity of each worker's queue
    pub queue_capacity: usize,
    /// Multiplier for the bounded submission scan
    pub steal_factor: usize,
    /// Worker thread name prefix
    pub thread_name: String,
    /// Bounded park between steal scans while idle
    pub idle_park: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_WORKER_COUNT),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            steal_factor: DEFAULT_STEAL_FACTOR,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            idle_park: DEFAULT_IDLE_PARK,
        }
    }
}

impl PoolConfig {
    /// Configuration with an explicit worker count and queue capacity
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers,
            queue_capacity,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_steal_factor(mut self, steal_factor: usize) -> Self {
        self.steal_factor = steal_factor;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_idle_park(mut self, idle_park: Duration) -> Self {
        self.idle_park = idle_park;
        self
    }

    /// Reject values the pool cannot run with
    pub fn validate(&self) -> PoolResult<()> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig("workers must be > 0".into()));
        }
        if self.queue_capacity == 0 {
            return Err(PoolError::InvalidConfig("queue_capacity must be > 0".into()));
        }
        if self.steal_factor == 0 {
            return Err(PoolError::InvalidConfig("steal_factor must be > 0".into()));
        }
        if self.idle_park.is_zero() {
            return Err(PoolError::InvalidConfig("idle_park must be > 0".into()));
        }
        Ok(())
    }

    /// Non-blocking push attempts a submitter makes before blocking
    #[inline]
    pub fn submit_attempts(&self) -> usize {
        self.steal_factor.saturating_mul(self.workers)
    }
}
