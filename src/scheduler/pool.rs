/*!
 * Work-Stealing Thread Pool
 *
 * N workers, N bounded queues, index-aligned. Submission spreads work with
 * non-blocking pushes across a bounded number of candidate queues and only
 * blocks when every candidate was full; idle workers steal from peers before
 * parking on their own queue.
 *
 * # Shutdown Policy
 *
 * Drain guaranteed: `shutdown` (or dropping the pool) closes every queue,
 * and each worker keeps running jobs until its own queue is closed *and*
 * empty. Every task accepted before shutdown therefore runs before
 * shutdown returns. Submissions racing with shutdown get
 * `PoolError::ShutDown`.
 */

use super::atomic_stats::{AtomicPoolStats, PoolStats};
use super::config::PoolConfig;
use super::task::{self, Job, TaskHandle};
use super::worker::Worker;
use crate::core::errors::{PoolError, PoolResult, PushError};
use crate::core::queue::BoundedQueue;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Work-stealing thread pool over per-worker bounded queues
///
/// # Caveats
///
/// - A task that blocks on submitting to its own pool can deadlock once
///   every queue is full; prefer `try`-style backpressure inside tasks.
/// - Dropping the last reference to the pool from inside one of its own
///   tasks joins the calling worker and deadlocks.
///
/// # Examples
///
/// ```
/// use fastsync::ThreadPool;
///
/// let pool = ThreadPool::new(2, 16).unwrap();
/// let answer = pool.post_task(|| 6 * 7).unwrap();
/// pool.post_work(|| println!("fire and forget")).unwrap();
/// assert_eq!(answer.join(), Ok(42));
/// pool.shutdown();
/// ```
pub struct ThreadPool {
    queues: Arc<[BoundedQueue<Job>]>,
    workers: Vec<JoinHandle<()>>,
    next_queue: AtomicUsize,
    submit_attempts: usize,
    stats: Arc<AtomicPoolStats>,
}

impl ThreadPool {
    /// Create a pool with `workers` threads, each owning a queue of
    /// `queue_capacity` slots
    pub fn new(workers: usize, queue_capacity: usize) -> PoolResult<Self> {
        Self::with_config(PoolConfig::new(workers, queue_capacity))
    }

    /// Create a pool from a full configuration
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let queues: Arc<[BoundedQueue<Job>]> = (0..config.workers)
            .map(|_| BoundedQueue::new(config.queue_capacity))
            .collect::<Vec<_>>()
            .into();
        let stats = Arc::new(AtomicPoolStats::new());

        let mut pool = Self {
            queues,
            workers: Vec::with_capacity(config.workers),
            next_queue: AtomicUsize::new(0),
            submit_attempts: config.submit_attempts(),
            stats,
        };

        for index in 0..config.workers {
            let worker = Worker::new(
                index,
                pool.queues.clone(),
                pool.stats.clone(),
                config.idle_park,
            );
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, index))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(e) => {
                    error!(worker = index, error = %e, "failed to spawn worker thread");
                    // Dropping the partial pool closes and joins what was started
                    return Err(PoolError::SpawnFailed(e.to_string()));
                }
            }
        }

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            submit_attempts = pool.submit_attempts,
            idle_park_us = config.idle_park.as_micros() as u64,
            "thread pool started"
        );
        Ok(pool)
    }

    /// Submit fire-and-forget work
    ///
    /// A panic inside `f` is caught, logged and counted; it never reaches the
    /// caller or takes the worker down.
    pub fn post_work<F>(&self, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(task::detached(f))
    }

    /// Submit work and get a handle to its result
    pub fn post_task<F, R>(&self, f: F) -> PoolResult<TaskHandle<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (job, handle) = task::with_handle(f);
        self.submit(job)?;
        Ok(handle)
    }

    /// Submit fire-and-forget work onto a specific worker's queue
    ///
    /// Blocks while that queue is full. This pins only the initial
    /// placement: an idle peer may still steal the job.
    ///
    /// # Panics
    ///
    /// If `worker` is not below `worker_count()`.
    pub fn post_work_on<F>(&self, worker: usize, f: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        assert!(worker < self.queues.len(), "worker index out of range");
        self.queues[worker]
            .push(task::detached(f))
            .map_err(|_| PoolError::ShutDown)?;
        self.stats.inc_submitted();
        Ok(())
    }

    fn submit(&self, job: Job) -> PoolResult<()> {
        let count = self.queues.len();
        let home = self.next_queue.fetch_add(1, Ordering::Relaxed);

        let mut job = job;
        for attempt in 0..self.submit_attempts {
            match self.queues[home.wrapping_add(attempt) % count].try_push(job) {
                Ok(()) => {
                    self.stats.inc_submitted();
                    return Ok(());
                }
                Err(PushError::Full(rejected)) => job = rejected,
                Err(PushError::Closed(_)) => return Err(PoolError::ShutDown),
            }
        }

        let home = home % count;
        self.stats.inc_blocking_fallbacks();
        debug!(queue = home, "every candidate queue full, blocking on home queue");
        self.queues[home].push(job).map_err(|_| PoolError::ShutDown)?;
        self.stats.inc_submitted();
        Ok(())
    }

    /// Number of worker threads
    pub fn worker_count(&self) -> usize {
        self.queues.len()
    }

    /// Snapshot of pool counters
    pub fn stats(&self) -> PoolStats {
        let queued = self.queues.iter().map(BoundedQueue::len).sum();
        self.stats.snapshot(self.queues.len(), queued)
    }

    /// Close every queue, run everything already queued, join the workers
    pub fn shutdown(mut self) {
        self.close_and_join();
    }

    fn close_and_join(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        debug!(workers = self.workers.len(), "closing worker queues");
        for queue in self.queues.iter() {
            queue.close();
        }
        for (index, handle) in self.workers.drain(..).enumerate() {
            if handle.join().is_err() {
                error!(worker = index, "worker thread terminated abnormally");
            }
        }

        let stats = self.stats();
        info!(
            submitted = stats.submitted,
            executed = stats.executed,
            stolen = stats.stolen,
            panicked = stats.panicked,
            "thread pool stopped"
        );
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.close_and_join();
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("workers", &self.queues.len())
            .field("submit_attempts", &self.submit_attempts)
            .finish()
    }
}
