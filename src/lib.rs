/*!
 * fastsync
 *
 * In-process concurrency substrate:
 * - `Semaphore` / `FastSemaphore`: counting wait/post primitives
 * - `FastMutex`: exclusive lock, atomic fast path, semaphore slow path
 * - `FastSharedMutex`: reader-writer lock driven by a sentinel-encoded reader counter
 * - `Event` / `SpinMutex`: manual/auto-reset events and a spinlock
 * - `BoundedQueue`: fixed-capacity, backpressured FIFO handoff
 * - `ThreadPool`: work-stealing pool with one bounded queue per worker
 */

pub mod core;
pub mod monitoring;
pub mod scheduler;

// Re-exports
pub use crate::core::errors::{PoolError, PoolResult, PushError, TaskError, TaskResult};
pub use crate::core::queue::BoundedQueue;
pub use crate::core::sync::{
    DefaultBackend, Event, EventMode, FastMutex, FastSemaphore, FastSharedMutex, Mutex, MutexGuard,
    PermitBackend, RwLock, RwLockReadGuard, RwLockWriteGuard, Semaphore, SpinLock, SpinLockGuard,
    SpinMutex,
};
pub use monitoring::init_tracing;
pub use scheduler::{PoolConfig, PoolStats, TaskHandle, ThreadPool};
