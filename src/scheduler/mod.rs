/*!
 * Scheduler Module
 * Work-stealing thread pool built on the bounded queue and the fast locks
 */

mod atomic_stats;
mod config;
mod pool;
mod task;
mod worker;

// Re-export public API
pub use atomic_stats::{AtomicPoolStats, PoolStats};
pub use config::PoolConfig;
pub use pool::ThreadPool;
pub use task::TaskHandle;
