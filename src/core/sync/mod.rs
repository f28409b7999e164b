/*!
 * Synchronization Primitives
 *
 * Counting semaphores and the two lock algorithms built on them:
 * - Futex-style permit backend (Linux default) for minimal overhead
 * - Condvar-style permit backend (cross-platform) for reliability
 * - `FastMutex`: one atomic swap when uncontended, parks on a semaphore otherwise
 * - `FastSharedMutex`: wait-free readers when no writer is around,
 *   O(1) writer acquisition independent of reader count
 * - `Event`: manual- and auto-reset binary signals
 * - `SpinMutex`: test-and-set lock for tiny critical sections
 *
 * # Architecture
 *
 * Every blocking point in the crate bottoms out in `Semaphore::wait`, which
 * in turn goes through a `PermitBackend`. The backend is chosen at build
 * time (`DefaultBackend`), but any `Semaphore<B>` can name one explicitly.
 */

mod condvar;
mod config;
mod event;
mod futex;
mod mutex;
mod semaphore;
mod shared_mutex;
mod spin;
mod traits;

pub use config::DefaultBackend;
pub use event::{Event, EventMode};
pub use mutex::{FastMutex, Mutex, MutexGuard};
pub use semaphore::{FastSemaphore, Semaphore};
pub use shared_mutex::{FastSharedMutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use spin::{SpinLock, SpinLockGuard, SpinMutex};
pub use traits::{PermitBackend, Wake};

// Re-export specific backends for advanced users
pub use condvar::CondvarPermits;
pub use futex::FutexPermits;
