/*!
 * Bounded Queues
 *
 * Semaphore-backed ring buffer used for inter-thread handoff and as the
 * per-worker run queue of the thread pool.
 */

mod bounded;
mod slots;

pub use bounded::BoundedQueue;
