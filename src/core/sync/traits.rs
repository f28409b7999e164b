/*!
 * Permit Backend Traits
 *
 * Blocking capability set the counting primitives are built on.
 *
 * # Design: Trait-Based Abstraction for Platform Backends
 *
 * Everything above the semaphore only ever needs "add permits and wake" and
 * "take a permit, blocking until one exists or a deadline passes". This trait
 * captures exactly that, so the futex-style and condvar-style backends are
 * interchangeable and the default is picked at build time.
 */

use std::time::Instant;

/// How many parked waiters a post should wake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// Wake at most one waiter
    One,
    /// Wake every parked waiter
    All,
}

/// A counter of permits with parking for takers
///
/// Implementations must be:
/// - **Thread-safe**: Safe to call from multiple threads
/// - **Lossless**: A permit added by `release` is either handed to a parked
///   taker or observed by the next `acquire`
/// - **Non-negative**: `acquire` never takes a permit that does not exist
pub trait PermitBackend: Send + Sync {
    /// Backend holding zero permits (usable in `const` contexts)
    const EMPTY: Self;

    /// Create a backend holding `permits` permits
    fn with_permits(permits: u64) -> Self;

    /// Add `permits` permits and wake waiters
    fn release(&self, permits: u64, wake: Wake);

    /// Take one permit, parking until one is available
    ///
    /// With a deadline, returns `false` if no permit was taken before it
    /// passed. Without one, always returns `true`.
    fn acquire(&self, deadline: Option<Instant>) -> bool;

    /// Take one permit only if one is available right now
    fn try_acquire(&self) -> bool;

    /// Current number of permits (snapshot, for diagnostics)
    fn permits(&self) -> u64;

    /// Backend name for debugging
    fn name(&self) -> &'static str;
}
