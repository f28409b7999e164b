/*!
 * Fast Mutex
 *
 * Exclusive lock with a single-instruction uncontended path. The state word
 * is the only thing touched until two threads actually collide; only then
 * does anyone park on the semaphore.
 *
 * # States
 *
 * - `0`: unlocked
 * - `1`: locked, nobody waiting
 * - `2`: locked, waiters may be parked (unlock must post)
 */

use super::semaphore::Semaphore;
use parking_lot::lock_api;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

/// Exclusive lock: atomic fast path, semaphore slow path
///
/// The raw operations mirror a classic mutex: `lock`, `try_lock`, `unlock`.
/// For scoped access use the [`Mutex`] alias, which wraps this in
/// `lock_api` guards.
pub struct FastMutex {
    state: AtomicU32,
    parked: Semaphore,
}

impl FastMutex {
    /// Create an unlocked mutex
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(UNLOCKED),
            parked: Semaphore::empty(),
        }
    }

    /// Acquire the lock, parking while another thread holds it
    #[inline]
    pub fn lock(&self) {
        if self.state.swap(LOCKED, Ordering::Acquire) != UNLOCKED {
            self.lock_contended();
        }
    }

    #[cold]
    fn lock_contended(&self) {
        // Once we have seen contention we re-acquire as CONTENDED, so the
        // eventual unlock knows a post may be needed.
        while self.state.swap(CONTENDED, Ordering::Acquire) != UNLOCKED {
            self.parked.wait();
        }
    }

    /// Acquire the lock only if it is free right now
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Release the lock
    ///
    /// Releasing a mutex that is not locked is a contract violation.
    #[inline]
    pub fn unlock(&self) {
        let prev = self.state.swap(UNLOCKED, Ordering::Release);
        debug_assert_ne!(prev, UNLOCKED, "unlock of an unlocked FastMutex");
        if prev == CONTENDED {
            self.parked.post();
        }
    }

    /// Whether some thread currently holds the lock (snapshot)
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != UNLOCKED
    }
}

impl Default for FastMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FastMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

unsafe impl lock_api::RawMutex for FastMutex {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = FastMutex::new();

    type GuardMarker = lock_api::GuardSend;

    #[inline]
    fn lock(&self) {
        FastMutex::lock(self);
    }

    #[inline]
    fn try_lock(&self) -> bool {
        FastMutex::try_lock(self)
    }

    #[inline]
    unsafe fn unlock(&self) {
        FastMutex::unlock(self);
    }

    #[inline]
    fn is_locked(&self) -> bool {
        FastMutex::is_locked(self)
    }
}

/// Value-guarding mutex built on [`FastMutex`]
pub type Mutex<T> = lock_api::Mutex<FastMutex, T>;

/// Scoped guard for [`Mutex`]
pub type MutexGuard<'a, T> = lock_api::MutexGuard<'a, FastMutex, T>;
