/*!
 * Spin Mutex
 *
 * Test-and-set lock that never parks. Contenders spin on a plain load
 * (so the cache line stays shared while the holder works) and yield to the
 * scheduler between bursts. Only worth it for critical sections of a few
 * instructions.
 */

use crate::core::limits::SPINS_BEFORE_YIELD;
use parking_lot::lock_api;
use std::fmt;
use std::hint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Exclusive spinlock
#[repr(C, align(64))]
pub struct SpinMutex {
    locked: AtomicBool,
}

impl SpinMutex {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn lock(&self) {
        while self.locked.swap(true, Ordering::Acquire) {
            self.wait_unlocked();
        }
    }

    #[cold]
    fn wait_unlocked(&self) {
        let mut spins = 0u32;
        while self.locked.load(Ordering::Relaxed) {
            if spins < SPINS_BEFORE_YIELD {
                spins += 1;
                hint::spin_loop();
            } else {
                spins = 0;
                thread::yield_now();
            }
        }
    }

    #[inline]
    pub fn try_lock(&self) -> bool {
        !self.locked.swap(true, Ordering::Acquire)
    }

    #[inline]
    pub fn unlock(&self) {
        let was_locked = self.locked.swap(false, Ordering::Release);
        debug_assert!(was_locked, "unlock of an unlocked SpinMutex");
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

impl Default for SpinMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpinMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinMutex")
            .field("locked", &self.is_locked())
            .finish()
    }
}

unsafe impl lock_api::RawMutex for SpinMutex {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = SpinMutex::new();

    type GuardMarker = lock_api::GuardSend;

    #[inline]
    fn lock(&self) {
        SpinMutex::lock(self);
    }

    #[inline]
    fn try_lock(&self) -> bool {
        SpinMutex::try_lock(self)
    }

    #[inline]
    unsafe fn unlock(&self) {
        SpinMutex::unlock(self);
    }

    #[inline]
    fn is_locked(&self) -> bool {
        SpinMutex::is_locked(self)
    }
}

/// Value-guarding spinlock built on [`SpinMutex`]
pub type SpinLock<T> = lock_api::Mutex<SpinMutex, T>;

pub type SpinLockGuard<'a, T> = lock_api::MutexGuard<'a, SpinMutex, T>;
