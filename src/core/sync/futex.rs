/*!
 * Futex-Based Permit Backend
 *
 * Uses parking_lot_core for futex-like operations on all platforms.
 * On Linux, this maps directly to futex syscalls for minimal overhead.
 *
 * # Design
 *
 * The permit count is a plain atomic, so uncontended takes and posts never
 * touch the parking lot. Threads park on the address of the counter; the
 * validate callback re-checks the count under the parking lot's bucket lock,
 * which closes the window between "saw zero" and "went to sleep".
 */

use super::traits::{PermitBackend, Wake};
use parking_lot_core::{park, unpark_all, unpark_one, ParkResult, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Atomic permit counter with parked waiters keyed by its address
///
/// # Performance
///
/// - Lock-free fast path for both post and take
/// - Unpark call skipped when nobody is parked
#[repr(C, align(64))]
pub struct FutexPermits {
    count: AtomicU64,
    waiters: AtomicUsize,
}

impl FutexPermits {
    /// Stable parking address
    #[inline]
    fn key(&self) -> usize {
        &self.count as *const AtomicU64 as usize
    }
}

impl PermitBackend for FutexPermits {
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Self = Self {
        count: AtomicU64::new(0),
        waiters: AtomicUsize::new(0),
    };

    fn with_permits(permits: u64) -> Self {
        Self {
            count: AtomicU64::new(permits),
            waiters: AtomicUsize::new(0),
        }
    }

    fn release(&self, permits: u64, wake: Wake) {
        // SeqCst pairs with the waiter registration in `acquire`: either we
        // see the waiter, or the waiter's validate sees our permits.
        self.count.fetch_add(permits, Ordering::SeqCst);
        if self.waiters.load(Ordering::SeqCst) == 0 {
            return;
        }

        let key = self.key();
        match wake {
            Wake::One => unsafe {
                unpark_one(key, |_| DEFAULT_UNPARK_TOKEN);
            },
            Wake::All => unsafe {
                unpark_all(key, DEFAULT_UNPARK_TOKEN);
            },
        }
    }

    fn acquire(&self, deadline: Option<Instant>) -> bool {
        loop {
            if self.try_acquire() {
                return true;
            }

            self.waiters.fetch_add(1, Ordering::SeqCst);
            let result = unsafe {
                park(
                    self.key(),
                    || self.count.load(Ordering::SeqCst) == 0,
                    || {},
                    |_, _| {},
                    DEFAULT_PARK_TOKEN,
                    deadline,
                )
            };
            self.waiters.fetch_sub(1, Ordering::SeqCst);

            if let ParkResult::TimedOut = result {
                return self.try_acquire();
            }
        }
    }

    fn try_acquire(&self) -> bool {
        let mut current = self.count.load(Ordering::Relaxed);
        while current > 0 {
            match self.count.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
        false
    }

    fn permits(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    fn name(&self) -> &'static str {
        "futex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_futex_release_wakes_waiter() {
        let permits = Arc::new(FutexPermits::with_permits(0));
        let permits_clone = permits.clone();

        let handle = thread::spawn(move || permits_clone.acquire(None));

        // Give thread time to park
        thread::sleep(Duration::from_millis(50));
        permits.release(1, Wake::One);

        assert!(handle.join().unwrap());
        assert_eq!(permits.permits(), 0);
    }

    #[test]
    fn test_futex_deadline() {
        let permits = FutexPermits::with_permits(0);
        let start = Instant::now();

        assert!(!permits.acquire(Some(start + Duration::from_millis(50))));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_futex_try_acquire_never_goes_negative() {
        let permits = FutexPermits::with_permits(2);
        assert!(permits.try_acquire());
        assert!(permits.try_acquire());
        assert!(!permits.try_acquire());
        assert_eq!(permits.permits(), 0);
    }
}
