/*!
 * Condvar-Based Permit Backend
 *
 * Cross-platform fallback using parking_lot::{Mutex, Condvar}. The permit
 * count lives under the mutex, so the predicate check and the decrement are
 * one critical section and a post can never slip between them.
 */

use super::traits::{PermitBackend, Wake};
use parking_lot::{Condvar, Mutex};
use std::time::Instant;

/// Permit counter guarded by a mutex, waiters parked on a condvar
pub struct CondvarPermits {
    count: Mutex<u64>,
    available: Condvar,
}

impl PermitBackend for CondvarPermits {
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Self = Self {
        count: parking_lot::const_mutex(0),
        available: Condvar::new(),
    };

    fn with_permits(permits: u64) -> Self {
        Self {
            count: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    fn release(&self, permits: u64, wake: Wake) {
        {
            let mut count = self.count.lock();
            *count += permits;
        }
        match wake {
            Wake::One => {
                self.available.notify_one();
            }
            Wake::All => {
                self.available.notify_all();
            }
        }
    }

    fn acquire(&self, deadline: Option<Instant>) -> bool {
        let mut count = self.count.lock();
        while *count == 0 {
            match deadline {
                Some(deadline) => {
                    if self.available.wait_until(&mut count, deadline).timed_out() {
                        // A post may have landed together with the timeout
                        if *count == 0 {
                            return false;
                        }
                        break;
                    }
                }
                None => self.available.wait(&mut count),
            }
        }
        *count -= 1;
        true
    }

    fn try_acquire(&self) -> bool {
        let mut count = self.count.lock();
        if *count == 0 {
            return false;
        }
        *count -= 1;
        true
    }

    fn permits(&self) -> u64 {
        *self.count.lock()
    }

    fn name(&self) -> &'static str {
        "condvar"
    }
}
