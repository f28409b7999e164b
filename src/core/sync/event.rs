/*!
 * Events
 *
 * Binary signal with parked waiters. A manual-reset event stays signaled
 * and lets every waiter through until someone calls `reset`; an auto-reset
 * event lets exactly one waiter through per signal and clears itself.
 *
 * # Design
 *
 * Same parking scheme as `FutexPermits`: the flag is a plain atomic and
 * waiters park on its address. The validate callback re-reads the flag
 * under the parking lot's bucket lock, and `signal` stores before it
 * unparks, so a signal can never fall between "saw unsignaled" and
 * "went to sleep".
 */

use parking_lot_core::{park, unpark_all, unpark_one, ParkResult, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Reset behaviour of an [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    /// Stays signaled until `reset`; a signal releases every waiter
    Manual,
    /// A successful wait consumes the signal; a signal releases one waiter
    Auto,
}

/// Manual- or auto-reset event
///
/// Signals do not count: signaling an event that is already signaled is a
/// no-op.
///
/// # Examples
///
/// ```
/// use fastsync::Event;
///
/// let ready = Event::manual(false);
/// ready.signal();
/// ready.wait();
/// assert!(ready.is_signaled());
///
/// let turn = Event::auto(true);
/// turn.wait();
/// assert!(!turn.is_signaled());
/// ```
#[repr(C, align(64))]
pub struct Event {
    signaled: AtomicBool,
    mode: EventMode,
}

impl Event {
    pub const fn new(mode: EventMode, signaled: bool) -> Self {
        Self {
            signaled: AtomicBool::new(signaled),
            mode,
        }
    }

    pub const fn manual(signaled: bool) -> Self {
        Self::new(EventMode::Manual, signaled)
    }

    pub const fn auto(signaled: bool) -> Self {
        Self::new(EventMode::Auto, signaled)
    }

    #[inline]
    fn key(&self) -> usize {
        &self.signaled as *const AtomicBool as usize
    }

    /// Set the event and wake waiters (all for manual, one for auto)
    pub fn signal(&self) {
        self.signaled.store(true, Ordering::Release);
        let key = self.key();
        match self.mode {
            EventMode::Manual => unsafe {
                unpark_all(key, DEFAULT_UNPARK_TOKEN);
            },
            EventMode::Auto => unsafe {
                unpark_one(key, |_| DEFAULT_UNPARK_TOKEN);
            },
        }
    }

    /// Clear the event; later waiters block until the next signal
    #[inline]
    pub fn reset(&self) {
        self.signaled.store(false, Ordering::Release);
    }

    /// Block until the event is signaled
    pub fn wait(&self) {
        self.wait_deadline(None);
    }

    /// Wait at most `timeout`; returns whether the event was observed signaled
    pub fn wait_for(&self, timeout: Duration) -> bool {
        self.wait_deadline(Instant::now().checked_add(timeout))
    }

    /// Wait until `deadline`; returns whether the event was observed signaled
    pub fn wait_until(&self, deadline: Instant) -> bool {
        self.wait_deadline(Some(deadline))
    }

    /// Snapshot of the flag
    #[inline]
    pub fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    #[inline]
    pub fn mode(&self) -> EventMode {
        self.mode
    }

    /// Pass through if signaled, consuming the signal in auto mode
    #[inline]
    fn try_pass(&self) -> bool {
        match self.mode {
            EventMode::Manual => self.signaled.load(Ordering::Acquire),
            EventMode::Auto => self
                .signaled
                .compare_exchange(true, false, Ordering::Acquire, Ordering::Relaxed)
                .is_ok(),
        }
    }

    fn wait_deadline(&self, deadline: Option<Instant>) -> bool {
        loop {
            if self.try_pass() {
                return true;
            }

            let result = unsafe {
                park(
                    self.key(),
                    || !self.signaled.load(Ordering::Acquire),
                    || {},
                    |_, _| {},
                    DEFAULT_PARK_TOKEN,
                    deadline,
                )
            };

            if let ParkResult::TimedOut = result {
                return self.try_pass();
            }
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("mode", &self.mode)
            .field("signaled", &self.is_signaled())
            .finish()
    }
}
