/*!
 * Counting Semaphores
 *
 * `Semaphore` is the parking primitive everything else in the crate blocks
 * on. `FastSemaphore` layers an atomic count over it so that posts and waits
 * which do not need to block never reach the backend.
 */

use super::config::DefaultBackend;
use super::traits::{PermitBackend, Wake};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

/// Counting semaphore over a pluggable permit backend
///
/// # Guarantees
///
/// - `wait` never returns having taken a permit that did not exist
/// - Every `post` either wakes a parked waiter or is seen by the next `wait`
/// - No ordering among waiters beyond "at least one woken per post"
///
/// # Examples
///
/// ```
/// use fastsync::Semaphore;
/// use std::time::Duration;
///
/// let sem: Semaphore = Semaphore::new(1);
/// sem.wait();
/// assert!(!sem.wait_for(Duration::from_millis(1)));
/// sem.post();
/// assert!(sem.try_wait());
/// ```
pub struct Semaphore<B: PermitBackend = DefaultBackend> {
    backend: B,
}

impl<B: PermitBackend> Semaphore<B> {
    /// Semaphore with no permits, usable in `const` contexts
    pub const fn empty() -> Self {
        Self { backend: B::EMPTY }
    }

    /// Create a semaphore holding `initial` permits
    pub fn new(initial: u64) -> Self {
        Self {
            backend: B::with_permits(initial),
        }
    }

    /// Add one permit and wake one waiter
    #[inline]
    pub fn post(&self) {
        self.backend.release(1, Wake::One);
    }

    /// Add `count` permits and wake all waiters
    #[inline]
    pub fn post_many(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.backend.release(count, Wake::All);
    }

    /// Block until a permit is available, then take it
    #[inline]
    pub fn wait(&self) {
        self.backend.acquire(None);
    }

    /// Take a permit without blocking
    #[inline]
    pub fn try_wait(&self) -> bool {
        self.backend.try_acquire()
    }

    /// Wait at most `timeout` for a permit
    ///
    /// Returns `true` if a permit was taken.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.backend.acquire(Some(deadline)),
            None => self.backend.acquire(None),
        }
    }

    /// Wait until `deadline` for a permit
    ///
    /// Returns `true` if a permit was taken.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        self.backend.acquire(Some(deadline))
    }

    /// Snapshot of the available permits
    #[inline]
    pub fn available(&self) -> u64 {
        self.backend.permits()
    }

    /// Name of the backend in use
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

impl<B: PermitBackend> Default for Semaphore<B> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<B: PermitBackend> fmt::Debug for Semaphore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore")
            .field("available", &self.available())
            .field("backend", &self.backend_name())
            .finish()
    }
}

/// Semaphore with an atomic fast path
///
/// The count may go negative: `-n` means `n` threads are parked (or about to
/// park) on the inner semaphore. Only transitions across zero touch it.
pub struct FastSemaphore {
    count: AtomicI64,
    parked: Semaphore,
}

impl FastSemaphore {
    /// Create a semaphore holding `initial` permits
    pub fn new(initial: u32) -> Self {
        Self {
            count: AtomicI64::new(i64::from(initial)),
            parked: Semaphore::empty(),
        }
    }

    /// Add one permit, waking a parked waiter if there is one
    #[inline]
    pub fn post(&self) {
        if self.count.fetch_add(1, Ordering::Release) < 0 {
            self.parked.post();
        }
    }

    /// Take one permit, parking if none is available
    #[inline]
    pub fn wait(&self) {
        if self.count.fetch_sub(1, Ordering::Acquire) < 1 {
            self.parked.wait();
        }
    }

    /// Take one permit only if one is available right now
    pub fn try_wait(&self) -> bool {
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

    /// Snapshot of the count (negative when threads are parked)
    #[inline]
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for FastSemaphore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for FastSemaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastSemaphore")
            .field("count", &self.count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::condvar::CondvarPermits;
    use crate::core::sync::futex::FutexPermits;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_initial_count() {
        let sem: Semaphore = Semaphore::new(3);
        assert_eq!(sem.available(), 3);
        assert!(sem.try_wait());
        assert!(sem.try_wait());
        assert!(sem.try_wait());
        assert!(!sem.try_wait());
    }

    #[test]
    fn test_wait_for_times_out_without_taking() {
        let sem: Semaphore = Semaphore::default();
        let start = Instant::now();
        assert!(!sem.wait_for(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_wait_until_past_deadline_with_permit() {
        let sem: Semaphore = Semaphore::new(1);
        assert!(sem.wait_until(Instant::now()));
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_post_many_wakes_everyone() {
        fn run<B: PermitBackend + 'static>() {
            let sem = Arc::new(Semaphore::<B>::new(0));
            let woken = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let sem = sem.clone();
                    let woken = woken.clone();
                    thread::spawn(move || {
                        sem.wait();
                        woken.fetch_add(1, Ordering::SeqCst);
                    })
                })
                .collect();

            thread::sleep(Duration::from_millis(50));
            sem.post_many(4);

            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(woken.load(Ordering::SeqCst), 4);
            assert_eq!(sem.available(), 0);
        }

        run::<FutexPermits>();
        run::<CondvarPermits>();
    }

    #[test]
    fn test_no_lost_posts() {
        let sem = Arc::new(Semaphore::<DefaultBackend>::new(0));
        let consumer = {
            let sem = sem.clone();
            thread::spawn(move || {
                for _ in 0..10_000 {
                    sem.wait();
                }
            })
        };

        for _ in 0..10_000 {
            sem.post();
        }
        consumer.join().unwrap();
        assert_eq!(sem.available(), 0);
    }

    #[test]
    fn test_fast_semaphore_handoff() {
        let sem = Arc::new(FastSemaphore::new(0));
        let sem_clone = sem.clone();

        let handle = thread::spawn(move || {
            sem_clone.wait();
            sem_clone.wait();
        });

        thread::sleep(Duration::from_millis(20));
        sem.post();
        sem.post();
        handle.join().unwrap();

        assert_eq!(sem.count(), 0);
        assert!(!sem.try_wait());
    }
}
