/*!
 * Fast Shared Mutex
 *
 * Reader-writer lock where readers only ever touch one atomic counter and
 * writers pay O(1) atomics plus at most one park, regardless of how many
 * readers are in flight.
 *
 * # Counter Encoding
 *
 * `readers` starts at `READER_SENTINEL`. Each reader entry subtracts one and
 * each exit adds one, so with no writer the counter is
 * `READER_SENTINEL - active_readers`. A writer subtracts the whole sentinel:
 * the counter drops to `-active_readers`, which both shuts the door on new
 * readers (they now see a value < 1) and tells the writer how many readers
 * it must wait out. Readers that arrive while a writer holds the lock keep
 * decrementing below that, and the writer's unlock reads the deficit back
 * to know how many to wake.
 *
 * `departing` counts the in-flight readers the writer is still waiting for.
 * Readers that exit before the writer has published its count drive it
 * negative; the writer's `fetch_add` folds both sides together, so whoever
 * brings it to zero (the writer, or the last reader) knows the drain is done.
 */

use super::mutex::FastMutex;
use super::semaphore::Semaphore;
use crate::core::limits::READER_SENTINEL;
use parking_lot::lock_api;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Reader-writer lock: atomic reader counter, semaphore parking
///
/// Writers do not starve: once a writer has subtracted the sentinel, no new
/// reader gets in until that writer releases.
pub struct FastSharedMutex {
    readers: AtomicI64,
    departing: AtomicI64,
    writer_gate: FastMutex,
    reader_wait: Semaphore,
    writer_wait: Semaphore,
}

impl FastSharedMutex {
    /// Create an unlocked shared mutex
    pub const fn new() -> Self {
        Self {
            readers: AtomicI64::new(READER_SENTINEL),
            departing: AtomicI64::new(0),
            writer_gate: FastMutex::new(),
            reader_wait: Semaphore::empty(),
            writer_wait: Semaphore::empty(),
        }
    }

    /// Acquire shared (read) access, parking while a writer holds the lock
    #[inline]
    pub fn lock_shared(&self) {
        if self.readers.fetch_sub(1, Ordering::Acquire) < 1 {
            self.reader_wait.wait();
        }
    }

    /// Acquire shared access only if no writer holds or awaits the lock
    pub fn try_lock_shared(&self) -> bool {
        let mut current = self.readers.load(Ordering::Relaxed);
        while current >= 1 {
            match self.readers.compare_exchange_weak(
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

    /// Release shared access
    #[inline]
    pub fn unlock_shared(&self) {
        let prev = self.readers.fetch_add(1, Ordering::Release);
        debug_assert_ne!(prev, READER_SENTINEL, "unlock_shared without a reader");
        if prev < 0 && self.departing.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.writer_wait.post();
        }
    }

    /// Acquire exclusive (write) access
    ///
    /// Waits for other writers, then for the readers already inside.
    pub fn lock(&self) {
        self.writer_gate.lock();
        let prev = self.readers.fetch_sub(READER_SENTINEL, Ordering::Acquire);
        if prev < READER_SENTINEL {
            let in_flight = READER_SENTINEL - prev;
            let departed = self.departing.fetch_add(in_flight, Ordering::AcqRel);
            if departed + in_flight != 0 {
                self.writer_wait.wait();
            }
        }
    }

    /// Acquire exclusive access only if nobody holds the lock in any mode
    ///
    /// Never blocks and never leaves the counter disturbed on failure.
    pub fn try_lock(&self) -> bool {
        if !self.writer_gate.try_lock() {
            return false;
        }
        if self
            .readers
            .compare_exchange(READER_SENTINEL, 0, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return true;
        }
        self.writer_gate.unlock();
        false
    }

    /// Release exclusive access, waking every reader that queued behind it
    pub fn unlock(&self) {
        let prev = self.readers.fetch_add(READER_SENTINEL, Ordering::Release);
        debug_assert!(prev <= 0, "unlock of a FastSharedMutex without a writer");
        if prev < 0 {
            self.reader_wait.post_many(prev.unsigned_abs());
        }
        self.writer_gate.unlock();
    }

    /// Whether a writer holds or is draining towards the lock (snapshot)
    #[inline]
    pub fn is_locked_exclusive(&self) -> bool {
        self.readers.load(Ordering::Relaxed) <= 0
    }

    /// Whether anyone holds the lock in any mode (snapshot)
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.readers.load(Ordering::Relaxed) != READER_SENTINEL
    }
}

impl Default for FastSharedMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FastSharedMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastSharedMutex")
            .field("locked", &self.is_locked())
            .field("exclusive", &self.is_locked_exclusive())
            .finish()
    }
}

unsafe impl lock_api::RawRwLock for FastSharedMutex {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = FastSharedMutex::new();

    type GuardMarker = lock_api::GuardSend;

    #[inline]
    fn lock_shared(&self) {
        FastSharedMutex::lock_shared(self);
    }

    #[inline]
    fn try_lock_shared(&self) -> bool {
        FastSharedMutex::try_lock_shared(self)
    }

    #[inline]
    unsafe fn unlock_shared(&self) {
        FastSharedMutex::unlock_shared(self);
    }

    #[inline]
    fn lock_exclusive(&self) {
        FastSharedMutex::lock(self);
    }

    #[inline]
    fn try_lock_exclusive(&self) -> bool {
        FastSharedMutex::try_lock(self)
    }

    #[inline]
    unsafe fn unlock_exclusive(&self) {
        FastSharedMutex::unlock(self);
    }

    #[inline]
    fn is_locked(&self) -> bool {
        FastSharedMutex::is_locked(self)
    }
}

/// Value-guarding reader-writer lock built on [`FastSharedMutex`]
pub type RwLock<T> = lock_api::RwLock<FastSharedMutex, T>;

/// Shared guard for [`RwLock`]
pub type RwLockReadGuard<'a, T> = lock_api::RwLockReadGuard<'a, FastSharedMutex, T>;

/// Exclusive guard for [`RwLock`]
pub type RwLockWriteGuard<'a, T> = lock_api::RwLockWriteGuard<'a, FastSharedMutex, T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_many_readers_at_once() {
        let m = FastSharedMutex::new();
        m.lock_shared();
        m.lock_shared();
        assert!(m.try_lock_shared());
        assert!(m.is_locked());
        assert!(!m.is_locked_exclusive());
        assert!(!m.try_lock());

        m.unlock_shared();
        m.unlock_shared();
        m.unlock_shared();
        assert!(!m.is_locked());
    }

    #[test]
    fn test_writer_excludes_readers() {
        let m = FastSharedMutex::new();
        m.lock();
        assert!(m.is_locked_exclusive());
        assert!(!m.try_lock_shared());
        assert!(!m.try_lock());
        m.unlock();

        assert!(m.try_lock_shared());
        m.unlock_shared();
        assert!(m.try_lock());
        m.unlock();
        assert!(!m.is_locked());
    }

    #[test]
    fn test_failed_try_lock_leaves_no_trace() {
        let m = FastSharedMutex::new();
        m.lock_shared();
        assert!(!m.try_lock());
        m.unlock_shared();

        // Counter and gate must be back to pristine for a blocking writer
        m.lock();
        m.unlock();
        assert!(!m.is_locked());
    }

    #[test]
    fn test_writer_waits_for_in_flight_reader() {
        let m = Arc::new(FastSharedMutex::new());
        let writer_in = Arc::new(AtomicBool::new(false));
        m.lock_shared();

        let writer = {
            let m = m.clone();
            let writer_in = writer_in.clone();
            thread::spawn(move || {
                m.lock();
                writer_in.store(true, Ordering::SeqCst);
                m.unlock();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!writer_in.load(Ordering::SeqCst));
        m.unlock_shared();

        writer.join().unwrap();
        assert!(writer_in.load(Ordering::SeqCst));
    }

    #[test]
    fn test_readers_queued_behind_writer_are_released() {
        let m = Arc::new(FastSharedMutex::new());
        m.lock();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let m = m.clone();
                thread::spawn(move || {
                    m.lock_shared();
                    m.unlock_shared();
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        m.unlock();

        for reader in readers {
            reader.join().unwrap();
        }
        assert!(!m.is_locked());
    }

    #[test]
    fn test_rwlock_alias() {
        let lock = RwLock::new(5);
        {
            let a = lock.read();
            let b = lock.read();
            assert_eq!(*a + *b, 10);
        }
        *lock.write() += 1;
        assert_eq!(*lock.read(), 6);
    }
}
