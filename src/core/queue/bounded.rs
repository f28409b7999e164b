/*!
 * Bounded Blocking Queue
 *
 * Fixed-capacity FIFO for handing items between threads. Two semaphores
 * carry the blocking behaviour: `open_slots` counts free slots (producers
 * wait on it), `full_slots` counts live items (consumers wait on it). The
 * ring itself only ever sees a caller that already holds a permit, so the
 * mutex around it is held for a single slot write or read.
 *
 * # Closing
 *
 * `close` adds one extra permit to each semaphore. Whoever consumes that
 * permit and finds nothing to do (a popper facing an empty ring, or any
 * pusher once closed) posts it again before returning, so every blocked and
 * future caller on either side is released in turn.
 */

use super::slots::Slots;
use crate::core::errors::PushError;
use crate::core::sync::{Mutex, Semaphore};
use std::fmt;
use std::time::Duration;

/// Fixed-capacity, semaphore-backed FIFO queue
///
/// # Guarantees
///
/// - Items pop in the order they were pushed
/// - `len()` never exceeds `capacity()`
/// - `try_push` / `try_pop` never block
/// - Dropping the queue drops exactly the items still inside
///
/// # Examples
///
/// ```
/// use fastsync::BoundedQueue;
///
/// let queue = BoundedQueue::new(2);
/// queue.push(1).unwrap();
/// queue.push(2).unwrap();
/// assert!(queue.try_push(3).unwrap_err().is_full());
/// assert_eq!(queue.pop(), Some(1));
/// assert_eq!(queue.try_pop(), Some(2));
/// assert!(queue.is_empty());
/// ```
pub struct BoundedQueue<T> {
    slots: Mutex<Slots<T>>,
    open_slots: Semaphore,
    full_slots: Semaphore,
    capacity: usize,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items
    ///
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "BoundedQueue capacity must be > 0");
        Self {
            slots: Mutex::new(Slots::with_capacity(capacity)),
            open_slots: Semaphore::new(capacity as u64),
            full_slots: Semaphore::new(0),
            capacity,
        }
    }

    /// Push `item`, blocking while the queue is full
    ///
    /// Fails only if the queue is (or becomes) closed, handing the item back.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        self.open_slots.wait();
        self.store(item)
    }

    /// Push `item` only if a slot is free right now
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        if !self.open_slots.try_wait() {
            if self.is_closed() {
                return Err(PushError::Closed(item));
            }
            return Err(PushError::Full(item));
        }
        self.store(item)
    }

    /// Second half of a push, entered holding an open-slot permit
    fn store(&self, item: T) -> Result<(), PushError<T>> {
        {
            let mut slots = self.slots.lock();
            if slots.closed {
                drop(slots);
                self.open_slots.post();
                return Err(PushError::Closed(item));
            }
            slots.put(item);
        }
        self.full_slots.post();
        Ok(())
    }

    /// Pop the oldest item, blocking while the queue is empty
    ///
    /// Returns `None` only once the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        self.full_slots.wait();
        self.load()
    }

    /// Pop the oldest item only if one is available right now
    pub fn try_pop(&self) -> Option<T> {
        if !self.full_slots.try_wait() {
            return None;
        }
        self.load()
    }

    /// Pop the oldest item, waiting at most `timeout` for one to arrive
    ///
    /// `None` means either the wait timed out or the queue is closed and
    /// drained; check `is_closed()` to tell them apart.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        if !self.full_slots.wait_for(timeout) {
            return None;
        }
        self.load()
    }

    /// Second half of a pop, entered holding a full-slot permit
    fn load(&self) -> Option<T> {
        let item = self.slots.lock().take();
        match item {
            Some(item) => {
                self.open_slots.post();
                Some(item)
            }
            None => {
                // Only the closing permit can find the ring empty; pass it on
                debug_assert!(self.is_closed(), "full-slot permit without an item");
                self.full_slots.post();
                None
            }
        }
    }

    /// Stop accepting items and release every blocked caller
    ///
    /// Items already inside stay poppable. Closing twice is a no-op.
    pub fn close(&self) {
        {
            let mut slots = self.slots.lock();
            if slots.closed {
                return;
            }
            slots.closed = true;
        }
        self.full_slots.post();
        self.open_slots.post();
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.slots.lock().closed
    }

    /// Number of items inside (snapshot)
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Whether the queue holds no items (snapshot)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every slot is occupied (snapshot)
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Fixed number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock();
        f.debug_struct("BoundedQueue")
            .field("len", &slots.len())
            .field("capacity", &slots.capacity())
            .field("closed", &slots.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_zero_capacity_rejected() {
        let _ = BoundedQueue::<u8>::new(0);
    }

    #[test]
    fn test_full_and_empty_try_ops() {
        let queue = BoundedQueue::new(2);
        assert!(queue.try_pop().is_none());

        queue.try_push('a').unwrap();
        queue.try_push('b').unwrap();
        assert!(queue.is_full());
        assert!(matches!(queue.try_push('c'), Err(PushError::Full('c'))));

        assert_eq!(queue.try_pop(), Some('a'));
        assert_eq!(queue.try_pop(), Some('b'));
        assert!(queue.try_pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_blocked_pusher_resumes_after_pop() {
        let queue = Arc::new(BoundedQueue::new(1));
        queue.push(1).unwrap();

        let pusher = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(2))
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop(), Some(1));

        pusher.join().unwrap().unwrap();
        assert_eq!(queue.pop(), Some(2));
    }

    #[test]
    fn test_close_releases_blocked_poppers() {
        let queue = Arc::new(BoundedQueue::<u32>::new(4));

        let poppers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.pop())
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        queue.close();

        for popper in poppers {
            assert_eq!(popper.join().unwrap(), None);
        }
    }

    #[test]
    fn test_close_drains_remaining_items_first() {
        let queue = BoundedQueue::new(4);
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.close();
        queue.close();

        assert!(queue.push(3).unwrap_err().is_closed());
        assert!(queue.try_push(3).unwrap_err().is_closed());
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.try_pop(), Some(2));
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_close_releases_blocked_pusher() {
        let queue = Arc::new(BoundedQueue::new(1));
        queue.push(0u32).unwrap();

        let pusher = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(1))
        };

        thread::sleep(Duration::from_millis(50));
        queue.close();

        let err = pusher.join().unwrap().unwrap_err();
        assert_eq!(err.into_inner(), 1);
        assert_eq!(queue.pop(), Some(0));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_pop_timeout_expires_then_delivers() {
        let queue = Arc::new(BoundedQueue::new(2));
        assert_eq!(queue.pop_timeout(Duration::from_millis(20)), None);
        assert!(!queue.is_closed());

        let pusher = {
            let queue = queue.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                queue.push(9u32).unwrap();
            })
        };
        assert_eq!(queue.pop_timeout(Duration::from_secs(5)), Some(9));
        pusher.join().unwrap();

        queue.close();
        assert_eq!(queue.pop_timeout(Duration::from_secs(5)), None);
        assert!(queue.is_closed());
    }
}
