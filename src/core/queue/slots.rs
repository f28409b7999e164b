/*!
 * Slot Arena
 *
 * Fixed ring of `capacity` tagged slots. Occupancy is explicit (`Option<T>`),
 * so the live items are exactly the `Some` slots and teardown is just
 * dropping the arena.
 */

/// Ring bookkeeping for a bounded queue
///
/// Not synchronized on its own; the owning queue keeps it behind a mutex.
pub(super) struct Slots<T> {
    slots: Box<[Option<T>]>,
    push_index: usize,
    pop_index: usize,
    count: usize,
    pub(super) closed: bool,
}

impl<T> Slots<T> {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            push_index: 0,
            pop_index: 0,
            count: 0,
            closed: false,
        }
    }

    #[inline]
    pub(super) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.count
    }

    /// Store `item` at the push index
    ///
    /// Caller must hold an open-slot permit, so there is always room.
    pub(super) fn put(&mut self, item: T) {
        debug_assert!(self.count < self.capacity(), "put into a full slot arena");
        let slot = &mut self.slots[self.push_index];
        debug_assert!(slot.is_none(), "push index points at a live slot");
        *slot = Some(item);
        self.push_index = (self.push_index + 1) % self.capacity();
        self.count += 1;
    }

    /// Move the oldest item out, or `None` if the arena is empty
    pub(super) fn take(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.slots[self.pop_index].take();
        debug_assert!(item.is_some(), "pop index points at an empty slot");
        self.pop_index = (self.pop_index + 1) % self.capacity();
        self.count -= 1;
        item
    }
}
