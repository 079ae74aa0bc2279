//! Unbounded FIFO buffer for timestamped entries.

use std::collections::VecDeque;

/// A FIFO sequence of timestamped entries.
///
/// Used for both the word buffer and the speaker-interval buffer inside the
/// correlator: entries are appended at the tail, and the drain loop inspects
/// and trims at the head. Unbounded, because words may buffer indefinitely
/// while waiting for a matching speaker interval.
#[derive(Debug)]
pub struct IntervalQueue<T> {
    items: VecDeque<T>,
}

impl<T> IntervalQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Append an entry at the tail.
    pub fn push_back(&mut self, entry: T) {
        self.items.push_back(entry);
    }

    /// Append all entries at the tail, in order.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = T>) {
        self.items.extend(entries);
    }

    /// The entry at the head, if any.
    pub fn peek_front(&self) -> Option<&T> {
        self.items.front()
    }

    /// The entry at the tail, if any.
    pub fn peek_back(&self) -> Option<&T> {
        self.items.back()
    }

    /// Mutable access to the entry at the tail, if any.
    pub fn peek_back_mut(&mut self) -> Option<&mut T> {
        self.items.back_mut()
    }

    /// Remove and return the entry at the head, if any.
    pub fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Whether the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for IntervalQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
