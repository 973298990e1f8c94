//! Unbounded, lock-guarded FIFO buffer.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::{BufferError, BufferResult};

/// An ordered, unbounded in-memory FIFO.
///
/// Every operation holds the lock for its full duration. A `peek` followed
/// by a `dequeue` is not atomic as a pair: callers that need both to observe
/// the same item must guarantee single-consumer access themselves.
#[derive(Debug)]
pub struct Buffer<T> {
    /// Index 0 is always the oldest item.
    items: Mutex<VecDeque<T>>,
}

impl<T> Buffer<T> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Append an item to the tail.
    pub fn enqueue(&self, item: T) {
        self.lock().push_back(item);
    }

    /// Remove and return the head item.
    pub fn dequeue(&self) -> BufferResult<T> {
        self.lock().pop_front().ok_or(BufferError::Empty)
    }

    /// Return a copy of the head item without removing it.
    pub fn peek(&self) -> BufferResult<T>
    where
        T: Clone,
    {
        self.lock().front().cloned().ok_or(BufferError::Empty)
    }

    /// Number of buffered items.
    pub fn length(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no items are buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all buffered items.
    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the deque half-mutated,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Buffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
