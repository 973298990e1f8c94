//! Queue and buffer error types.

use std::fmt;

/// Errors returned by [`Buffer`](super::Buffer) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The buffer holds no items.
    Empty,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::Empty => write!(f, "buffer is empty"),
        }
    }
}

impl std::error::Error for BufferError {}

/// Errors returned by [`Queue`](super::Queue) and
/// [`PressureStream`](super::PressureStream) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Nothing is ready to be received.
    Empty,

    /// The queue has been closed.
    Closed,
}

impl QueueError {
    /// Check if this is an empty-queue error.
    pub fn is_empty(&self) -> bool {
        matches!(self, QueueError::Empty)
    }

    /// Check if this is a closed-queue error.
    pub fn is_closed(&self) -> bool {
        matches!(self, QueueError::Closed)
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Empty => write!(f, "queue is empty"),
            QueueError::Closed => write!(f, "queue has been closed"),
        }
    }
}

impl std::error::Error for QueueError {}

impl From<BufferError> for QueueError {
    fn from(_: BufferError) -> Self {
        QueueError::Empty
    }
}

/// Result type alias for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Result type alias for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
