//! Worker pool error types.

use std::fmt;
use std::time::Duration;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// `min_workers` must be at least 1.
    InvalidMinWorkers(i64),

    /// `max_workers` must be at least 1 and not below `min_workers`.
    InvalidMaxWorkers {
        /// Requested maximum.
        max: i64,
        /// Requested minimum.
        min: i64,
    },

    /// A scaling request asked for zero workers to be added or removed.
    InvalidAddRequest,

    /// No worker accepted the work before the deadline.
    WorkRequestDenied(Duration),

    /// The pool has been shut down.
    Shutdown,

    /// A worker thread could not be started.
    Spawn(String),
}

impl PoolError {
    /// Check if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            PoolError::InvalidMinWorkers(_) | PoolError::InvalidMaxWorkers { .. }
        )
    }

    /// Check if this is an admission timeout.
    pub fn is_denied(&self) -> bool {
        matches!(self, PoolError::WorkRequestDenied(_))
    }

    /// Check if this is a shutdown error.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, PoolError::Shutdown)
    }

    /// Get the error message for logging.
    pub fn message(&self) -> &str {
        match self {
            PoolError::InvalidMinWorkers(_) => "Invalid min workers",
            PoolError::InvalidMaxWorkers { .. } => "Invalid max workers",
            PoolError::InvalidAddRequest => "Invalid add request",
            PoolError::WorkRequestDenied(_) => "Work request denied",
            PoolError::Shutdown => "Pool shutdown",
            PoolError::Spawn(msg) => msg,
        }
    }
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::InvalidMinWorkers(min) => {
                write!(f, "invalid min workers: {} (must be at least 1)", min)
            }
            PoolError::InvalidMaxWorkers { max, min } => {
                write!(
                    f,
                    "invalid max workers: {} (must be at least 1 and >= min workers {})",
                    max, min
                )
            }
            PoolError::InvalidAddRequest => {
                write!(f, "invalid add request: worker delta must not be zero")
            }
            PoolError::WorkRequestDenied(timeout) => {
                write!(f, "work request denied after {}ms", timeout.as_millis())
            }
            PoolError::Shutdown => {
                write!(f, "pool has been shut down")
            }
            PoolError::Spawn(msg) => {
                write!(f, "failed to spawn worker: {}", msg)
            }
        }
    }
}

impl std::error::Error for PoolError {}

impl From<std::io::Error> for PoolError {
    fn from(e: std::io::Error) -> Self {
        PoolError::Spawn(e.to_string())
    }
}

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
