//! Errors raised while reading pool settings from the environment.

use std::fmt;

/// A rejected environment setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but its value does not parse.
    Parse {
        key: &'static str,
        value: String,
        reason: String,
    },
    /// A worker count that must be at least one.
    NonPositive { key: &'static str, value: i64 },
    /// `POOL_MAX_WORKERS` resolved below `POOL_MIN_WORKERS`.
    WorkerBounds { min: i64, max: i64 },
    /// `LOG_LEVEL` is not one of trace, debug, info, warn, error.
    UnknownLogLevel(String),
}

impl ConfigError {
    /// The environment variable at fault.
    pub fn key(&self) -> &'static str {
        match self {
            ConfigError::Parse { key, .. } | ConfigError::NonPositive { key, .. } => key,
            ConfigError::WorkerBounds { .. } => "POOL_MAX_WORKERS",
            ConfigError::UnknownLogLevel(_) => "LOG_LEVEL",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, reason } => {
                write!(f, "{}='{}' does not parse: {}", key, value, reason)
            }
            ConfigError::NonPositive { key, value } => {
                write!(f, "{} must be at least 1, got {}", key, value)
            }
            ConfigError::WorkerBounds { min, max } => write!(
                f,
                "POOL_MAX_WORKERS ({}) is below POOL_MIN_WORKERS ({})",
                max, min
            ),
            ConfigError::UnknownLogLevel(level) => write!(
                f,
                "LOG_LEVEL '{}' is not one of trace, debug, info, warn, error",
                level
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
