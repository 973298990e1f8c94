//! Demo load configuration.

use std::time::Duration;

use super::parse::env_parse;
use super::ConfigError;

/// Synthetic load driven by the `workpool` binary.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    /// Number of tasks to submit.
    pub tasks: u64,
    /// Time each task sleeps.
    pub task_duration: Duration,
}

impl DemoConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tasks = env_parse("DEMO_TASKS", 10_000u64)?;
        let task_ms = env_parse("DEMO_TASK_MS", 0u64)?;

        Ok(Self {
            tasks,
            task_duration: Duration::from_millis(task_ms),
        })
    }
}
