//! Configuration module for workpool.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use workpool::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Pool: {}", config.pool.name);
//! println!("Workers: {}..={}", config.pool.min_workers, config.pool.max_workers);
//! ```

mod demo;
mod error;
mod parse;
mod pool;

use crate::logging::LogSettings;

pub use demo::DemoConfig;
pub use error::ConfigError;
pub use parse::parse_duration;
pub(crate) use parse::{env_opt, env_or};
pub use pool::PoolSettings;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Pool configuration.
    pub pool: PoolSettings,
    /// Logging configuration.
    pub logging: LogSettings,
    /// Demo load configuration.
    pub demo: DemoConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pool: PoolSettings::from_env()?,
            logging: LogSettings::from_env()?,
            demo: DemoConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Pool: {}", self.pool.name);
        info!(
            "  Workers: {}..={}",
            self.pool.min_workers, self.pool.max_workers
        );

        match self.pool.metric_interval {
            Some(interval) => info!("  Metrics: every {}s", interval.as_secs_f64()),
            None => info!("  Metrics: disabled"),
        }

        info!(
            "  Demo: {} tasks, {}ms each",
            self.demo.tasks,
            self.demo.task_duration.as_millis()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        // Clear all env vars that might affect the test
        std::env::remove_var("POOL_NAME");
        std::env::remove_var("POOL_MIN_WORKERS");
        std::env::remove_var("POOL_MAX_WORKERS");
        std::env::remove_var("POOL_METRIC_INTERVAL");
        std::env::remove_var("DEMO_TASKS");
        std::env::remove_var("DEMO_TASK_MS");

        let config = Config::from_env().expect("Should load config");

        assert_eq!(config.pool.name, "workpool");
        assert_eq!(config.pool.min_workers, 1);
        assert!(config.pool.max_workers >= 1);
        assert!(config.pool.metric_interval.is_none());
        assert_eq!(config.demo.tasks, 10_000);
        assert!(config.demo.task_duration.is_zero());
        assert!(config.pool.pool_config().validate().is_ok());
    }
}
