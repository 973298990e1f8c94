//! Worker pool settings.

use std::time::Duration;

use super::parse::{env_duration, env_or, env_parse};
use super::ConfigError;
use crate::pool::PoolConfig;

/// Pool sizing loaded from environment.
///
/// Worker bounds are resolved and checked at load time, so
/// [`pool_config`](PoolSettings::pool_config) always passes
/// `PoolConfig::validate`.
#[derive(Clone, Debug)]
pub struct PoolSettings {
    /// Pool name, used for thread names, logs and metric labels.
    pub name: String,
    /// Workers kept alive while idle.
    pub min_workers: i64,
    /// Upper bound on live workers.
    pub max_workers: i64,
    /// Metric period (None = metrics off).
    pub metric_interval: Option<Duration>,
}

impl PoolSettings {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let (min_workers, max_workers) = resolve_bounds(
            env_parse("POOL_MIN_WORKERS", 1)?,
            env_parse("POOL_MAX_WORKERS", 0)?,
            num_cpus::get() as i64,
        )?;

        Ok(Self {
            name: env_or("POOL_NAME", "workpool"),
            min_workers,
            max_workers,
            metric_interval: env_duration("POOL_METRIC_INTERVAL", "off")?,
        })
    }

    /// Build the pool configuration. A metric handler, if wanted, is
    /// attached by the caller.
    pub fn pool_config(&self) -> PoolConfig {
        let config = PoolConfig::new(self.min_workers, self.max_workers);
        match self.metric_interval {
            Some(interval) => config.with_metric_interval(interval),
            None => config,
        }
    }
}

/// Check `POOL_MIN_WORKERS` and resolve `POOL_MAX_WORKERS`, where 0 means
/// one worker per CPU (never fewer than the minimum).
fn resolve_bounds(min: i64, max: i64, cpus: i64) -> Result<(i64, i64), ConfigError> {
    if min < 1 {
        return Err(ConfigError::NonPositive {
            key: "POOL_MIN_WORKERS",
            value: min,
        });
    }

    let max = match max {
        0 => cpus.max(min),
        n if n < 0 => {
            return Err(ConfigError::NonPositive {
                key: "POOL_MAX_WORKERS",
                value: n,
            })
        }
        n => n,
    };

    if max < min {
        return Err(ConfigError::WorkerBounds { min, max });
    }

    Ok((min, max))
}
