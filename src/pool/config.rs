//! Pool sizing and metrics configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::{PoolError, PoolResult};
use super::stat::PoolStat;

/// Shortest period between metric callbacks.
pub const MIN_METRIC_INTERVAL: Duration = Duration::from_secs(1);

/// Returns the period until the next metric callback. Re-evaluated on
/// every tick, so the period can change while the pool runs.
pub type MetricInterval = Arc<dyn Fn() -> Duration + Send + Sync>;

/// Receives a [`PoolStat`] on every metric tick.
pub type MetricHandler = Arc<dyn Fn(PoolStat) + Send + Sync>;

/// Configuration for a [`WorkPool`](super::WorkPool).
#[derive(Clone)]
pub struct PoolConfig {
    /// Upper bound on live workers.
    pub max_workers: i64,
    /// Workers started up front and kept alive while idle.
    pub min_workers: i64,
    /// Metric period; metrics are disabled when `None`.
    pub metric_interval: Option<MetricInterval>,
    /// Metric callback; invoked only when `metric_interval` is set.
    pub metric_handler: Option<MetricHandler>,
}

impl PoolConfig {
    /// Create a configuration with metrics disabled.
    pub fn new(min_workers: i64, max_workers: i64) -> Self {
        Self {
            max_workers,
            min_workers,
            metric_interval: None,
            metric_handler: None,
        }
    }

    /// Emit metrics at a fixed period.
    pub fn with_metric_interval(self, interval: Duration) -> Self {
        self.with_metric_interval_fn(move || interval)
    }

    /// Emit metrics at a period computed before every tick.
    pub fn with_metric_interval_fn<F>(mut self, interval: F) -> Self
    where
        F: Fn() -> Duration + Send + Sync + 'static,
    {
        self.metric_interval = Some(Arc::new(interval));
        self
    }

    /// Set the metric callback.
    pub fn with_metric_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(PoolStat) + Send + Sync + 'static,
    {
        self.metric_handler = Some(Arc::new(handler));
        self
    }

    /// Check worker bounds.
    pub fn validate(&self) -> PoolResult<()> {
        if self.min_workers <= 0 {
            return Err(PoolError::InvalidMinWorkers(self.min_workers));
        }
        if self.max_workers <= 0 || self.max_workers < self.min_workers {
            return Err(PoolError::InvalidMaxWorkers {
                max: self.max_workers,
                min: self.min_workers,
            });
        }
        Ok(())
    }

    /// Period until the next metric tick, if metrics are enabled.
    pub(crate) fn next_metric_period(&self) -> Option<Duration> {
        self.metric_interval
            .as_ref()
            .map(|interval| interval().max(MIN_METRIC_INTERVAL))
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("max_workers", &self.max_workers)
            .field("min_workers", &self.min_workers)
            .field("metric_interval", &self.metric_interval.as_ref().map(|i| i()))
            .field("metric_handler", &self.metric_handler.is_some())
            .finish()
    }
}
