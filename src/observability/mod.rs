//! Observability for work pools.
//!
//! Pool snapshots can be exported to Prometheus through [`PoolMetrics`],
//! whose [`handler`](PoolMetrics::handler) plugs straight into a pool's
//! metric callback:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use workpool::observability::PoolMetrics;
//! use workpool::pool::PoolConfig;
//!
//! let metrics = Arc::new(PoolMetrics::new()?);
//! let config = PoolConfig::new(4, 100)
//!     .with_metric_interval(Duration::from_secs(15));
//! let config = PoolConfig {
//!     metric_handler: Some(metrics.handler("jobs")),
//!     ..config
//! };
//! println!("{}", metrics.export());
//! ```

pub mod metrics;

pub use metrics::PoolMetrics;
