//! Prometheus metrics for work pools.

use std::sync::Arc;

use prometheus::{Encoder, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::pool::{MetricHandler, PoolStat};

/// Prometheus registry exposing [`PoolStat`] snapshots as gauges.
///
/// One instance can serve several pools; every gauge is labelled by pool
/// name.
pub struct PoolMetrics {
    registry: Registry,

    /// Live worker threads
    pub workers: IntGaugeVec,

    /// Configured minimum workers
    pub workers_min: IntGaugeVec,

    /// Configured maximum workers
    pub workers_max: IntGaugeVec,

    /// Work items currently running
    pub active_work: IntGaugeVec,

    /// Submissions waiting for a worker
    pub pending_work: IntGaugeVec,

    /// Work items finished since the pool started
    pub executed_work: IntGaugeVec,
}

impl PoolMetrics {
    /// Create a new registry with all pool metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let workers = gauge(&registry, "workpool_workers", "Live worker threads")?;
        let workers_min = gauge(&registry, "workpool_workers_min", "Configured minimum workers")?;
        let workers_max = gauge(&registry, "workpool_workers_max", "Configured maximum workers")?;
        let active_work = gauge(&registry, "workpool_active_work", "Work items currently running")?;
        let pending_work = gauge(
            &registry,
            "workpool_pending_work",
            "Submissions waiting for an idle worker",
        )?;
        let executed_work = gauge(
            &registry,
            "workpool_executed_work",
            "Work items finished since the pool started",
        )?;

        Ok(Self {
            registry,
            workers,
            workers_min,
            workers_max,
            active_work,
            pending_work,
            executed_work,
        })
    }

    /// Record a pool snapshot.
    pub fn observe(&self, pool: &str, stat: &PoolStat) {
        let labels = [pool];
        self.workers.with_label_values(&labels).set(stat.workers);
        self.workers_min.with_label_values(&labels).set(stat.min_workers);
        self.workers_max.with_label_values(&labels).set(stat.max_workers);
        self.active_work.with_label_values(&labels).set(stat.active);
        self.pending_work.with_label_values(&labels).set(stat.pending);
        self.executed_work
            .with_label_values(&labels)
            .set(i64::try_from(stat.executed).unwrap_or(i64::MAX));
    }

    /// Metric callback recording snapshots under `pool`.
    pub fn handler(self: &Arc<Self>, pool: impl Into<String>) -> MetricHandler {
        let metrics = Arc::clone(self);
        let pool = pool.into();
        Arc::new(move |stat: PoolStat| metrics.observe(&pool, &stat))
    }

    /// Export all metrics in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }

        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Get the underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGaugeVec, prometheus::Error> {
    let gauge = IntGaugeVec::new(Opts::new(name, help), &["pool"])?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}
