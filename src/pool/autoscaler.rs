//! Load heuristic that decides when the pool grows or shrinks.

use super::stat::PoolStat;

/// Share of the current workers added when the pool is saturated.
const GROWTH_PERCENT: i64 = 20;

/// Outcome of a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    /// Leave the pool as it is.
    Hold,
    /// Add this many workers.
    Grow(i64),
    /// Remove this many workers.
    Shrink(i64),
}

impl ScaleDecision {
    /// Signed worker delta for this decision.
    pub fn delta(&self) -> i64 {
        match *self {
            ScaleDecision::Hold => 0,
            ScaleDecision::Grow(n) => n,
            ScaleDecision::Shrink(n) => -n,
        }
    }
}

/// Scaling rules for a pool bounded by `min_workers..=max_workers`.
///
/// - While a previous scaling change is still being applied, hold.
/// - Fully idle (nothing active, nothing pending) above the minimum: shrink
///   back to exactly the minimum.
/// - Fully saturated (every worker active) below the maximum: grow by 20%
///   of the current workers (at least one), never past the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Autoscaler {
    min_workers: i64,
    max_workers: i64,
}

impl Autoscaler {
    pub fn new(min_workers: i64, max_workers: i64) -> Self {
        Self {
            min_workers,
            max_workers,
        }
    }

    /// Decide what to do for the observed load.
    pub fn decide(&self, stat: &PoolStat, change_pending: bool) -> ScaleDecision {
        if change_pending {
            return ScaleDecision::Hold;
        }

        let workers = stat.workers;

        if stat.active == 0 && stat.pending == 0 && workers > self.min_workers {
            return ScaleDecision::Shrink(workers - self.min_workers);
        }

        if stat.active >= workers && workers < self.max_workers {
            let step = (workers * GROWTH_PERCENT / 100).max(1);
            return ScaleDecision::Grow(step.min(self.max_workers - workers));
        }

        ScaleDecision::Hold
    }
}
