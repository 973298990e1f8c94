//! Dynamically sized worker pool.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        WorkPool                            │
//! ├────────────────────────────────────────────────────────────┤
//! │  do_work() / do_wait()          add() / reset()            │
//! │       │  measure_health ─────────────▶│                    │
//! │       ▼                               ▼                    │
//! │ ┌──────────────┐              ┌───────────────┐            │
//! │ │ tasks        │              │ commands      │            │
//! │ │ (rendezvous) │              └───────┬───────┘            │
//! │ └──────┬───────┘              ┌───────▼───────┐  metrics   │
//! │        │                      │ Manager       │──────────▶ │
//! │        │          spawn/kill  │ thread        │            │
//! │        │      ┌───────────────┴───────────────┘            │
//! │  ┌─────▼───┐ ┌▼────────┐ ┌─────────┐                       │
//! │  │ Worker1 │ │ Worker2 │ │ Worker3 │  ...                  │
//! │  └─────────┘ └─────────┘ └─────────┘                       │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Submissions block until an idle worker accepts them. The management
//! thread is the only place workers are added or asked to stop, so the pool
//! stays within `min_workers..=max_workers`.

mod autoscaler;
mod config;
mod error;
mod manager;
mod panic;
mod shared;
mod stat;
mod work;
mod work_pool;
mod worker;

pub use autoscaler::{Autoscaler, ScaleDecision};
pub use config::{MetricHandler, MetricInterval, PoolConfig, MIN_METRIC_INTERVAL};
pub use error::{PoolError, PoolResult};
pub use stat::PoolStat;
pub use work::{Work, WorkError, WorkResult};
pub use work_pool::WorkPool;
