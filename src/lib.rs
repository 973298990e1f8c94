//! workpool - Dynamically sized worker pools and channel relays.
//!
//! This crate provides a thread-backed work pool that grows under load and
//! shrinks when idle, together with the queue primitives it is built from.
//!
//! # Features
//!
//! - **Dynamic scaling**: Workers added in 20% steps while saturated, trimmed to the minimum when idle
//! - **Panic isolation**: A panicking task is logged with its backtrace; the worker keeps running
//! - **Backpressure**: Submissions block until an idle worker accepts them, or time out
//! - **Unbounded relay**: [`Queue`] decouples producers from a slow consumer without losing order
//! - **Metrics**: Periodic [`PoolStat`] snapshots, exportable to Prometheus
//! - **Structured logging**: JSON log lines via tracing
//!
//! # Example
//!
//! ```rust,ignore
//! use workpool::{Context, PoolConfig, WorkPool, WorkResult};
//!
//! let ctx = Context::new();
//! let pool = WorkPool::new(&ctx, "jobs", PoolConfig::new(4, 100))?;
//!
//! pool.do_work(&ctx, |ctx: &Context, worker_id: usize| -> WorkResult {
//!     println!("{} on worker {}", ctx.id(), worker_id);
//!     Ok(())
//! })?;
//!
//! pool.shutdown();
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod context;
pub mod logging;
pub mod observability;
pub mod pool;
pub mod queue;

// Re-exports for convenience
pub use config::Config;
pub use context::Context;
pub use pool::{PoolConfig, PoolError, PoolResult, PoolStat, Work, WorkError, WorkPool, WorkResult};
pub use queue::{Buffer, PressureStream, Queue, QueueError};
