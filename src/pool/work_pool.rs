//! Dynamically sized worker pool.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Select, Sender};
use tokio::sync::oneshot;

use crate::context::Context;

use super::autoscaler::{Autoscaler, ScaleDecision};
use super::config::PoolConfig;
use super::error::{PoolError, PoolResult};
use super::manager::{Command, Manager};
use super::shared::Shared;
use super::stat::{Counters, PoolStat};
use super::work::{Task, Work, WorkError, WorkResult};
use super::worker;

/// A pool of worker threads that grows under load and shrinks when idle.
///
/// Work is handed to an idle worker through a rendezvous channel: a
/// submission returns once a worker has accepted it, not when it finishes.
/// A management thread applies scaling requests and emits periodic
/// metrics. Panics and errors inside work are logged by the worker and
/// never reach the submitter.
pub struct WorkPool {
    shared: Arc<Shared>,
    autoscaler: Autoscaler,
    tasks: Sender<Task>,
    commands: Sender<Command>,
    /// Dropped on shutdown; never sent on.
    shutdown_tx: Mutex<Option<Sender<()>>>,
    /// Disconnects when `shutdown_tx` is dropped.
    closed: Receiver<()>,
    is_shutdown: AtomicBool,
    /// Serializes health checks so one scaling decision runs at a time.
    health: Mutex<()>,
    manager: Mutex<Option<JoinHandle<()>>>,
}

impl WorkPool {
    /// Validate `config`, start the management thread and `min_workers`
    /// workers.
    pub fn new(ctx: &Context, name: impl Into<String>, config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let name = name.into();
        let (tasks_tx, tasks_rx) = bounded::<Task>(0);
        let (kill_tx, kill_rx) = unbounded();
        let (commands_tx, commands_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        let shared = Arc::new(Shared {
            name: name.clone(),
            min_workers: config.min_workers,
            max_workers: config.max_workers,
            counters: Counters::default(),
            tasks: tasks_rx,
            kill_tx,
            kill_rx,
            workers: Mutex::new(Vec::with_capacity(config.min_workers as usize)),
            next_worker_id: AtomicUsize::new(0),
        });

        let manager = Manager {
            shared: Arc::clone(&shared),
            commands: commands_rx,
            shutdown: shutdown_rx.clone(),
            config: config.clone(),
        };

        let handle = thread::Builder::new()
            .name(format!("{}-manager", name))
            .spawn(move || manager.run())?;

        let pool = Self {
            shared,
            autoscaler: Autoscaler::new(config.min_workers, config.max_workers),
            tasks: tasks_tx,
            commands: commands_tx,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            closed: shutdown_rx,
            is_shutdown: AtomicBool::new(false),
            health: Mutex::new(()),
            manager: Mutex::new(Some(handle)),
        };

        // On failure `pool` is dropped, which stops the workers already started.
        for _ in 0..config.min_workers {
            pool.shared
                .counters
                .current_workers
                .fetch_add(1, Ordering::SeqCst);

            if let Err(e) = worker::spawn(&pool.shared) {
                pool.shared
                    .counters
                    .current_workers
                    .fetch_sub(1, Ordering::SeqCst);
                return Err(e.into());
            }
        }

        tracing::info!(
            pool = %name,
            ctx = %ctx.id(),
            min_workers = config.min_workers,
            max_workers = config.max_workers,
            "work pool created"
        );

        Ok(pool)
    }

    /// Hand `work` to the next idle worker, waiting as long as it takes.
    pub fn do_work<W: Work>(&self, ctx: &Context, work: W) -> PoolResult<()> {
        self.submit_task(ctx, Task::new(ctx, work), None)
    }

    /// Hand `work` to the next idle worker, giving up after `timeout`.
    ///
    /// Returns `PoolError::WorkRequestDenied` if no worker accepted the work
    /// in time; the work is dropped, not queued.
    pub fn do_wait<W: Work>(&self, ctx: &Context, work: W, timeout: Duration) -> PoolResult<()> {
        self.submit_task(ctx, Task::new(ctx, work), Some(timeout))
    }

    /// Run a value-returning closure on the pool.
    ///
    /// The receiver yields the closure's result. If the closure panics the
    /// sender is dropped and the receiver reports a closed channel.
    pub fn submit<T, F>(
        &self,
        ctx: &Context,
        f: F,
    ) -> PoolResult<oneshot::Receiver<Result<T, WorkError>>>
    where
        T: Send + 'static,
        F: FnOnce(&Context, usize) -> Result<T, WorkError> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        self.do_work(ctx, move |ctx: &Context, worker_id: usize| -> WorkResult {
            // The caller may have stopped listening; nothing to do then.
            let _ = tx.send(f(ctx, worker_id));
            Ok(())
        })?;

        Ok(rx)
    }

    /// Add (`delta > 0`) or remove (`delta < 0`) workers.
    ///
    /// Requests are applied asynchronously by the management thread within
    /// `min_workers..=max_workers`.
    pub fn add(&self, ctx: &Context, delta: i64) -> PoolResult<()> {
        if delta == 0 {
            return Err(PoolError::InvalidAddRequest);
        }
        if self.is_shutdown() {
            return Err(PoolError::Shutdown);
        }

        let command = if delta > 0 {
            Command::AddWorker
        } else {
            Command::RemoveWorker
        };
        // More tokens than `max_workers` cannot change anything.
        let count = delta.unsigned_abs().min(self.shared.max_workers as u64);
        let counters = &self.shared.counters;

        for _ in 0..count {
            counters.update_pending.fetch_add(1, Ordering::SeqCst);
            if self.commands.send(command).is_err() {
                counters.update_pending.fetch_sub(1, Ordering::SeqCst);
                return Err(PoolError::Shutdown);
            }
        }

        tracing::debug!(pool = %self.shared.name, ctx = %ctx.id(), delta, "scaling requested");
        Ok(())
    }

    /// Scale towards `target` workers. A no-op if already there.
    pub fn reset(&self, ctx: &Context, target: i64) -> PoolResult<()> {
        let current = self.shared.counters.current_workers.load(Ordering::SeqCst);
        match target.saturating_sub(current) {
            0 => Ok(()),
            delta => self.add(ctx, delta),
        }
    }

    /// Snapshot of the pool counters.
    pub fn stat(&self) -> PoolStat {
        self.shared.stat()
    }

    /// Pool name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Returns true once [`shutdown`](WorkPool::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Stop every worker and the management thread, then wait for them.
    ///
    /// Running work finishes first; workers observe the stop only between
    /// tasks. Later submissions fail with `PoolError::Shutdown`.
    pub fn shutdown(&self) {
        if self.is_shutdown.swap(true, Ordering::SeqCst) {
            return; // Already shutting down
        }

        tracing::info!(pool = %self.shared.name, "shutting down work pool");

        drop(
            self.shutdown_tx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let manager = self
            .manager
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = manager {
            if handle.join().is_err() {
                tracing::error!(pool = %self.shared.name, "pool manager panicked");
            }
        }

        let workers = std::mem::take(
            &mut *self
                .shared
                .workers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for handle in workers {
            if handle.join().is_err() {
                tracing::error!(pool = %self.shared.name, "worker thread panicked");
            }
        }

        let stat = self.stat();
        tracing::info!(
            pool = %self.shared.name,
            executed = stat.executed,
            workers = stat.workers,
            "work pool stopped"
        );
    }

    fn submit_task(&self, ctx: &Context, task: Task, timeout: Option<Duration>) -> PoolResult<()> {
        if self.is_shutdown() {
            return Err(PoolError::Shutdown);
        }

        // Runs before this submission counts as pending, so an idle pool reads idle.
        self.measure_health(ctx);

        let counters = &self.shared.counters;
        counters.pending_work.fetch_add(1, Ordering::SeqCst);
        let result = self.dispatch(task, timeout);
        counters.pending_work.fetch_sub(1, Ordering::SeqCst);

        if let Err(PoolError::WorkRequestDenied(timeout)) = &result {
            tracing::warn!(
                pool = %self.shared.name,
                ctx = %ctx.id(),
                timeout_ms = timeout.as_millis() as u64,
                "work request denied"
            );
        }

        result
    }

    /// Rendezvous with an idle worker, bounded by `timeout` if given.
    fn dispatch(&self, task: Task, timeout: Option<Duration>) -> PoolResult<()> {
        let mut sel = Select::new();
        let send_op = sel.send(&self.tasks);
        let closed_op = sel.recv(&self.closed);

        let oper = match timeout {
            Some(timeout) => sel
                .select_timeout(timeout)
                .map_err(|_| PoolError::WorkRequestDenied(timeout))?,
            None => sel.select(),
        };

        match oper.index() {
            i if i == send_op => {
                // Counted before the hand-off so the next health check
                // already sees the worker as busy. The worker settles it.
                let active = &self.shared.counters.active_work;
                active.fetch_add(1, Ordering::SeqCst);
                oper.send(&self.tasks, task).map_err(|_| {
                    active.fetch_sub(1, Ordering::SeqCst);
                    PoolError::Shutdown
                })
            }
            i if i == closed_op => {
                let _ = oper.recv(&self.closed);
                Err(PoolError::Shutdown)
            }
            _ => unreachable!(),
        }
    }

    /// Grow or shrink the pool based on current load, unless a previous
    /// scaling request is still being applied.
    fn measure_health(&self, ctx: &Context) {
        let _guard = self.health.lock().unwrap_or_else(PoisonError::into_inner);

        let change_pending = self.shared.counters.update_pending.load(Ordering::SeqCst) != 0;
        let stat = self.stat();
        let decision = self.autoscaler.decide(&stat, change_pending);

        if decision == ScaleDecision::Hold {
            return;
        }

        tracing::debug!(
            pool = %self.shared.name,
            ctx = %ctx.id(),
            ?decision,
            workers = stat.workers,
            active = stat.active,
            pending = stat.pending,
            "scaling pool"
        );

        if let Err(e) = self.add(ctx, decision.delta()) {
            tracing::debug!(pool = %self.shared.name, error = %e, "scaling request dropped");
        }
    }
}

impl Drop for WorkPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkPool")
            .field("name", &self.shared.name)
            .field("stat", &self.stat())
            .field("is_shutdown", &self.is_shutdown())
            .finish()
    }
}
