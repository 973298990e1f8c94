//! Management thread: applies scaling tokens, emits metrics and stops
//! workers on shutdown.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{at, never, select, Receiver};

use super::config::PoolConfig;
use super::panic;
use super::shared::Shared;
use super::worker::{self, Kill};

/// Scaling token sent on the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    AddWorker,
    RemoveWorker,
}

pub(crate) struct Manager {
    pub shared: Arc<Shared>,
    pub commands: Receiver<Command>,
    pub shutdown: Receiver<()>,
    pub config: PoolConfig,
}

impl Manager {
    pub fn run(self) {
        tracing::debug!(pool = %self.shared.name, "pool manager started");

        let mut next_tick = self.next_tick();

        'run: loop {
            let tick = match next_tick {
                Some(deadline) => at(deadline),
                None => never(),
            };

            select! {
                recv(self.commands) -> command => match command {
                    Ok(Command::AddWorker) => self.add_worker(),
                    Ok(Command::RemoveWorker) => self.remove_worker(),
                    Err(_) => {
                        self.stop_workers();
                        break 'run;
                    }
                },
                // Never sent on: disconnection is the signal.
                recv(self.shutdown) -> _ => {
                    self.stop_workers();
                    break 'run;
                }
                recv(tick) -> _ => {
                    self.emit_metrics();
                    next_tick = self.next_tick();
                }
            }
        }

        tracing::debug!(pool = %self.shared.name, "pool manager stopped");
    }

    fn next_tick(&self) -> Option<Instant> {
        self.config
            .next_metric_period()
            .map(|period| Instant::now() + period)
    }

    /// Spawn one worker unless the pool is at its maximum. The manager is
    /// the only thread that grows the pool after construction, so the bound
    /// check and the spawn cannot interleave with another scale-up.
    fn add_worker(&self) {
        let counters = &self.shared.counters;

        if counters.current_workers.load(Ordering::SeqCst) < self.shared.max_workers {
            counters.current_workers.fetch_add(1, Ordering::SeqCst);

            match worker::spawn(&self.shared) {
                Ok(()) => tracing::debug!(pool = %self.shared.name, "worker added"),
                Err(e) => {
                    counters.current_workers.fetch_sub(1, Ordering::SeqCst);
                    tracing::error!(pool = %self.shared.name, error = %e, "failed to spawn worker");
                }
            }
        }

        counters.update_pending.fetch_sub(1, Ordering::SeqCst);
    }

    /// Ask one idle worker to exit unless the pool is at its minimum.
    fn remove_worker(&self) {
        let counters = &self.shared.counters;
        let remaining = counters.current_workers.load(Ordering::SeqCst)
            - counters.retiring.load(Ordering::SeqCst);

        if remaining > self.shared.min_workers {
            counters.retiring.fetch_add(1, Ordering::SeqCst);
            // The worker that takes the token settles `update_pending`.
            if self.shared.kill_tx.send(Kill::Scale).is_ok() {
                tracing::debug!(pool = %self.shared.name, "worker removal requested");
                return;
            }
            counters.retiring.fetch_sub(1, Ordering::SeqCst);
        }

        counters.update_pending.fetch_sub(1, Ordering::SeqCst);
    }

    /// Send one stop token per live worker. Tokens are not targeted: each is
    /// taken by whichever worker is idle first.
    fn stop_workers(&self) {
        let live = self.shared.counters.current_workers.load(Ordering::SeqCst);

        tracing::debug!(pool = %self.shared.name, workers = live, "stopping workers");

        for _ in 0..live {
            if self.shared.kill_tx.send(Kill::Shutdown).is_err() {
                break;
            }
        }
    }

    fn emit_metrics(&self) {
        let Some(handler) = &self.config.metric_handler else {
            return;
        };

        let stat = self.shared.stat();
        if let Err(caught) = panic::catch(|| handler(stat)) {
            tracing::error!(
                pool = %self.shared.name,
                panic = %caught.message,
                backtrace = %caught.backtrace,
                "metric handler panicked"
            );
        }
    }
}
