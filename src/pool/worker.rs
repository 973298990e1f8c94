//! Worker threads.
//!
//! A worker is either idle, waiting on the task and kill channels, or
//! executing one task. Kill tokens are only observed between tasks.

use std::sync::atomic::Ordering;
use std::sync::{Arc, PoisonError};
use std::thread;

use crossbeam_channel::select;

use super::panic;
use super::shared::Shared;
use super::work::Task;

/// Stop token sent on the kill channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kill {
    /// Scale-down: the worker settles one pending scaling token.
    Scale,
    /// Pool shutdown.
    Shutdown,
}

/// Start a worker thread.
///
/// The caller has already counted the worker in `current_workers`.
pub(crate) fn spawn(shared: &Arc<Shared>) -> std::io::Result<()> {
    let id = shared.next_worker_id.fetch_add(1, Ordering::Relaxed);
    let worker_shared = Arc::clone(shared);

    let handle = thread::Builder::new()
        .name(format!("{}-{}", shared.name, id))
        .spawn(move || run(id, worker_shared))?;

    let mut workers = shared
        .workers
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    workers.retain(|h| !h.is_finished());
    workers.push(handle);

    Ok(())
}

/// Worker thread main loop.
fn run(id: usize, shared: Arc<Shared>) {
    tracing::debug!(pool = %shared.name, worker = id, "worker started");

    let stop = 'run: loop {
        select! {
            recv(shared.tasks) -> task => match task {
                Ok(task) => execute(id, &shared, task),
                // Every submitter is gone.
                Err(_) => break 'run None,
            },
            recv(shared.kill_rx) -> kill => break 'run kill.ok(),
        }
    };

    // Leave the live count before settling the retirement, so the manager
    // never sees more removable workers than there are.
    shared.counters.current_workers.fetch_sub(1, Ordering::SeqCst);
    if stop == Some(Kill::Scale) {
        shared.counters.retiring.fetch_sub(1, Ordering::SeqCst);
        shared.counters.update_pending.fetch_sub(1, Ordering::SeqCst);
    }

    tracing::debug!(pool = %shared.name, worker = id, "worker stopped");
}

/// Run one task. Failures and panics are logged, never propagated.
///
/// The submitter counted the task in `active_work` when handing it over.
fn execute(id: usize, shared: &Shared, task: Task) {
    let ctx_id = task.context.id().to_string();
    let outcome = panic::catch(|| task.run(id));

    shared.counters.active_work.fetch_sub(1, Ordering::SeqCst);
    shared.counters.executed_work.fetch_add(1, Ordering::SeqCst);

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(
                pool = %shared.name,
                worker = id,
                ctx = %ctx_id,
                error = %e,
                "work failed"
            );
        }
        Err(caught) => {
            tracing::error!(
                pool = %shared.name,
                worker = id,
                ctx = %ctx_id,
                panic = %caught.message,
                backtrace = %caught.backtrace,
                "work panicked"
            );
        }
    }
}
