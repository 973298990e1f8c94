//! State shared by the pool handle, its manager and its workers.

use std::sync::atomic::AtomicUsize;
use std::sync::Mutex;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use super::stat::{Counters, PoolStat};
use super::work::Task;
use super::worker::Kill;

pub(crate) struct Shared {
    pub name: String,
    pub min_workers: i64,
    pub max_workers: i64,
    pub counters: Counters,
    /// Task submission (rendezvous); receiving end for workers.
    pub tasks: Receiver<Task>,
    pub kill_tx: Sender<Kill>,
    pub kill_rx: Receiver<Kill>,
    /// Handles of worker threads that may still be running.
    pub workers: Mutex<Vec<JoinHandle<()>>>,
    pub next_worker_id: AtomicUsize,
}

impl Shared {
    pub fn stat(&self) -> PoolStat {
        self.counters.snapshot(self.min_workers, self.max_workers)
    }
}
