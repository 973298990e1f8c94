//! Test helpers and utilities

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use workpool::{Context, WorkResult};

/// Default time to wait for asynchronous pool state to settle.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll `check` until it returns true or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    check()
}

/// Shared counter bumped by every piece of work built from it.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicU64>);

#[allow(dead_code)]
impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Work that increments the counter.
    pub fn work(&self) -> impl FnOnce(&Context, usize) -> WorkResult + Send + 'static {
        let counter = Arc::clone(&self.0);
        move |_: &Context, _: usize| -> WorkResult {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Work that sleeps for `duration`, then increments the counter.
    pub fn slow_work(
        &self,
        duration: Duration,
    ) -> impl FnOnce(&Context, usize) -> WorkResult + Send + 'static {
        let counter = Arc::clone(&self.0);
        move |_: &Context, _: usize| -> WorkResult {
            thread::sleep(duration);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
