//! WorkPool tests: throughput, backpressure, scaling and shutdown.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use workpool::{Context, PoolConfig, PoolError, WorkError, WorkPool, WorkResult};

use crate::helpers::*;

/// 10,000 tasks from several producers all run before shutdown returns.
#[test]
fn test_executes_every_task() {
    let ctx = Context::new();
    let pool = WorkPool::new(&ctx, "throughput", PoolConfig::new(4, 100)).unwrap();
    let counter = Counter::new();

    thread::scope(|scope| {
        for _ in 0..8 {
            let (pool, ctx, counter) = (&pool, &ctx, &counter);
            scope.spawn(move || {
                for _ in 0..1_250 {
                    pool.do_work(ctx, counter.work()).unwrap();
                }
            });
        }
    });

    pool.shutdown();

    let stat = pool.stat();
    assert_eq!(counter.get(), 10_000);
    assert_eq!(stat.executed, 10_000);
    assert_eq!(stat.workers, 0);
    assert_eq!(stat.active, 0);
    assert_eq!(stat.pending, 0);
}

/// A busy single-worker pool turns away a timed submission quickly.
#[test]
fn test_do_wait_denied_when_busy() {
    let ctx = Context::new();
    let pool = WorkPool::new(&ctx, "busy", PoolConfig::new(1, 1)).unwrap();
    let counter = Counter::new();

    pool.do_work(&ctx, counter.slow_work(Duration::from_millis(500)))
        .unwrap();
    assert!(wait_until(SETTLE_TIMEOUT, || pool.stat().active == 1));

    let started = Instant::now();
    let result = pool.do_wait(&ctx, counter.work(), Duration::from_millis(10));

    assert_eq!(
        result,
        Err(PoolError::WorkRequestDenied(Duration::from_millis(10)))
    );
    assert!(started.elapsed() < Duration::from_millis(400));

    pool.shutdown();
    // Denied work never runs
    assert_eq!(counter.get(), 1);
}

/// A panicking task does not take its worker, or the pool, down.
#[test]
fn test_panic_isolated() {
    let ctx = Context::new();
    let pool = WorkPool::new(&ctx, "panics", PoolConfig::new(1, 1)).unwrap();
    let counter = Counter::new();

    for _ in 0..3 {
        pool.do_work(&ctx, |_: &Context, _: usize| -> WorkResult {
            panic!("task exploded");
        })
        .unwrap();
    }
    pool.do_work(&ctx, counter.work()).unwrap();

    assert!(wait_until(SETTLE_TIMEOUT, || counter.get() == 1));
    assert!(wait_until(SETTLE_TIMEOUT, || pool.stat().executed == 4));
    assert_eq!(pool.stat().workers, 1);

    pool.shutdown();
}

/// Results and failures come back through `submit`.
#[test]
fn test_submit_results() {
    let ctx = Context::builder().value("factor", 7u64).build();
    let pool = WorkPool::new(&ctx, "submit", PoolConfig::new(2, 4)).unwrap();

    let rx = pool
        .submit(&ctx, |ctx: &Context, _: usize| {
            let factor = ctx.get::<u64>("factor").copied().unwrap_or(0);
            Ok(factor * 6)
        })
        .unwrap();
    assert_eq!(tokio_test::block_on(rx).unwrap(), Ok(42));

    let rx = pool
        .submit(&ctx, |_: &Context, _: usize| -> Result<u64, WorkError> {
            Err(WorkError::new("no answer"))
        })
        .unwrap();
    assert_eq!(
        tokio_test::block_on(rx).unwrap(),
        Err(WorkError::new("no answer"))
    );

    pool.shutdown();
}

/// Manual scaling stays within the configured bounds.
#[test]
fn test_worker_bounds() {
    let ctx = Context::new();
    let pool = WorkPool::new(&ctx, "bounds", PoolConfig::new(4, 100)).unwrap();
    assert_eq!(pool.stat().workers, 4);

    pool.add(&ctx, 1_000).unwrap();
    assert!(wait_until(SETTLE_TIMEOUT, || pool.stat().workers == 100));

    pool.add(&ctx, -1_000).unwrap();
    assert!(wait_until(SETTLE_TIMEOUT, || pool.stat().workers == 4));

    pool.reset(&ctx, 10).unwrap();
    assert!(wait_until(SETTLE_TIMEOUT, || pool.stat().workers == 10));

    pool.shutdown();
    assert_eq!(pool.stat().workers, 0);
}

/// Opposing scaling requests from several threads never break the bounds.
#[test]
fn test_concurrent_add_and_remove_stay_in_bounds() {
    let ctx = Context::new();
    let pool = WorkPool::new(&ctx, "tug", PoolConfig::new(2, 10)).unwrap();

    thread::scope(|scope| {
        for delta in [1_000i64, -1_000, 7, -7] {
            let (pool, ctx) = (&pool, &ctx);
            scope.spawn(move || {
                for _ in 0..50 {
                    pool.add(ctx, delta).unwrap();
                }
            });
        }

        let sampler = scope.spawn(|| {
            let deadline = Instant::now() + Duration::from_millis(500);
            while Instant::now() < deadline {
                let workers = pool.stat().workers;
                assert!((2..=10).contains(&workers), "workers out of bounds: {}", workers);
                thread::sleep(Duration::from_millis(1));
            }
        });
        sampler.join().unwrap();
    });

    // Late tokens are still applied within bounds
    thread::sleep(Duration::from_millis(200));
    let workers = pool.stat().workers;
    assert!((2..=10).contains(&workers), "workers out of bounds: {}", workers);

    pool.shutdown();
    assert_eq!(pool.stat().workers, 0);
}

/// Saturation grows the pool; idleness shrinks it back to the minimum.
#[test]
fn test_autoscaling() {
    let ctx = Context::new();
    let pool = WorkPool::new(&ctx, "autoscale", PoolConfig::new(2, 20)).unwrap();
    let counter = Counter::new();

    // Keep every worker busy while submitting more work
    let peak = thread::scope(|scope| {
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let (pool, ctx, counter) = (&pool, &ctx, &counter);
                scope.spawn(move || {
                    for _ in 0..20 {
                        pool.do_work(ctx, counter.slow_work(Duration::from_millis(20)))
                            .unwrap();
                    }
                })
            })
            .collect();

        let mut peak = 0;
        while !producers.iter().all(|p| p.is_finished()) {
            peak = peak.max(pool.stat().workers);
            thread::sleep(Duration::from_millis(1));
        }
        peak
    });

    assert!(wait_until(SETTLE_TIMEOUT, || counter.get() == 80));
    assert!(peak > 2, "pool never grew (peak {})", peak);
    assert!(peak <= 20);

    // An idle submission triggers the shrink back to min
    assert!(wait_until(SETTLE_TIMEOUT, || {
        let _ = pool.do_wait(&ctx, counter.work(), Duration::from_millis(50));
        pool.stat().workers == 2
    }));

    pool.shutdown();
}

/// Metric snapshots are delivered while the pool runs.
#[test]
fn test_metric_handler_receives_snapshots() {
    let ctx = Context::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let config = PoolConfig::new(3, 5)
        .with_metric_interval(Duration::from_millis(10))
        .with_metric_handler(move |stat| sink.lock().unwrap().push(stat));
    let pool = WorkPool::new(&ctx, "metrics", config).unwrap();

    assert!(wait_until(Duration::from_secs(5), || !seen.lock().unwrap().is_empty()));
    pool.shutdown();

    let first = seen.lock().unwrap()[0].clone();
    assert_eq!(first.min_workers, 3);
    assert_eq!(first.max_workers, 5);
    assert_eq!(first.workers, 3);
}

/// After shutdown everything is rejected and nothing is left running.
#[test]
fn test_shutdown_complete() {
    let ctx = Context::new();
    let pool = WorkPool::new(&ctx, "shutdown", PoolConfig::new(5, 10)).unwrap();
    let counter = Counter::new();

    for _ in 0..5 {
        pool.do_work(&ctx, counter.slow_work(Duration::from_millis(20)))
            .unwrap();
    }

    pool.shutdown();
    pool.shutdown();

    assert!(pool.is_shutdown());
    assert_eq!(counter.get(), 5);
    assert_eq!(pool.stat().workers, 0);
    assert_eq!(pool.do_work(&ctx, counter.work()), Err(PoolError::Shutdown));
    assert_eq!(pool.add(&ctx, 1), Err(PoolError::Shutdown));
}
