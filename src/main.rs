use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::info;

use workpool::observability::PoolMetrics;
use workpool::{logging, Config, Context, WorkPool, WorkResult};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;

    logging::init(&config.logging)?;

    info!(version = workpool::VERSION, "Starting workpool demo...");
    config.log_summary();

    let metrics = Arc::new(PoolMetrics::new()?);
    let mut pool_config = config.pool.pool_config();
    pool_config.metric_handler = Some(metrics.handler(config.pool.name.clone()));

    let ctx = Context::builder().value("demo", true).build();
    let pool = WorkPool::new(&ctx, config.pool.name.clone(), pool_config)?;

    let submitted = AtomicU64::new(0);
    let started = Instant::now();
    let task_duration = config.demo.task_duration;
    let producers = config.pool.max_workers.max(1) as u64;

    // Producers share the task budget so submissions contend for workers.
    thread::scope(|scope| {
        for _ in 0..producers {
            scope.spawn(|| {
                while submitted.fetch_add(1, Ordering::SeqCst) < config.demo.tasks {
                    let result = pool.do_work(&ctx, move |_: &Context, _: usize| -> WorkResult {
                        if !task_duration.is_zero() {
                            thread::sleep(task_duration);
                        }
                        Ok(())
                    });

                    if let Err(e) = result {
                        tracing::error!(error = %e, "submission failed");
                        break;
                    }
                }
            });
        }
    });

    let stat = pool.stat();
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        stat = %serde_json::to_string(&stat)?,
        "All tasks submitted"
    );

    pool.shutdown();

    let stat = pool.stat();
    metrics.observe(pool.name(), &stat);
    info!(
        executed = stat.executed,
        workers = stat.workers,
        "Pool stopped"
    );

    print!("{}", metrics.export());

    Ok(())
}
