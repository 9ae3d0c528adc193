//! Load-generation mode
//!
//! This module contains the multi-worker load generator, including:
//! - The shared URL ring and per-worker cursors
//! - The process-wide stop signal
//! - Per-worker throughput statistics and their binary record
//! - The worker loop and the pool that spawns and joins workers

mod pool;
mod ring;
mod signal;
mod stats;
mod worker;

pub use pool::WorkerPool;
pub use ring::{RingCursor, UrlRing};
pub use signal::StopSignal;
pub use stats::{StatsRecord, WorkerStats, RECORD_SIZE};
pub use worker::{run_worker, WorkerContext};

use crate::config::Config;
use crate::output::{PoolSummary, SharedLineSink};
use crate::SwarmError;

/// Runs a complete load-generation session
///
/// This is the main entry point for load mode. It will:
/// 1. Read the URL ring from `config.load.url_file`
/// 2. Start one worker thread per configured worker
/// 3. Raise `stop` on Ctrl-C or when `config.load.duration_secs` elapses
/// 4. Join all workers and return the aggregated summary
///
/// # Arguments
///
/// * `config` - A configuration that passed `validate_for_load`
/// * `stop` - Stop signal; may also be raised by the caller
/// * `sink` - Optional destination for visited URLs
///
/// # Returns
///
/// * `Ok(PoolSummary)` - All workers finished
/// * `Err(SwarmError)` - Setup failed or a worker failed
pub async fn run_load(
    config: &Config,
    stop: StopSignal,
    sink: Option<SharedLineSink>,
) -> Result<PoolSummary, SwarmError> {
    let url_file = config.load.url_file.as_deref().ok_or_else(|| {
        crate::ConfigError::MissingSeed("load mode needs a URL file".to_string())
    })?;
    let ring = UrlRing::from_file(url_file)?;

    let pool = WorkerPool::start(config, ring, stop.clone(), sink)?;

    let interrupt = {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl-C");
                stop.trigger();
            }
        })
    };

    let timer = config.load.duration().map(|duration| {
        let stop = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            tracing::info!("Run duration of {:?} reached", duration);
            stop.trigger();
        })
    });

    let joined = tokio::task::spawn_blocking(move || pool.join()).await;

    interrupt.abort();
    if let Some(timer) = timer {
        timer.abort();
    }

    joined.map_err(|e| SwarmError::Setup(format!("Worker join task failed: {}", e)))?
}
