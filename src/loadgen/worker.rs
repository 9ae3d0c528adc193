//! One load-generation worker
//!
//! A worker owns a current-thread tokio runtime, an HTTP client and a
//! [`Multiplexer`]. It keeps the multiplexer full from the ring until the
//! stop signal is raised, then lets in-flight transfers finish.

use crate::config::EngineConfig;
use crate::crawler::{Admission, Multiplexer};
use crate::loadgen::ring::UrlRing;
use crate::loadgen::signal::StopSignal;
use crate::loadgen::stats::{StatsRecord, WorkerStats};
use crate::output::{SharedLineSink, StatsRegion, VisitSink};
use crate::SwarmError;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;

/// Everything a worker thread needs, moved in at spawn
pub struct WorkerContext {
    pub id: u32,
    pub engine: EngineConfig,
    pub ring: UrlRing,
    pub stop: StopSignal,
    pub rate_interval: Duration,
    pub stats_dir: Option<PathBuf>,
    pub sink: Option<SharedLineSink>,
}

/// Runs a worker to completion on the calling thread
///
/// A setup failure raises the stop signal so sibling workers wind down too.
pub fn run_worker(ctx: WorkerContext) -> Result<StatsRecord, SwarmError> {
    let stop = ctx.stop.clone();
    let id = ctx.id;

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SwarmError::Setup(format!("Worker {}: failed to build runtime: {}", id, e)))
        .and_then(|runtime| runtime.block_on(drive(ctx)));

    if let Err(e) = &result {
        tracing::error!("Worker {} failed: {}", id, e);
        stop.trigger();
    }
    result
}

async fn drive(mut ctx: WorkerContext) -> Result<StatsRecord, SwarmError> {
    let mut mux = Multiplexer::new(&ctx.engine)?;
    let mut cursor = ctx.ring.random_cursor();
    let mut region = match &ctx.stats_dir {
        Some(dir) => Some(StatsRegion::create(dir, ctx.id).map_err(|e| {
            SwarmError::Setup(format!(
                "Worker {}: failed to create stats file in {}: {}",
                ctx.id,
                dir.display(),
                e
            ))
        })?),
        None => None,
    };

    tracing::debug!("Worker {} starting at ring offset {}", ctx.id, cursor.position());

    let mut stats = WorkerStats::new(ctx.id, ctx.rate_interval, Instant::now());
    let mut ticker = tokio::time::interval(ctx.rate_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        if !ctx.stop.is_triggered() {
            while mux.has_capacity() {
                let url = cursor.next_url();
                if let Err(e) = mux.submit(url) {
                    tracing::warn!("Worker {}: cannot submit {}: {}", ctx.id, url, e);
                    break;
                }
            }
        } else if mux.in_flight() == 0 {
            break;
        }

        tokio::select! {
            completion = mux.next_completion() => {
                let Some(completion) = completion else {
                    tokio::task::yield_now().await;
                    continue;
                };

                if !completion.is_success() {
                    tracing::debug!(
                        "Worker {}: {} finished as {}",
                        ctx.id,
                        completion.url,
                        completion.status()
                    );
                } else if let Some(sink) = ctx.sink.as_mut() {
                    if let Err(e) = sink.record_visit(&completion.url) {
                        tracing::warn!("Worker {}: failed to record visit: {}", ctx.id, e);
                    }
                }

                if stats.on_transfer_complete(completion.bytes(), Instant::now()) {
                    publish(&mut region, stats.record());
                }
            }
            _ = ticker.tick() => {
                if stats.maybe_recompute(Instant::now()) {
                    publish(&mut region, stats.record());
                }
            }
        }
    }

    stats.maybe_recompute(Instant::now());
    publish(&mut region, stats.record());

    tracing::debug!(
        "Worker {} done: {} hits, {} bytes",
        ctx.id,
        stats.record().hits,
        stats.record().total_bytes
    );
    Ok(*stats.record())
}

fn publish(region: &mut Option<StatsRegion>, record: &StatsRecord) {
    if let Some(region) = region {
        if let Err(e) = region.publish(record) {
            tracing::warn!(
                "Failed to publish stats to {}: {}",
                region.path().display(),
                e
            );
        }
    }
}
