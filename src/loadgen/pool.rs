use crate::config::Config;
use crate::loadgen::ring::UrlRing;
use crate::loadgen::signal::StopSignal;
use crate::loadgen::stats::StatsRecord;
use crate::loadgen::worker::{run_worker, WorkerContext};
use crate::output::{PoolSummary, SharedLineSink};
use crate::SwarmError;
use chrono::Utc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// A set of load workers, one OS thread each
pub struct WorkerPool {
    workers: Vec<(u32, JoinHandle<Result<StatsRecord, SwarmError>>)>,
    stop: StopSignal,
    started_at: chrono::DateTime<Utc>,
    started: Instant,
}

impl WorkerPool {
    /// Spawns `config.load.workers` workers over `ring`
    ///
    /// # Arguments
    ///
    /// * `config` - Engine settings and load settings
    /// * `ring` - URLs to cycle; shared by every worker
    /// * `stop` - Signal that ends the run
    /// * `sink` - Optional destination for visited URLs
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerPool)` - All threads were spawned
    /// * `Err(SwarmError::Setup)` - A thread could not be spawned; the workers
    ///   already running are stopped and joined first
    pub fn start(
        config: &Config,
        ring: UrlRing,
        stop: StopSignal,
        sink: Option<SharedLineSink>,
    ) -> Result<Self, SwarmError> {
        let mut pool = Self {
            workers: Vec::with_capacity(config.load.workers),
            stop: stop.clone(),
            started_at: Utc::now(),
            started: Instant::now(),
        };

        tracing::info!(
            "Starting {} workers, {} transfers each, over {} URLs",
            config.load.workers,
            config.engine.max_concurrent,
            ring.len()
        );

        for id in 0..config.load.workers as u32 {
            let ctx = WorkerContext {
                id,
                engine: config.engine.clone(),
                ring: ring.clone(),
                stop: stop.clone(),
                rate_interval: config.load.rate_interval(),
                stats_dir: config.load.stats_dir.clone(),
                sink: sink.clone(),
            };

            let spawned = thread::Builder::new()
                .name(format!("swarmfetch-worker-{}", id))
                .spawn(move || run_worker(ctx));

            match spawned {
                Ok(handle) => pool.workers.push((id, handle)),
                Err(e) => {
                    stop.trigger();
                    // Best effort: the spawn error is the one worth reporting
                    let _ = pool.join();
                    return Err(SwarmError::Setup(format!(
                        "Failed to spawn worker {}: {}",
                        id, e
                    )));
                }
            }
        }

        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits for every worker and sums their final records
    ///
    /// Blocks the calling thread. The first worker error (or panic) is
    /// returned after all workers have been joined.
    pub fn join(self) -> Result<PoolSummary, SwarmError> {
        let mut records = Vec::with_capacity(self.workers.len());
        let mut first_error = None;

        for (id, handle) in self.workers {
            match handle.join() {
                Ok(Ok(record)) => records.push(record),
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(_) => {
                    tracing::error!("Worker {} panicked", id);
                    self.stop.trigger();
                    first_error.get_or_insert(SwarmError::WorkerPanicked { id });
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        Ok(PoolSummary::new(records, self.started_at, self.started.elapsed()))
    }
}
