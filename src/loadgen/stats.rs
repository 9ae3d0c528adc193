//! Per-worker throughput statistics
//!
//! Totals move on every completion. Rates are recomputed over a window no
//! shorter than the configured interval, so a burst of completions doesn't
//! produce a meaningless instantaneous rate.

use std::time::{Duration, Instant};

/// Size of an encoded [`StatsRecord`] in bytes
pub const RECORD_SIZE: usize = 40;

/// Snapshot of one worker's counters
///
/// # Binary Layout
///
/// Little-endian, 40 bytes:
///
/// | Offset | Type | Field |
/// |--------|------|-------|
/// | 0 | u32 | `worker_id` |
/// | 4 | - | padding (zero) |
/// | 8 | u64 | `total_bytes` |
/// | 16 | f64 | `bytes_per_sec` |
/// | 24 | u64 | `hits` |
/// | 32 | f64 | `hits_per_sec` |
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatsRecord {
    pub worker_id: u32,
    pub total_bytes: u64,
    pub bytes_per_sec: f64,
    pub hits: u64,
    pub hits_per_sec: f64,
}

impl StatsRecord {
    pub fn new(worker_id: u32) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.worker_id.to_le_bytes());
        buf[8..16].copy_from_slice(&self.total_bytes.to_le_bytes());
        buf[16..24].copy_from_slice(&self.bytes_per_sec.to_le_bytes());
        buf[24..32].copy_from_slice(&self.hits.to_le_bytes());
        buf[32..40].copy_from_slice(&self.hits_per_sec.to_le_bytes());
        buf
    }

    /// Reads a record back from its encoded form
    ///
    /// Returns `None` if `bytes` is shorter than [`RECORD_SIZE`]. Trailing
    /// bytes are ignored.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < RECORD_SIZE {
            return None;
        }

        let u32_at = |at: usize| u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap_or([0; 4]));
        let u64_at = |at: usize| u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap_or([0; 8]));
        let f64_at = |at: usize| f64::from_le_bytes(bytes[at..at + 8].try_into().unwrap_or([0; 8]));

        Some(Self {
            worker_id: u32_at(0),
            total_bytes: u64_at(8),
            bytes_per_sec: f64_at(16),
            hits: u64_at(24),
            hits_per_sec: f64_at(32),
        })
    }
}

/// Live statistics owned by one worker
#[derive(Debug)]
pub struct WorkerStats {
    record: StatsRecord,
    interval: Duration,
    window_start: Instant,
    window_bytes: u64,
    window_hits: u64,
}

impl WorkerStats {
    pub fn new(worker_id: u32, interval: Duration, now: Instant) -> Self {
        Self {
            record: StatsRecord::new(worker_id),
            interval,
            window_start: now,
            window_bytes: 0,
            window_hits: 0,
        }
    }

    /// Accounts for one finished transfer
    ///
    /// Every completion counts as a hit, whatever its outcome. `bytes` is the
    /// body size actually received.
    ///
    /// # Returns
    ///
    /// `true` if the rates were recomputed as a result
    pub fn on_transfer_complete(&mut self, bytes: u64, now: Instant) -> bool {
        self.record.hits += 1;
        self.record.total_bytes += bytes;
        self.window_hits += 1;
        self.window_bytes += bytes;
        self.maybe_recompute(now)
    }

    /// Recomputes the rates if at least one interval has passed
    ///
    /// Also driven by a timer so rates fall to zero once completions stop.
    pub fn maybe_recompute(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval || elapsed.is_zero() {
            return false;
        }

        let secs = elapsed.as_secs_f64();
        self.record.bytes_per_sec = self.window_bytes as f64 / secs;
        self.record.hits_per_sec = self.window_hits as f64 / secs;

        self.window_start = now;
        self.window_bytes = 0;
        self.window_hits = 0;
        true
    }

    pub fn record(&self) -> &StatsRecord {
        &self.record
    }
}
