//! End-of-run summaries
//!
//! This module provides the report types produced by both modes and the
//! functions that print them.

use crate::loadgen::StatsRecord;
use crate::state::TransferStatus;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Canonical seed URL
    pub seed: String,

    /// Wall-clock start of the crawl
    pub started_at: DateTime<Utc>,

    /// Total run time
    pub elapsed: Duration,

    /// Distinct URLs admitted (size of the visited index)
    pub discovered: u64,

    /// Repeat discoveries discarded by the frontier
    pub duplicates: u64,

    /// Entries marked dead
    pub dead: u64,

    /// Body bytes received across all transfers
    pub bytes_received: u64,

    /// Completions by outcome
    pub by_status: HashMap<TransferStatus, u64>,
}

impl CrawlReport {
    pub fn new(seed: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            seed: seed.into(),
            started_at,
            elapsed: Duration::ZERO,
            discovered: 0,
            duplicates: 0,
            dead: 0,
            bytes_received: 0,
            by_status: HashMap::new(),
        }
    }

    /// Counts one completion
    pub fn record(&mut self, status: TransferStatus, bytes: u64) {
        *self.by_status.entry(status).or_insert(0) += 1;
        self.bytes_received += bytes;
    }

    pub fn count(&self, status: TransferStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Successfully visited URLs
    pub fn visited(&self) -> u64 {
        self.count(TransferStatus::Succeeded)
    }

    /// Completions of any outcome
    pub fn completed(&self) -> u64 {
        self.by_status.values().sum()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let completed = self.completed();
        if completed == 0 {
            return 0.0;
        }
        (self.visited() as f64 / completed as f64) * 100.0
    }
}

/// Aggregate of every worker's final record
#[derive(Debug, Clone)]
pub struct PoolSummary {
    /// Final record of each worker, in worker id order
    pub workers: Vec<StatsRecord>,

    pub started_at: DateTime<Utc>,

    pub elapsed: Duration,
}

impl PoolSummary {
    pub fn new(mut workers: Vec<StatsRecord>, started_at: DateTime<Utc>, elapsed: Duration) -> Self {
        workers.sort_by_key(|r| r.worker_id);
        Self {
            workers,
            started_at,
            elapsed,
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.workers.iter().map(|r| r.total_bytes).sum()
    }

    pub fn total_hits(&self) -> u64 {
        self.workers.iter().map(|r| r.hits).sum()
    }

    /// Sum of the workers' last computed byte rates
    pub fn bytes_per_sec(&self) -> f64 {
        self.workers.iter().map(|r| r.bytes_per_sec).sum()
    }

    /// Sum of the workers' last computed hit rates
    pub fn hits_per_sec(&self) -> f64 {
        self.workers.iter().map(|r| r.hits_per_sec).sum()
    }
}

/// Prints a crawl report to stdout
pub fn print_crawl_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Seed: {}", report.seed);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!("  Distinct URLs: {}", report.discovered);
    println!("  Duplicate discoveries: {}", report.duplicates);
    println!("  Dead: {}", report.dead);
    println!("  Bytes received: {}", report.bytes_received);
    println!();

    println!("Transfers by Outcome:");
    let completed = report.completed();
    for status in TransferStatus::all_statuses() {
        let count = report.count(status);
        if count == 0 {
            continue;
        }
        let percentage = (count as f64 / completed as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} transfers succeeded)",
        report.success_rate(),
        report.visited(),
        completed
    );
}

/// Prints a load-generation summary to stdout
pub fn print_pool_summary(summary: &PoolSummary) {
    println!("=== Load Summary ===\n");

    println!("Workers:");
    for record in &summary.workers {
        println!(
            "  #{}: {} hits ({:.1}/s), {} bytes ({:.1} B/s)",
            record.worker_id,
            record.hits,
            record.hits_per_sec,
            record.total_bytes,
            record.bytes_per_sec
        );
    }
    println!();

    println!("Totals:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    println!(
        "  Hits: {} ({:.1}/s)",
        summary.total_hits(),
        summary.hits_per_sec()
    );
    println!(
        "  Bytes: {} ({:.1} B/s)",
        summary.total_bytes(),
        summary.bytes_per_sec()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_report_counts() {
        let mut report = CrawlReport::new("http://example.com/", Utc::now());
        report.record(TransferStatus::Succeeded, 100);
        report.record(TransferStatus::Succeeded, 50);
        report.record(TransferStatus::HttpFailure, 10);
        report.record(TransferStatus::Stalled, 0);

        assert_eq!(report.visited(), 2);
        assert_eq!(report.completed(), 4);
        assert_eq!(report.count(TransferStatus::Unreachable), 0);
        assert_eq!(report.bytes_received, 160);
        assert!((report.success_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_empty() {
        let report = CrawlReport::new("http://example.com/", Utc::now());
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_pool_summary_sums_and_sorts() {
        let records = vec![
            StatsRecord {
                worker_id: 1,
                total_bytes: 300,
                bytes_per_sec: 30.0,
                hits: 3,
                hits_per_sec: 0.5,
            },
            StatsRecord {
                worker_id: 0,
                total_bytes: 100,
                bytes_per_sec: 10.0,
                hits: 1,
                hits_per_sec: 0.25,
            },
        ];
        let summary = PoolSummary::new(records, Utc::now(), Duration::from_secs(2));

        assert_eq!(summary.workers[0].worker_id, 0);
        assert_eq!(summary.total_bytes(), 400);
        assert_eq!(summary.total_hits(), 4);
        assert!((summary.bytes_per_sec() - 40.0).abs() < 1e-9);
        assert!((summary.hits_per_sec() - 0.75).abs() < 1e-9);
    }
}
