//! Output module for visited URLs, run summaries and worker statistics
//!
//! This module handles:
//! - Writing one line per visited URL to a file or stdout
//! - Printing the end-of-run summary of either mode
//! - Mirroring per-worker statistics into fixed-size files

pub mod stats;
mod stats_region;
mod traits;
mod visited;

pub use stats::{print_crawl_report, print_pool_summary, CrawlReport, PoolSummary};
pub use stats_region::StatsRegion;
pub use traits::{OutputError, OutputResult, VisitSink};
pub use visited::{LineSink, SharedLineSink};

use std::path::Path;

/// Opens the visited-URL sink for a run
///
/// Writes to `path` when given, otherwise to stdout.
pub fn open_visit_sink(path: Option<&Path>) -> OutputResult<Box<dyn VisitSink + Send>> {
    match path {
        Some(path) => Ok(Box::new(LineSink::create(path)?)),
        None => Ok(Box::new(LineSink::stdout())),
    }
}

impl VisitSink for Box<dyn VisitSink + Send> {
    fn record_visit(&mut self, url: &str) -> OutputResult<()> {
        (**self).record_visit(url)
    }

    fn flush(&mut self) -> OutputResult<()> {
        (**self).flush()
    }
}
