//! Crawler module: the transfer engine and crawl mode
//!
//! This module contains the core fetch machinery, including:
//! - HTTP fetching with the stall guard and error classification
//! - The bounded-concurrency multiplexer shared by both modes
//! - The frontier with its at-most-once admission
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod multiplexer;

pub use coordinator::{run_crawl, Crawler};
pub use fetcher::{build_http_client, fetch_url, Completion, StallGuard, StallPolicy};
pub use frontier::{DrainReport, Frontier};
pub use multiplexer::{Admission, Multiplexer, TransferHandle};

use crate::config::Config;
use crate::output::{CrawlReport, VisitSink};
use crate::SwarmError;

/// Runs a complete crawl operation
///
/// This is the main entry point for crawl mode. It will:
/// 1. Canonicalize the seed and take its host as the crawl boundary
/// 2. Build the HTTP client and multiplexer
/// 3. Fetch pages, extract and filter links, and follow them
/// 4. Return the crawl report once nothing is left to fetch
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `sink` - Destination for visited URLs
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(SwarmError)` - Crawl could not be set up, or output failed
pub async fn crawl<S: VisitSink>(config: &Config, sink: S) -> Result<CrawlReport, SwarmError> {
    run_crawl(config, sink).await
}
