//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop of one engine instance:
//! - Seeding the frontier with the canonical seed URL
//! - Draining the frontier into the multiplexer up to its concurrency limit
//! - Turning each successful body into in-scope, non-excluded links
//! - Marking failed URLs dead and writing visited URLs to the sink

use crate::config::Config;
use crate::crawler::fetcher::Completion;
use crate::crawler::frontier::Frontier;
use crate::crawler::multiplexer::Multiplexer;
use crate::output::{CrawlReport, OutputResult, VisitSink};
use crate::url::{canonicalize, in_scope_links, ExcludeSet};
use crate::{ConfigError, SwarmError};
use chrono::Utc;
use std::time::Instant;

/// How often (in completed transfers) progress is logged
const PROGRESS_EVERY: u64 = 10;

/// Single-engine crawler confined to the seed's host
pub struct Crawler<S: VisitSink> {
    multiplexer: Multiplexer,
    frontier: Frontier,
    seed: String,
    target_domain: String,
    excludes: ExcludeSet,
    sink: S,
}

impl<S: VisitSink> Crawler<S> {
    /// Creates a crawler from a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration with `crawl.seed` set
    /// * `sink` - Destination for visited URLs
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(SwarmError)` - Missing or invalid seed, bad exclude pattern, or
    ///   the HTTP client could not be built
    pub fn new(config: &Config, sink: S) -> Result<Self, SwarmError> {
        let raw_seed = config
            .crawl
            .seed
            .as_deref()
            .ok_or_else(|| ConfigError::MissingSeed("crawl mode needs a seed URL".to_string()))?;

        let seed = canonicalize(raw_seed, raw_seed)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("Invalid seed URL '{}'", raw_seed)))?;
        let target_domain = seed
            .host_str()
            .ok_or_else(|| ConfigError::InvalidUrl(format!("Seed URL '{}' has no host", seed)))?
            .to_string();

        let excludes = ExcludeSet::new(&config.crawl.exclude)?;
        let multiplexer = Multiplexer::new(&config.engine)?;

        let mut frontier = Frontier::new();
        frontier.enqueue(seed.as_str());

        Ok(Self {
            multiplexer,
            frontier,
            seed: seed.to_string(),
            target_domain,
            excludes,
            sink,
        })
    }

    /// Runs the crawl until the frontier is empty and nothing is in flight
    ///
    /// Per-URL failures never end the run; only a failing sink does.
    pub async fn run(&mut self) -> Result<CrawlReport, SwarmError> {
        tracing::info!(
            "Starting crawl of {} (target host {}, {} exclude patterns)",
            self.seed,
            self.target_domain,
            self.excludes.len()
        );

        let start = Instant::now();
        let mut report = CrawlReport::new(self.seed.as_str(), Utc::now());
        let mut completed: u64 = 0;

        loop {
            let drained = self.frontier.drain_admissible(&mut self.multiplexer);
            report.duplicates += drained.duplicates as u64;

            let completion = match self.multiplexer.next_completion().await {
                Some(c) => c,
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            report.record(completion.status(), completion.bytes());
            self.handle_completion(completion)?;

            completed += 1;
            if completed % PROGRESS_EVERY == 0 {
                let elapsed = start.elapsed();
                tracing::info!(
                    "Progress: {} transfers done, {} queued, {} in flight, {:.2} transfers/sec",
                    completed,
                    self.frontier.len(),
                    self.multiplexer.in_flight(),
                    completed as f64 / elapsed.as_secs_f64()
                );
            }
        }

        self.sink.flush()?;

        report.elapsed = start.elapsed();
        report.discovered = self.frontier.visited().len() as u64;
        report.dead = self.frontier.visited().dead_count() as u64;

        tracing::info!(
            "Crawl completed: {} visited, {} dead in {:?}",
            report.visited(),
            report.dead,
            report.elapsed
        );

        Ok(report)
    }

    /// Processes one finished transfer
    ///
    /// On success records the visit and queues every in-scope link, resolved
    /// against the page's effective URL. Anything else marks the URL dead.
    fn handle_completion(&mut self, completion: Completion) -> OutputResult<()> {
        if completion.status().is_error() {
            match &completion.outcome {
                Ok(code) => tracing::warn!("{} returned HTTP {}", completion.url, code),
                Err(e) => tracing::warn!("{}", e),
            }
            if !self.frontier.mark_dead(&completion.url) {
                tracing::warn!("{} finished but has no frontier entry", completion.url);
            }
            return Ok(());
        }

        self.sink.record_visit(&completion.url)?;

        let body = completion.body_text();
        let links = in_scope_links(
            &body,
            &completion.effective_url,
            &self.target_domain,
            &self.excludes,
        );

        tracing::debug!(
            "{} yielded {} in-scope links",
            completion.url,
            links.len()
        );

        for link in links {
            self.frontier.enqueue(String::from(link));
        }

        Ok(())
    }
}

/// Runs a complete crawl
///
/// # Arguments
///
/// * `config` - A configuration that passed `validate_for_crawl`
/// * `sink` - Destination for visited URLs
///
/// # Example
///
/// ```no_run
/// use swarmfetch::config::Config;
/// use swarmfetch::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut config = Config::default();
/// config.crawl.seed = Some("http://example.com/".to_string());
/// let mut visited: Vec<String> = Vec::new();
/// let report = run_crawl(&config, &mut visited).await?;
/// println!("{} pages", report.visited());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<S: VisitSink>(config: &Config, sink: S) -> Result<CrawlReport, SwarmError> {
    let mut crawler = Crawler::new(config, sink)?;
    crawler.run().await
}
