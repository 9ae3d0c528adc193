//! Swarmfetch: a concurrent HTTP crawler and load generator
//!
//! This crate drives many HTTP transfers at once from a single task per engine.
//! In crawl mode one engine follows links from a seed URL, confined to the
//! seed's host. In load mode several engines, one per thread, hammer a fixed
//! ring of URLs and keep per-worker throughput statistics.

pub mod config;
pub mod crawler;
pub mod loadgen;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Swarmfetch operations
#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Engine saturated: {max} transfers already in flight")]
    Saturated { max: usize },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Worker {id} panicked")]
    WorkerPanicked { id: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("No seed source: {0}")]
    MissingSeed(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Empty URL")]
    Empty,

    #[error("Failed to parse URL '{url}': {message}")]
    Parse { url: String, message: String },

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Per-transfer failures
///
/// These never abort a run: they are carried inside a completion and the
/// caller decides what to do with the URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Connection to {url} failed: {message}")]
    Connect { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transfer of {url} stalled: {bytes} bytes in {seconds}s")]
    Stalled {
        url: String,
        bytes: u64,
        seconds: u64,
    },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Failed reading body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Result type alias for Swarmfetch operations
pub type Result<T> = std::result::Result<T, SwarmError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Completion, Crawler, Frontier, Multiplexer};
pub use loadgen::{StatsRecord, StopSignal, UrlRing, WorkerPool};
pub use output::{CrawlReport, PoolSummary, VisitSink};
pub use state::{TransferStatus, VisitedEntry};
pub use url::{canonicalize, domain_scope, extract_domain, extract_links, ExcludeSet};
