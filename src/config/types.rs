use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Swarmfetch
///
/// Every section is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub crawl: CrawlConfig,
    pub load: LoadConfig,
    pub output: OutputConfig,
}

/// Settings shared by every engine instance
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of transfers in flight per engine
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Maximum number of redirects followed per transfer
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// TCP/TLS connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Throughput floor below which a transfer counts as stalled (bytes/sec)
    #[serde(rename = "stall-bytes-per-sec")]
    pub stall_bytes_per_sec: u64,

    /// How long a transfer may stay below the floor before it is aborted
    #[serde(rename = "stall-seconds")]
    pub stall_seconds: u64,
}

impl EngineConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn stall_window(&self) -> Duration {
        Duration::from_secs(self.stall_seconds)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 20,
            user_agent: format!("swarmfetch/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            connect_timeout_secs: 10,
            stall_bytes_per_sec: 10,
            stall_seconds: 3,
        }
    }
}

/// Crawl mode configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Absolute URL the crawl starts from; its host bounds the crawl
    pub seed: Option<String>,

    /// Ordered exclusion regexes; the first match wins
    pub exclude: Vec<String>,
}

/// Load-generation mode configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// File holding the URL ring, one URL per line
    #[serde(rename = "url-file")]
    pub url_file: Option<PathBuf>,

    /// Number of worker threads
    pub workers: usize,

    /// Directory receiving one `<id>.threadmem` stats file per worker
    #[serde(rename = "stats-dir")]
    pub stats_dir: Option<PathBuf>,

    /// Minimum interval between rate recomputations (milliseconds)
    #[serde(rename = "rate-interval-ms")]
    pub rate_interval_ms: u64,

    /// Stop automatically after this many seconds
    #[serde(rename = "duration-secs")]
    pub duration_secs: Option<u64>,
}

impl LoadConfig {
    pub fn rate_interval(&self) -> Duration {
        Duration::from_millis(self.rate_interval_ms)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            url_file: None,
            workers: 16,
            stats_dir: None,
            rate_interval_ms: 2000,
            duration_secs: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File receiving one line per visited URL; stdout when unset
    #[serde(rename = "visited-path")]
    pub visited_path: Option<PathBuf>,
}
