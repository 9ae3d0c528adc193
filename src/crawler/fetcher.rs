//! HTTP fetcher implementation
//!
//! This module handles the work of a single transfer:
//! - Building the HTTP client shared by one engine instance
//! - Sending the GET and following redirects
//! - Reading the body chunk by chunk under the stall guard
//! - Classifying failures into [`TransferError`]s

use crate::config::EngineConfig;
use crate::state::TransferStatus;
use crate::{SwarmError, TransferError};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// A finished transfer, successful or not
#[derive(Debug, Clone)]
pub struct Completion {
    /// Identifier assigned at submission
    pub id: u64,

    /// URL as submitted
    pub url: String,

    /// Final URL after redirects (equal to `url` when none were followed)
    pub effective_url: String,

    /// HTTP status code, or the error that ended the transfer
    pub outcome: Result<u16, TransferError>,

    /// Body bytes received before completion
    pub body: Vec<u8>,
}

impl Completion {
    /// Returns true for a 2xx response
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Ok(code) if (200..=299).contains(&code))
    }

    pub fn status(&self) -> TransferStatus {
        TransferStatus::from_outcome(&self.outcome)
    }

    /// Number of body bytes received
    pub fn bytes(&self) -> u64 {
        self.body.len() as u64
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Throughput floor applied to every transfer of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StallPolicy {
    /// Minimum average throughput over one window (bytes/sec)
    pub min_bytes_per_sec: u64,

    /// Window length
    pub window: Duration,
}

impl StallPolicy {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            min_bytes_per_sec: config.stall_bytes_per_sec,
            window: config.stall_window(),
        }
    }
}

/// Low-speed detector for one transfer
///
/// Bytes are accumulated over a window of `policy.window`. When the window
/// closes, the average throughput over it is compared to the floor: below the
/// floor the transfer is stalled, otherwise a fresh window starts. Waiting for
/// response headers counts as a window with zero bytes.
#[derive(Debug)]
pub struct StallGuard {
    policy: StallPolicy,
    window_start: Instant,
    window_bytes: u64,
}

impl StallGuard {
    pub fn new(policy: StallPolicy, now: Instant) -> Self {
        Self {
            policy,
            window_start: now,
            window_bytes: 0,
        }
    }

    /// When the current window closes
    pub fn deadline(&self) -> Instant {
        self.window_start + self.policy.window
    }

    /// Accounts for received bytes and evaluates the window
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Still healthy
    /// * `Err(bytes)` - Stalled; `bytes` were received in the failed window
    pub fn record(&mut self, bytes: usize, now: Instant) -> Result<(), u64> {
        self.window_bytes += bytes as u64;
        self.check(now)
    }

    /// Evaluates the window if it has closed
    pub fn check(&mut self, now: Instant) -> Result<(), u64> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.policy.window {
            return Ok(());
        }

        let rate = self.window_bytes as f64 / elapsed.as_secs_f64();
        if rate < self.policy.min_bytes_per_sec as f64 {
            return Err(self.window_bytes);
        }

        self.window_start = now;
        self.window_bytes = 0;
        Ok(())
    }
}

/// Builds the HTTP client for one engine instance
///
/// # Arguments
///
/// * `config` - The engine configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(SwarmError::Setup)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use swarmfetch::config::EngineConfig;
/// use swarmfetch::crawler::build_http_client;
///
/// let client = build_http_client(&EngineConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &EngineConfig) -> Result<Client, SwarmError> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| SwarmError::Setup(format!("Failed to build HTTP client: {}", e)))
}

/// In-flight state of one transfer
struct Transfer {
    id: u64,
    url: String,
    effective_url: String,
    body: Vec<u8>,
    last_error: Option<TransferError>,
}

impl Transfer {
    fn new(id: u64, url: String) -> Self {
        Self {
            id,
            effective_url: url.clone(),
            url,
            body: Vec::new(),
            last_error: None,
        }
    }

    fn fail(mut self, error: TransferError) -> Completion {
        self.last_error = Some(error);
        self.finish(None)
    }

    fn finish(self, status: Option<u16>) -> Completion {
        let outcome = match (self.last_error, status) {
            (Some(error), _) => Err(error),
            (None, Some(code)) => Ok(code),
            (None, None) => Err(TransferError::Request {
                url: self.url.clone(),
                message: "no response".to_string(),
            }),
        };

        Completion {
            id: self.id,
            url: self.url,
            effective_url: self.effective_url,
            outcome,
            body: self.body,
        }
    }
}

/// Performs one GET from start to finish
///
/// Never fails: every error is folded into the returned completion.
///
/// # Arguments
///
/// * `client` - The engine's HTTP client
/// * `id` - Identifier assigned at submission
/// * `url` - Absolute URL to fetch
/// * `policy` - Stall guard settings
pub async fn fetch_url(client: Client, id: u64, url: String, policy: StallPolicy) -> Completion {
    let mut transfer = Transfer::new(id, url);
    let mut guard = StallGuard::new(policy, Instant::now());

    let send = client.get(transfer.url.as_str()).send();
    tokio::pin!(send);

    // Wait for headers, re-arming the guard while the floor is satisfied
    let response = loop {
        match timeout_at(guard.deadline(), &mut send).await {
            Ok(Ok(response)) => break response,
            Ok(Err(e)) => {
                let error = classify_error(&transfer.url, &e);
                return transfer.fail(error);
            }
            Err(_) => {
                if let Err(bytes) = guard.check(Instant::now()) {
                    let error = stalled(&transfer.url, bytes, policy);
                    return transfer.fail(error);
                }
            }
        }
    };

    let status = response.status().as_u16();
    transfer.effective_url = response.url().to_string();
    let mut response = response;

    loop {
        match timeout_at(guard.deadline(), response.chunk()).await {
            Ok(Ok(Some(chunk))) => {
                transfer.body.extend_from_slice(&chunk);
                if let Err(bytes) = guard.record(chunk.len(), Instant::now()) {
                    let error = stalled(&transfer.url, bytes, policy);
                    return transfer.fail(error);
                }
            }
            Ok(Ok(None)) => break,
            Ok(Err(e)) => {
                let error = TransferError::Body {
                    url: transfer.url.clone(),
                    message: e.to_string(),
                };
                return transfer.fail(error);
            }
            Err(_) => {
                if let Err(bytes) = guard.check(Instant::now()) {
                    let error = stalled(&transfer.url, bytes, policy);
                    return transfer.fail(error);
                }
            }
        }
    }

    transfer.finish(Some(status))
}

fn stalled(url: &str, bytes: u64, policy: StallPolicy) -> TransferError {
    TransferError::Stalled {
        url: url.to_string(),
        bytes,
        seconds: policy.window.as_secs(),
    }
}

/// Maps a reqwest error onto the transfer error taxonomy
fn classify_error(url: &str, e: &reqwest::Error) -> TransferError {
    if e.is_redirect() {
        TransferError::RedirectLimit {
            url: url.to_string(),
        }
    } else if e.is_timeout() {
        TransferError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        TransferError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else if e.is_body() || e.is_decode() {
        TransferError::Body {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        TransferError::Request {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
