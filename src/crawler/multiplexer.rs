//! Bounded-concurrency transfer engine
//!
//! A [`Multiplexer`] owns every in-flight transfer of one engine instance as a
//! set of futures polled from the task that drives it. Nothing here spawns:
//! progress only happens while the owner awaits [`Multiplexer::next_completion`].

use crate::config::EngineConfig;
use crate::crawler::fetcher::{build_http_client, fetch_url, Completion, StallPolicy};
use crate::url::parse_absolute;
use crate::SwarmError;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;

/// Receipt for a submitted transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferHandle(u64);

impl TransferHandle {
    pub(crate) fn from_id(id: u64) -> Self {
        Self(id)
    }

    /// Identifier carried by the matching [`Completion`]
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What the frontier needs from an engine to hand it work
pub trait Admission {
    /// Number of transfers currently in flight
    fn in_flight(&self) -> usize;

    /// Upper bound on `in_flight`
    fn max_concurrent(&self) -> usize;

    /// Starts a transfer for `url`
    fn admit(&mut self, url: &str) -> Result<TransferHandle, SwarmError>;

    fn has_capacity(&self) -> bool {
        self.in_flight() < self.max_concurrent()
    }
}

/// One engine instance's set of concurrent transfers
pub struct Multiplexer {
    client: Client,
    max_concurrent: usize,
    stall: StallPolicy,
    next_id: u64,
    pending: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl Multiplexer {
    /// Creates an engine with its own HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(Multiplexer)` - Ready to accept transfers
    /// * `Err(SwarmError::Setup)` - The HTTP client could not be built
    pub fn new(config: &EngineConfig) -> Result<Self, SwarmError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates an engine around an existing client
    pub fn with_client(client: Client, config: &EngineConfig) -> Self {
        Self {
            client,
            max_concurrent: config.max_concurrent,
            stall: StallPolicy::from_config(config),
            next_id: 0,
            pending: FuturesUnordered::new(),
        }
    }

    /// Submits a GET for `url`
    ///
    /// # Errors
    ///
    /// * `SwarmError::InvalidUrl` - `url` is empty or not an absolute http(s) URL
    /// * `SwarmError::Saturated` - `max_concurrent` transfers are already in flight
    pub fn submit(&mut self, url: &str) -> Result<TransferHandle, SwarmError> {
        let parsed = parse_absolute(url)?;

        if self.pending.len() >= self.max_concurrent {
            return Err(SwarmError::Saturated {
                max: self.max_concurrent,
            });
        }

        let id = self.next_id;
        self.next_id += 1;

        tracing::trace!("Submitting transfer {} for {}", id, parsed);
        let fut = fetch_url(self.client.clone(), id, parsed.to_string(), self.stall);
        self.pending.push(fut.boxed());

        Ok(TransferHandle::from_id(id))
    }

    /// Waits for the next transfer to finish
    ///
    /// Completions arrive in the order transfers finish, not the order they
    /// were submitted. Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.pending.is_empty() {
            return None;
        }
        self.pending.next().await
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Total number of transfers ever submitted
    pub fn submitted(&self) -> u64 {
        self.next_id
    }
}

impl Admission for Multiplexer {
    fn in_flight(&self) -> usize {
        Multiplexer::in_flight(self)
    }

    fn max_concurrent(&self) -> usize {
        Multiplexer::max_concurrent(self)
    }

    fn admit(&mut self, url: &str) -> Result<TransferHandle, SwarmError> {
        self.submit(url)
    }
}
