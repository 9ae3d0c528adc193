//! Crawl frontier: pending URL queue plus the visited index
//!
//! URLs are queued unconditionally and deduplicated only when they reach the
//! head of the queue, so the same URL may sit in the queue several times.
//! Each canonical URL is handed to the engine at most once per run, and index
//! entries are never removed.

use crate::crawler::multiplexer::Admission;
use crate::state::{VisitedEntry, VisitedIndex};
use crate::url::canonicalize;
use crate::SwarmError;
use std::collections::VecDeque;

/// Outcome of one [`Frontier::drain_admissible`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// URLs handed to the engine
    pub admitted: usize,

    /// URLs discarded because they were already in the index
    pub duplicates: usize,

    /// URLs the engine refused; their entries are marked dead
    pub rejected: usize,

    /// Queued strings that did not canonicalize to an absolute http(s) URL
    pub unparseable: usize,
}

/// Queue of discovered-but-unfetched URLs with at-most-once admission
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    visited: VisitedIndex,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL to the tail of the queue
    ///
    /// No deduplication happens here.
    pub fn enqueue(&mut self, url: impl Into<String>) {
        self.queue.push_back(url.into());
    }

    /// Moves queued URLs into the engine while it has free slots
    ///
    /// # Admission Rules
    ///
    /// For each URL popped from the head, keyed by its canonical form:
    /// 1. Not canonicalizable: dropped
    /// 2. Already indexed: bump its discovery count and discard it
    /// 3. New: submit it and index it (`dead = false`, one discovery)
    /// 4. Refused as invalid: index it as dead and keep draining
    ///
    /// If the engine reports saturation despite advertising capacity, the URL
    /// is put back at the head unindexed and draining stops.
    pub fn drain_admissible<A: Admission>(&mut self, engine: &mut A) -> DrainReport {
        let mut report = DrainReport::default();

        while engine.has_capacity() {
            let Some(raw) = self.queue.pop_front() else {
                break;
            };

            let Some(canonical) = canonicalize(&raw, &raw) else {
                tracing::debug!("Dropping unparseable queued URL '{}'", raw);
                report.unparseable += 1;
                continue;
            };
            let url = String::from(canonical);

            if let Some(entry) = self.visited.get_mut(&url) {
                entry.discovery_count += 1;
                report.duplicates += 1;
                tracing::debug!(
                    "Skipping duplicate {} (seen {} times)",
                    url,
                    entry.discovery_count
                );
                continue;
            }

            match engine.admit(&url) {
                Ok(handle) => {
                    tracing::trace!("Admitted {} as transfer {}", url, handle.id());
                    self.visited.insert(&url, VisitedEntry::new());
                    report.admitted += 1;
                }
                Err(SwarmError::Saturated { max }) => {
                    tracing::debug!("Engine saturated at {} transfers, deferring {}", max, url);
                    self.queue.push_front(url);
                    break;
                }
                Err(e) => {
                    tracing::warn!("Rejected {}: {}", url, e);
                    let entry = VisitedEntry {
                        dead: true,
                        ..VisitedEntry::new()
                    };
                    self.visited.insert(&url, entry);
                    report.rejected += 1;
                }
            }
        }

        report
    }

    /// Marks an indexed URL as dead
    ///
    /// Returns whether the URL was in the index.
    pub fn mark_dead(&mut self, url: &str) -> bool {
        match self.visited.get_mut(url) {
            Some(entry) => {
                entry.dead = true;
                true
            }
            None => false,
        }
    }

    /// Number of queued URLs, duplicates included
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited(&self) -> &VisitedIndex {
        &self.visited
    }
}
