//! State module for tracking run progress
//!
//! # Components
//!
//! - `VisitedEntry` / `VisitedIndex`: the per-run dedup index keyed by canonical URL
//! - `TransferStatus`: classification of a finished transfer

mod transfer_status;
mod visited;

// Re-export main types
pub use transfer_status::TransferStatus;
pub use visited::{VisitedEntry, VisitedIndex};
