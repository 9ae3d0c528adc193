/// Transfer outcome classification
///
/// Every completion is reduced to one of these for logging and for the
/// end-of-run report.
use crate::TransferError;
use std::fmt;

/// How a single transfer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    // ===== Success =====
    /// Response received with a status in 200..=299
    Succeeded,

    // ===== HTTP-level failure =====
    /// Response received with any other status code
    HttpFailure,

    // ===== Transport-level failures =====
    /// Connection could not be established (DNS, refused, TLS)
    Unreachable,

    /// Connect or request timeout
    TimedOut,

    /// Throughput stayed below the stall limit for the whole window
    Stalled,

    /// Redirect chain longer than the configured bound
    RedirectLimit,

    /// Any other failure while sending or reading the body
    Failed,
}

impl TransferStatus {
    /// Classifies a completion outcome
    ///
    /// # Arguments
    ///
    /// * `outcome` - HTTP status code on receipt, or the transfer error
    pub fn from_outcome(outcome: &Result<u16, TransferError>) -> Self {
        match outcome {
            Ok(code) if (200..=299).contains(code) => Self::Succeeded,
            Ok(_) => Self::HttpFailure,
            Err(TransferError::Connect { .. }) => Self::Unreachable,
            Err(TransferError::Timeout { .. }) => Self::TimedOut,
            Err(TransferError::Stalled { .. }) => Self::Stalled,
            Err(TransferError::RedirectLimit { .. }) => Self::RedirectLimit,
            Err(TransferError::Body { .. }) | Err(TransferError::Request { .. }) => Self::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if the URL should be marked dead
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::HttpFailure => "http_failure",
            Self::Unreachable => "unreachable",
            Self::TimedOut => "timed_out",
            Self::Stalled => "stalled",
            Self::RedirectLimit => "redirect_limit",
            Self::Failed => "failed",
        }
    }

    /// Returns all statuses in report order
    pub fn all_statuses() -> [Self; 7] {
        [
            Self::Succeeded,
            Self::HttpFailure,
            Self::Unreachable,
            Self::TimedOut,
            Self::Stalled,
            Self::RedirectLimit,
            Self::Failed,
        ]
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
