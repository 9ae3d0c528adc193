//! Output sink traits and errors
//!
//! This module defines the trait interface for recording visited URLs.

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for one line per successfully visited URL
///
/// Lines from one engine are recorded in the order its transfers complete.
pub trait VisitSink {
    /// Records a successfully visited URL
    ///
    /// # Arguments
    ///
    /// * `url` - The canonical URL that was fetched
    fn record_visit(&mut self, url: &str) -> OutputResult<()>;

    /// Pushes buffered lines to the underlying writer
    fn flush(&mut self) -> OutputResult<()>;
}

impl VisitSink for Vec<String> {
    fn record_visit(&mut self, url: &str) -> OutputResult<()> {
        self.push(url.to_string());
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

impl<S: VisitSink + ?Sized> VisitSink for &mut S {
    fn record_visit(&mut self, url: &str) -> OutputResult<()> {
        (**self).record_visit(url)
    }

    fn flush(&mut self) -> OutputResult<()> {
        (**self).flush()
    }
}
