use crate::output::traits::{OutputError, OutputResult, VisitSink};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Buffered newline-terminated URL writer
pub struct LineSink<W: Write> {
    writer: BufWriter<W>,
    lines: u64,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            lines: 0,
        }
    }

    /// Number of lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

impl LineSink<File> {
    /// Creates (or truncates) the file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        tracing::debug!("Writing visited URLs to {}", path.display());
        Ok(Self::new(file))
    }
}

impl LineSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> VisitSink for LineSink<W> {
    fn record_visit(&mut self, url: &str) -> OutputResult<()> {
        writeln!(self.writer, "{}", url)?;
        self.lines += 1;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Cloneable handle to one sink shared by several workers
///
/// Each `record_visit` writes a whole line under the lock, so lines from
/// different workers interleave but never tear.
pub struct SharedLineSink {
    inner: Arc<Mutex<Box<dyn VisitSink + Send>>>,
}

impl SharedLineSink {
    pub fn new<S: VisitSink + Send + 'static>(sink: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(sink))),
        }
    }
}

impl Clone for SharedLineSink {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl VisitSink for SharedLineSink {
    fn record_visit(&mut self, url: &str) -> OutputResult<()> {
        let mut sink = self
            .inner
            .lock()
            .map_err(|_| OutputError::Write("visited sink lock poisoned".to_string()))?;
        sink.record_visit(url)
    }

    fn flush(&mut self) -> OutputResult<()> {
        let mut sink = self
            .inner
            .lock()
            .map_err(|_| OutputError::Write("visited sink lock poisoned".to_string()))?;
        sink.flush()
    }
}
