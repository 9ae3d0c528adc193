use crate::url::parse_absolute;
use crate::{ConfigError, SwarmError};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;

/// Fixed, shared, read-only list of URLs cycled by load workers
#[derive(Debug, Clone)]
pub struct UrlRing {
    urls: Arc<[String]>,
}

impl UrlRing {
    /// Builds a ring from already-validated URLs
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingSeed` if `urls` is empty.
    pub fn new(urls: Vec<String>) -> Result<Self, ConfigError> {
        if urls.is_empty() {
            return Err(ConfigError::MissingSeed(
                "no URLs to process".to_string(),
            ));
        }
        Ok(Self { urls: urls.into() })
    }

    /// Parses one URL per line
    ///
    /// Blank lines and lines starting with `#` are ignored. Lines that are not
    /// absolute http(s) URLs are skipped with a warning.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut urls = Vec::new();

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_absolute(line) {
                Ok(url) => urls.push(url.to_string()),
                Err(e) => tracing::warn!("Skipping line {}: {}", lineno + 1, e),
            }
        }

        Self::new(urls)
    }

    /// Reads the ring from a file
    pub fn from_file(path: &Path) -> Result<Self, SwarmError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SwarmError::Setup(format!("Failed to read URL file {}: {}", path.display(), e))
        })?;
        let ring = Self::parse(&content)?;
        tracing::info!("Loaded {} URLs from {}", ring.len(), path.display());
        Ok(ring)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Always false; an empty ring cannot be built
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn get(&self, index: usize) -> &str {
        &self.urls[index % self.urls.len()]
    }

    /// Cursor starting at `start` (taken modulo the ring length)
    pub fn cursor(&self, start: usize) -> RingCursor {
        RingCursor {
            ring: self.clone(),
            position: start % self.urls.len(),
        }
    }

    /// Cursor starting at a uniformly random offset
    pub fn random_cursor(&self) -> RingCursor {
        let start = rand::thread_rng().gen_range(0..self.urls.len());
        self.cursor(start)
    }
}

/// One worker's position in the ring
#[derive(Debug, Clone)]
pub struct RingCursor {
    ring: UrlRing,
    position: usize,
}

impl RingCursor {
    /// Returns the URL at the cursor and advances it, wrapping at the end
    pub fn next_url(&mut self) -> &str {
        let index = self.position;
        self.position = (self.position + 1) % self.ring.len();
        self.ring.get(index)
    }

    pub fn position(&self) -> usize {
        self.position
    }
}
