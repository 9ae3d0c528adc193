use crate::ConfigError;
use regex::Regex;

/// Ordered list of compiled exclusion patterns
///
/// Patterns are tried in the order they were configured and evaluation stops
/// at the first match, so the pattern reported for an exclusion is always the
/// earliest one that applies.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Regex>,
}

impl ExcludeSet {
    /// Compiles the patterns, failing on the first malformed one
    ///
    /// # Returns
    ///
    /// * `Ok(ExcludeSet)` - All patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - A pattern is not a valid regex
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|e| ConfigError::InvalidPattern {
                    pattern: p.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns the index of the first pattern that matches `url`
    pub fn first_match(&self, url: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.is_match(url))
    }

    /// Checks whether `url` is excluded, logging the pattern that hit
    pub fn is_excluded(&self, url: &str) -> bool {
        match self.first_match(url) {
            Some(idx) => {
                tracing::debug!(
                    "Excluded {} (pattern #{} '{}')",
                    url,
                    idx,
                    self.patterns[idx].as_str()
                );
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Checks `url` against an ordered list of patterns with first-match semantics
pub fn is_excluded(url: &str, exclude_patterns: &ExcludeSet) -> bool {
    exclude_patterns.is_excluded(url)
}
