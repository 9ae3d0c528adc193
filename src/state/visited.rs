use std::collections::hash_map::{Entry, HashMap};

/// Per-URL record kept for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitedEntry {
    /// The fetch failed or the URL was rejected
    pub dead: bool,

    /// How many times the URL was discovered, counting the first
    pub discovery_count: u32,
}

impl VisitedEntry {
    /// Creates the entry written on first admission
    pub fn new() -> Self {
        Self {
            dead: false,
            discovery_count: 1,
        }
    }
}

impl Default for VisitedEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// Exact-key index from canonical URL to its [`VisitedEntry`]
///
/// Keys are compared byte for byte, so callers must canonicalize first.
#[derive(Debug, Default)]
pub struct VisitedIndex {
    entries: HashMap<String, VisitedEntry>,
}

impl VisitedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry for a key that is not present yet
    ///
    /// # Returns
    ///
    /// * `true` - The entry was inserted
    /// * `false` - The key already exists; the stored entry is untouched
    pub fn insert(&mut self, url: &str, entry: VisitedEntry) -> bool {
        match self.entries.entry(url.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&VisitedEntry> {
        self.entries.get(url)
    }

    pub fn get_mut(&mut self, url: &str) -> Option<&mut VisitedEntry> {
        self.entries.get_mut(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries marked dead
    pub fn dead_count(&self) -> usize {
        self.entries.values().filter(|e| e.dead).count()
    }
}
