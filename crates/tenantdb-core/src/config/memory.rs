//! In-memory configuration source

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::entries::Entries;
use super::traits::ConfigSource;

/// In-memory configuration source
///
/// Handy in tests and for hosts that materialize their configuration
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryConfigSource {
    entries: RwLock<Entries>,
}

impl MemoryConfigSource {
    /// Create a new empty memory source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory source with initial values
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(values.into_iter().collect()),
        }
    }

    /// Set a single value
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigSource for MemoryConfigSource {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).map(str::to_string)
    }

    fn section(&self, path: &str) -> BTreeMap<String, String> {
        self.entries.read().section(path)
    }
}
