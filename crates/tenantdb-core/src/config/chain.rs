//! Chained configuration source with fallback behavior

use std::collections::BTreeMap;
use std::sync::Arc;

use super::traits::ConfigSource;

/// A source that chains several sources together
///
/// Lookups try each source in order and return the first match, so the
/// highest-priority source goes first.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tenantdb_core::config::{ChainConfigSource, ConfigSource, MemoryConfigSource};
///
/// let overrides: Arc<dyn ConfigSource> =
///     Arc::new(MemoryConfigSource::with_values([("ConnectionString", "Database=a")]));
/// let defaults: Arc<dyn ConfigSource> =
///     Arc::new(MemoryConfigSource::with_values([("ConnectionString", "Database=b")]));
///
/// let chain = ChainConfigSource::new(vec![overrides, defaults]);
/// assert_eq!(chain.get("ConnectionString").as_deref(), Some("Database=a"));
/// ```
pub struct ChainConfigSource {
    sources: Vec<Arc<dyn ConfigSource>>,
}

impl ChainConfigSource {
    /// Create a chain, sources tried in order
    pub fn new(sources: Vec<Arc<dyn ConfigSource>>) -> Self {
        Self { sources }
    }

    /// Append a lower-priority source
    pub fn push(&mut self, source: Arc<dyn ConfigSource>) {
        self.sources.push(source);
    }

    /// The source that would answer for `key`
    pub fn find_source(&self, key: &str) -> Option<&Arc<dyn ConfigSource>> {
        self.sources.iter().find(|s| s.get(key).is_some())
    }
}

impl ConfigSource for ChainConfigSource {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.sources.iter().find_map(|s| s.get(key))
    }

    fn section(&self, path: &str) -> BTreeMap<String, String> {
        let mut merged = BTreeMap::new();
        // Lowest priority first so earlier sources overwrite
        for source in self.sources.iter().rev() {
            merged.extend(source.section(path));
        }
        merged
    }
}

impl std::fmt::Debug for ChainConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfigSource")
            .field("sources", &format!("[{} sources]", self.sources.len()))
            .finish()
    }
}
