//! Resolved-value cache

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Where a lookup key was read from
///
/// Configuration keys and environment variable names live in separate
/// namespaces: `AppSetting__Timeout` as a configuration key says nothing
/// about the variable of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupOrigin {
    Config,
    Env,
}

/// Outcome of one lookup, as remembered by the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    /// The lookup produced this (already expanded) value
    Hit(String),
    /// The lookup produced nothing usable
    Miss,
}

#[derive(Debug, Default)]
struct Entries {
    config: HashMap<String, CachedValue>,
    env: HashMap<String, CachedValue>,
}

impl Entries {
    fn for_origin(&self, origin: LookupOrigin) -> &HashMap<String, CachedValue> {
        match origin {
            LookupOrigin::Config => &self.config,
            LookupOrigin::Env => &self.env,
        }
    }

    fn for_origin_mut(&mut self, origin: LookupOrigin) -> &mut HashMap<String, CachedValue> {
        match origin {
            LookupOrigin::Config => &mut self.config,
            LookupOrigin::Env => &mut self.env,
        }
    }
}

/// Memo of lookups keyed by origin and exact lookup key
///
/// One instance is meant to live as long as the process and to be shared by
/// every resolver built over the same configuration. Entries are never
/// evicted: configuration is read-only after start.
///
/// Concurrent first writes of the same key may race. The last one wins,
/// which is harmless because every writer computed the same value.
#[derive(Debug, Default)]
pub struct ValueCache {
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for `key`, counting the access
    pub fn get(&self, origin: LookupOrigin, key: &str) -> Option<CachedValue> {
        let found = self.entries.read().for_origin(origin).get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&self, origin: LookupOrigin, key: impl Into<String>, value: CachedValue) {
        self.entries
            .write()
            .for_origin_mut(origin)
            .insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read();
        entries.config.len() + entries.env.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `get` calls answered from the cache
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of `get` calls that found nothing
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
