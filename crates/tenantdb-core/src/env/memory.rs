//! In-memory environment

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::Environment;

/// Environment backed by a map, for tests and sandboxed hosts
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    vars: RwLock<HashMap<String, String>>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment with initial variables
    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: RwLock::new(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) {
        self.vars.write().remove(name);
    }
}

impl Environment for MemoryEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.read().get(name).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
