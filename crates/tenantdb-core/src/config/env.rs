//! Environment-variable configuration source

use std::collections::BTreeMap;
use std::sync::Arc;

use super::entries::Entries;
use super::traits::{ConfigSource, KEY_DELIMITER};
use crate::env::{Environment, ProcessEnvironment};

/// Separator used in variable names where keys use `:`
const ENV_DELIMITER: &str = "__";

/// Exposes environment variables as configuration
///
/// `AppSetting__EfUseLazyLoading` is visible as `AppSetting:EfUseLazyLoading`.
/// With a prefix, only variables starting with it are visible, and the prefix
/// is stripped.
///
/// Variables are read on every lookup, not snapshotted.
pub struct EnvConfigSource {
    env: Arc<dyn Environment>,
    prefix: String,
}

impl EnvConfigSource {
    /// All variables of the running process
    pub fn new() -> Self {
        Self::with_environment(Arc::new(ProcessEnvironment::new()))
    }

    pub fn with_environment(env: Arc<dyn Environment>) -> Self {
        Self {
            env,
            prefix: String::new(),
        }
    }

    /// Only variables named `{prefix}...`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn snapshot(&self) -> Entries {
        self.env
            .vars()
            .into_iter()
            .filter_map(|(name, value)| {
                let key = strip_prefix_ignore_case(&name, &self.prefix)?;
                Some((key.replace(ENV_DELIMITER, KEY_DELIMITER), value))
            })
            .collect()
    }
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &name[prefix.len()..])
}

impl Default for EnvConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EnvConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfigSource")
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl ConfigSource for EnvConfigSource {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        let name = format!("{}{}", self.prefix, key.replace(KEY_DELIMITER, ENV_DELIMITER));
        if let Some(value) = self.env.var(&name) {
            return Some(value);
        }
        // Variable names are case-sensitive on most platforms, keys aren't
        self.snapshot().get(key).map(str::to_string)
    }

    fn section(&self, path: &str) -> BTreeMap<String, String> {
        self.snapshot().section(path)
    }
}
