//! Case-insensitive key storage shared by the map-backed sources

use std::collections::{BTreeMap, HashMap};

use super::traits::KEY_DELIMITER;

#[derive(Debug, Clone, Default)]
pub(crate) struct Entries {
    // lowercased key -> (key as written, value)
    map: HashMap<String, (String, String)>,
}

impl Entries {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.map.insert(key.to_ascii_lowercase(), (key, value.into()));
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(&key.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    pub(crate) fn section(&self, path: &str) -> BTreeMap<String, String> {
        let prefix = format!("{}{}", path.to_ascii_lowercase(), KEY_DELIMITER);
        self.map
            .iter()
            .filter_map(|(lower, (key, value))| {
                if !lower.starts_with(&prefix) {
                    return None;
                }
                let child = &key[prefix.len()..];
                if child.is_empty() || child.contains(KEY_DELIMITER) {
                    return None;
                }
                Some((child.to_string(), value.clone()))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Entries {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entries = Entries::new();
        for (k, v) in iter {
            entries.insert(k, v);
        }
        entries
    }
}
