//! File-based configuration source (JSON / YAML)
//!
//! The document is read once and flattened: nested objects become
//! `Parent:Child` keys, array items become `Parent:0`, `Parent:1`, ...

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::entries::Entries;
use super::traits::{ConfigError, ConfigResult, ConfigSource, KEY_DELIMITER};

/// Settings document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(FileFormat::Json),
            "yaml" | "yml" => Some(FileFormat::Yaml),
            _ => None,
        }
    }
}

/// Configuration source backed by a settings document
///
/// # Example
///
/// ```no_run
/// use tenantdb_core::config::{ConfigSource, FileConfigSource};
///
/// let settings = FileConfigSource::load("appsettings.json").unwrap();
/// let template = settings.get("ConnectionString");
/// ```
pub struct FileConfigSource {
    path: Option<PathBuf>,
    entries: Entries,
}

impl FileConfigSource {
    /// Load and flatten a settings file, format picked from its extension
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path)?;

        let mut source = Self::from_content(&content, format)?;
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    /// Parse a settings document held in memory
    pub fn from_content(content: &str, format: FileFormat) -> ConfigResult<Self> {
        let root: Value = match format {
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Yaml if content.trim().is_empty() => Value::Null,
            FileFormat::Yaml => serde_yaml::from_str(content)?,
        };

        let mut entries = Entries::new();
        flatten(None, &root, &mut entries);
        Ok(Self { path: None, entries })
    }

    /// Path the document was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of leaf values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn flatten(prefix: Option<&str>, value: &Value, entries: &mut Entries) {
    let join = |segment: &str| match prefix {
        Some(p) => format!("{p}{KEY_DELIMITER}{segment}"),
        None => segment.to_string(),
    };

    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten(Some(&join(k)), v, entries);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(Some(&join(&i.to_string())), v, entries);
            }
        }
        scalar => {
            // A bare scalar document has no key to live under
            let Some(key) = prefix else { return };
            let text = match scalar {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            entries.insert(key, text);
        }
    }
}

impl std::fmt::Debug for FileConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigSource")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ConfigSource for FileConfigSource {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(str::to_string)
    }

    fn section(&self, path: &str) -> BTreeMap<String, String> {
        self.entries.section(path)
    }
}
