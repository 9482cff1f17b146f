//! Configuration source trait

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Separator between the segments of a hierarchical key
pub const KEY_DELIMITER: &str = ":";

/// A hierarchical key/value configuration store
///
/// Keys are `:`-separated paths (`AppSettings:DbProviderMappings:tenant7`)
/// and are matched ASCII case-insensitively. Sources are read-only once
/// built.
///
/// Implementations:
/// - `MemoryConfigSource`: In-memory map
/// - `FileConfigSource`: JSON or YAML settings document
/// - `EnvConfigSource`: Environment variables
/// - `ChainConfigSource`: First hit across several sources
pub trait ConfigSource: Send + Sync {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Immediate children of `path` that carry a value, keyed by the child
    /// segment as it was written
    fn section(&self, path: &str) -> BTreeMap<String, String>;
}

/// Errors that can occur while loading a configuration source
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported settings file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
