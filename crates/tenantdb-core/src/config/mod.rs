//! Configuration source abstractions
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigSource`: In-memory, for tests and embedding
//! - `FileConfigSource`: JSON/YAML settings documents, flattened to `a:b:c` keys
//! - `EnvConfigSource`: Environment variables with `__` as the path separator
//! - `ChainConfigSource`: Ordered fallback over other sources

mod chain;
mod entries;
mod env;
mod file;
mod memory;
mod traits;

pub use chain::ChainConfigSource;
pub use env::EnvConfigSource;
pub use file::{FileConfigSource, FileFormat};
pub use memory::MemoryConfigSource;
pub use traits::{ConfigError, ConfigResult, ConfigSource, KEY_DELIMITER};
