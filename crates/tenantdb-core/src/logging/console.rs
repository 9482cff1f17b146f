//! Console logger implementation

use super::level::LogLevel;
use super::traits::Logger;
use crate::keys::{defaults, settings};
use crate::resolver::ConfigValueResolver;

/// Writes log lines at or above a minimum level to stderr
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tenantdb_core::config::MemoryConfigSource;
/// use tenantdb_core::logging::{ConsoleLogger, LogLevel};
/// use tenantdb_core::resolver::ConfigValueResolver;
///
/// let config = MemoryConfigSource::with_values([("AppSetting:TenantDbLogLevel", "debug")]);
/// let values = ConfigValueResolver::new(Arc::new(config));
///
/// let logger = ConsoleLogger::from_settings(&values);
/// assert_eq!(logger.min_level(), LogLevel::Debug);
/// let _values = values.with_logger(Arc::new(logger));
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// `[tenantdb]` prefix, warnings and errors only
    pub fn new() -> Self {
        Self {
            prefix: "[tenantdb]".to_string(),
            min_level: defaults::LOG_LEVEL,
        }
    }

    /// Level taken from the `TenantDbLogLevel` setting
    pub fn from_settings(values: &ConfigValueResolver) -> Self {
        let level = values.parse_or(settings::LOG_LEVEL, defaults::LOG_LEVEL);
        Self::new().with_min_level(level)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// The line written for `message`, `None` when filtered out
    fn line(&self, level: LogLevel, message: &str) -> Option<String> {
        (level >= self.min_level).then(|| format!("{} {}: {}", self.prefix, level, message))
    }

    fn write(&self, level: LogLevel, message: &str) {
        if let Some(line) = self.line(level, message) {
            eprintln!("{line}");
        }
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}
