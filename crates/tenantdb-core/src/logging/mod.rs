//! Logging abstractions for runtime-agnostic logging
//!
//! Resolution never requires a logger. Every component that reports
//! something takes an optional [`SharedLogger`] and falls back to
//! [`NoOpLogger`].

mod console;
mod level;
mod traits;

use std::sync::Arc;

use once_cell::sync::Lazy;

pub use console::ConsoleLogger;
pub use level::{LogLevel, UnknownLogLevel};
pub use traits::{Logger, LoggerExt, SharedLogger};

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

static NOOP: Lazy<SharedLogger> = Lazy::new(|| Arc::new(NoOpLogger));

/// The logger used when the caller didn't inject one
pub fn noop() -> SharedLogger {
    Arc::clone(&NOOP)
}
