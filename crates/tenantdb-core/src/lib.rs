//! tenantdb core
//!
//! Per-request database target resolution for multi-tenant services.
//! Runtime agnostic: no async runtime, no ORM, no network. Hosts plug in
//! their configuration, environment, request headers and logger.
//!
//! ## Resolving a connection
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use tenantdb_core::config::MemoryConfigSource;
//! use tenantdb_core::env::MemoryEnvironment;
//! use tenantdb_core::{ConfigValueResolver, DbProvider, DescriptorFactory, ProviderOptions};
//!
//! let config = MemoryConfigSource::with_values([
//!     ("ConnectionString", "Server=%server%;Database=%db%"),
//!     ("AppSettings:DbProviderMappings:tenant7", "postgresql"),
//! ]);
//! let values = ConfigValueResolver::new(Arc::new(config))
//!     .with_environment(Arc::new(MemoryEnvironment::new()));
//! let factory = DescriptorFactory::new(values);
//!
//! let headers: HashMap<String, String> = [
//!     ("cx-db".to_string(), "tenant7".to_string()),
//!     ("cx-db-server".to_string(), "pg07".to_string()),
//! ]
//! .into();
//! let descriptor = factory.descriptor(Some(&headers));
//!
//! assert_eq!(descriptor.provider, DbProvider::PostgreSql);
//! assert_eq!(descriptor.connection_string, "Server=pg07;Database=tenant7");
//!
//! let options = ProviderOptions::from_descriptor(&descriptor, factory.migrations_enabled());
//! assert_eq!(options.command_timeout_seconds, 300);
//! ```

pub mod config;
pub mod connection;
pub mod env;
pub mod keys;
pub mod logging;
pub mod options;
pub mod resolver;

// Re-export commonly used types
pub use config::{
    ChainConfigSource, ConfigError, ConfigResult, ConfigSource, EnvConfigSource,
    FileConfigSource, FileFormat, MemoryConfigSource,
};

pub use connection::{
    ConnectionResolver, DbProvider, ProviderMappings, RequestHeaders, ResolvedConnection,
    TenantOverride,
};

pub use env::{Environment, MemoryEnvironment, ProcessEnvironment};

pub use logging::{ConsoleLogger, LogLevel, Logger, NoOpLogger, SharedLogger};

pub use options::{sql_connection_string, ConnectionDescriptor, DescriptorFactory, ProviderOptions};

pub use resolver::{ConfigValueResolver, ValueCache};
