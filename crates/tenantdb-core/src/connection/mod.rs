//! Per-request connection resolution
//!
//! One connection-string template in configuration serves every tenant:
//! request headers name the tenant database (and optionally server), and the
//! template is rewritten by substitution before the provider is picked.

mod connection_string;
mod headers;
mod provider;
mod resolver;

pub use connection_string::{
    database_name, mongo_database_name, ConnectionStringError, ConnectionStringParts,
    ConnectionStringResult,
};
pub use headers::{RequestHeaders, TenantOverride};
pub use provider::{DbProvider, ProviderMappings, UnknownProvider};
pub use resolver::{apply_overrides, ConnectionResolver, ResolvedConnection};
