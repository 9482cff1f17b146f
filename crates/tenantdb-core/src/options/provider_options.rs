//! Provider-specific tuning derived from a descriptor

use serde::Serialize;

use super::descriptor::ConnectionDescriptor;
use crate::connection::DbProvider;

/// Connection-string key for the SQL command timeout
pub const COMMAND_TIMEOUT_KEY: &str = "Command Timeout";

/// Connection-string key that makes SQL Server accept its own certificate
pub const TRUST_SERVER_CERTIFICATE: &str = "TrustServerCertificate";

/// Options an ORM layer applies when opening a context on a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOptions {
    pub provider: DbProvider,
    pub connection_string: String,
    pub command_timeout_seconds: u32,
    /// Only set for a positive retry count
    pub max_retry_count: Option<u32>,
    pub migrations_assembly_name: Option<String>,
}

impl ProviderOptions {
    pub fn from_descriptor(descriptor: &ConnectionDescriptor, migrations_enabled: bool) -> Self {
        let connection_string = match descriptor.provider {
            DbProvider::MsSql => with_trusted_certificate(&descriptor.connection_string),
            DbProvider::PostgreSql => descriptor.connection_string.clone(),
        };

        let migrations_assembly_name = descriptor
            .migrations_assembly_name
            .clone()
            .filter(|name| migrations_enabled && !name.trim().is_empty());

        Self {
            provider: descriptor.provider,
            connection_string,
            command_timeout_seconds: descriptor.command_timeout_seconds,
            max_retry_count: (descriptor.max_retry_count > 0).then_some(descriptor.max_retry_count),
            migrations_assembly_name,
        }
    }

    pub fn retry_on_failure(&self) -> bool {
        self.max_retry_count.is_some()
    }
}

/// The descriptor's connection string for opening a raw SQL connection
///
/// Adds `Command Timeout` unless the string already sets one.
pub fn sql_connection_string(descriptor: &ConnectionDescriptor) -> String {
    let connection_string = &descriptor.connection_string;
    if contains_ignore_ascii_case(connection_string, COMMAND_TIMEOUT_KEY) {
        return connection_string.clone();
    }
    format!(
        "{connection_string};{COMMAND_TIMEOUT_KEY} = {}",
        descriptor.command_timeout_seconds
    )
}

fn with_trusted_certificate(connection_string: &str) -> String {
    if contains_ignore_ascii_case(connection_string, TRUST_SERVER_CERTIFICATE) {
        return connection_string.to_string();
    }
    if connection_string.is_empty() || connection_string.ends_with(';') {
        format!("{connection_string}{TRUST_SERVER_CERTIFICATE}=True")
    } else {
        format!("{connection_string};{TRUST_SERVER_CERTIFICATE}=True")
    }
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
