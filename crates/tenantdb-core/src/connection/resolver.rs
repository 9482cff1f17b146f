//! Connection resolution: template lookup, tenant substitution, provider

use crate::keys::{
    CONNECTION_STRING_KEY, DB_PLACEHOLDER, DEFAULT_CONNECTION_STRING_NAME, DEFAULT_SETTING_NAME,
    SERVER_PLACEHOLDER,
};
use crate::logging::SharedLogger;
use crate::resolver::ConfigValueResolver;

use super::connection_string::database_name;
use super::headers::{RequestHeaders, TenantOverride};
use super::provider::{DbProvider, ProviderMappings};

/// Outcome of resolving the connection for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    pub provider: DbProvider,
    pub connection_string: String,
    /// Database the connection string points at, when it could be told
    pub database_name: Option<String>,
}

/// Rewrites `template` for a tenant
///
/// Returns the rewritten string and the database it now points at.
///
/// The database override first replaces `%db%`, then every occurrence of the
/// template's current database name. This is plain substring replacement: a
/// current name that also appears elsewhere in the template (a server name, a
/// user name) is replaced there too.
pub fn apply_overrides(
    template: &str,
    tenant: &TenantOverride,
    logger: &SharedLogger,
) -> (String, Option<String>) {
    let mut connection_string = template.to_string();
    let mut current = database_name(template, logger);

    if let Some(db_name) = &tenant.db_name {
        connection_string = connection_string.replace(DB_PLACEHOLDER, db_name);
        let old = current.as_deref().filter(|n| !n.trim().is_empty());
        if let Some(old) = old {
            connection_string = connection_string.replace(old, db_name);
        }
        crate::log_debug!(logger, "Tenant database override applied: {}", db_name);
        current = Some(db_name.clone());
    }

    if let Some(server) = &tenant.db_server_name {
        connection_string = connection_string.replace(SERVER_PLACEHOLDER, server);
        crate::log_debug!(logger, "Tenant server override applied: {}", server);
    }

    (connection_string, current)
}

/// Resolves the connection string and provider for a request
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use tenantdb_core::config::MemoryConfigSource;
/// use tenantdb_core::connection::{ConnectionResolver, DbProvider};
/// use tenantdb_core::env::MemoryEnvironment;
/// use tenantdb_core::resolver::ConfigValueResolver;
///
/// let config =
///     MemoryConfigSource::with_values([("ConnectionString", "Database=%db%;Server=localhost")]);
/// let values = ConfigValueResolver::new(Arc::new(config))
///     .with_environment(Arc::new(MemoryEnvironment::new()));
/// let resolver = ConnectionResolver::new(values);
///
/// let headers: HashMap<String, String> =
///     [("cx-db".to_string(), "tenant7".to_string())].into();
/// let resolved = resolver.resolve(Some(&headers), None);
///
/// assert_eq!(resolved.connection_string, "Database=tenant7;Server=localhost");
/// assert_eq!(resolved.provider, DbProvider::MsSql);
/// ```
#[derive(Clone)]
pub struct ConnectionResolver {
    values: ConfigValueResolver,
    logger: SharedLogger,
    shape_inference: bool,
    named_tenant_connections: bool,
}

impl ConnectionResolver {
    /// Resolver reading through `values`, logging where `values` logs
    pub fn new(values: ConfigValueResolver) -> Self {
        let logger = values.logger().clone();
        Self {
            values,
            logger,
            shape_inference: false,
            named_tenant_connections: false,
        }
    }

    /// Log through `logger`, including the setting reads made on our behalf
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.values = self.values.with_logger(logger.clone());
        self.logger = logger;
        self
    }

    /// Fall back to [`DbProvider::sniff`] when the mapping table doesn't
    /// decide the provider
    pub fn with_shape_inference(mut self, enabled: bool) -> Self {
        self.shape_inference = enabled;
        self
    }

    /// Look for a dedicated `{name}-{tenant}` connection string before
    /// rewriting the shared template
    ///
    /// `{name}` is the connection-string setting name and `{tenant}` the
    /// lowercased tenant database name. When the setting exists it is used
    /// as written, apart from `%server%`.
    pub fn with_named_tenant_connections(mut self, enabled: bool) -> Self {
        self.named_tenant_connections = enabled;
        self
    }

    pub fn values(&self) -> &ConfigValueResolver {
        &self.values
    }

    /// Name of the setting holding the connection-string template
    pub fn connection_string_name(&self) -> String {
        self.values.resolve(
            CONNECTION_STRING_KEY,
            DEFAULT_SETTING_NAME,
            DEFAULT_CONNECTION_STRING_NAME,
        )
    }

    /// The connection-string template, before any tenant substitution
    pub fn template(&self) -> String {
        self.values.get(&self.connection_string_name())
    }

    /// Resolve for a request; `None` headers means no tenant override
    pub fn resolve(
        &self,
        headers: Option<&dyn RequestHeaders>,
        mappings: Option<&ProviderMappings>,
    ) -> ResolvedConnection {
        let tenant = headers
            .map(TenantOverride::from_headers)
            .unwrap_or_default();
        self.resolve_for(&tenant, mappings)
    }

    /// Resolve for an already extracted tenant override
    pub fn resolve_for(
        &self,
        tenant: &TenantOverride,
        mappings: Option<&ProviderMappings>,
    ) -> ResolvedConnection {
        let (connection_string, database_name) = match self.tenant_connection(tenant) {
            Some(named) => {
                let server_only = TenantOverride {
                    db_name: None,
                    db_server_name: tenant.db_server_name.clone(),
                };
                let (connection_string, current) =
                    apply_overrides(&named, &server_only, &self.logger);
                (connection_string, current.or_else(|| tenant.db_name.clone()))
            }
            None => apply_overrides(&self.template(), tenant, &self.logger),
        };

        let provider = self
            .mapped_provider(database_name.as_deref(), mappings)
            .or_else(|| {
                self.shape_inference
                    .then(|| DbProvider::sniff(&connection_string))
            })
            .unwrap_or_default();

        ResolvedConnection {
            provider,
            connection_string,
            database_name,
        }
    }

    /// The tenant's own connection string, when enabled and configured
    fn tenant_connection(&self, tenant: &TenantOverride) -> Option<String> {
        if !self.named_tenant_connections {
            return None;
        }
        let db_name = tenant.db_name.as_deref()?;
        let name = format!("{}-{}", self.connection_string_name(), db_name.to_lowercase());

        let connection_string = self.values.get(&name);
        if connection_string.trim().is_empty() {
            crate::log_debug!(self.logger, "No {} connection string, using the template", name);
            return None;
        }
        crate::log_debug!(self.logger, "Using tenant connection string {}", name);
        Some(connection_string)
    }

    fn mapped_provider(
        &self,
        database_name: Option<&str>,
        mappings: Option<&ProviderMappings>,
    ) -> Option<DbProvider> {
        let mappings = mappings.filter(|m| !m.is_empty())?;
        let database_name = database_name.filter(|n| !n.trim().is_empty())?;
        let name = mappings.get(database_name)?;

        match name.parse() {
            Ok(provider) => Some(provider),
            Err(e) => {
                crate::log_warn!(
                    self.logger,
                    "{} (database {}), using mssql",
                    e,
                    database_name
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for ConnectionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionResolver")
            .field("values", &self.values)
            .field("shape_inference", &self.shape_inference)
            .field("named_tenant_connections", &self.named_tenant_connections)
            .finish()
    }
}
