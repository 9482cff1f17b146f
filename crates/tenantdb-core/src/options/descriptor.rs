//! Per-request connection descriptors

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::connection::{ConnectionResolver, DbProvider, ProviderMappings, RequestHeaders};
use crate::keys::{defaults, settings, PROVIDER_MAPPINGS_SECTION};
use crate::logging::SharedLogger;
use crate::resolver::ConfigValueResolver;

/// Everything an ORM layer needs to build a context for one request
///
/// Built fresh per request and never changed afterwards; resolve again to
/// pick up a different tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    pub provider: DbProvider,
    pub connection_string: String,
    pub command_timeout_seconds: u32,
    pub max_retry_count: u32,
    pub migrations_assembly_name: Option<String>,
    pub use_lazy_loading: bool,
    pub use_change_tracking_proxies: bool,
    pub tracking_behavior_disabled: bool,
}

/// Builds [`ConnectionDescriptor`]s from configuration
///
/// The provider mapping table is read from `AppSettings:DbProviderMappings`
/// on first use and kept for the life of the factory.
pub struct DescriptorFactory {
    connections: ConnectionResolver,
    migrations_assembly: Option<String>,
    mappings: OnceCell<ProviderMappings>,
}

impl DescriptorFactory {
    pub fn new(values: ConfigValueResolver) -> Self {
        Self::from_resolver(ConnectionResolver::new(values))
    }

    /// Use an already configured connection resolver
    pub fn from_resolver(connections: ConnectionResolver) -> Self {
        Self {
            connections,
            migrations_assembly: None,
            mappings: OnceCell::new(),
        }
    }

    /// Module holding the schema migrations, reported when migrations are on
    pub fn with_migrations_assembly(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.migrations_assembly = (!name.trim().is_empty()).then_some(name);
        self
    }

    /// Log connection and tunable problems through `logger`
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.connections = self.connections.with_logger(logger);
        self
    }

    pub fn connections(&self) -> &ConnectionResolver {
        &self.connections
    }

    fn values(&self) -> &ConfigValueResolver {
        self.connections.values()
    }

    /// The provider mapping table, loaded on first call
    pub fn mappings(&self) -> &ProviderMappings {
        self.mappings
            .get_or_init(|| self.values().section(PROVIDER_MAPPINGS_SECTION))
    }

    pub fn migrations_enabled(&self) -> bool {
        self.values()
            .flag_or(settings::ENABLE_MIGRATION, defaults::ENABLE_MIGRATION)
    }

    /// Descriptor for a request; `None` headers means no tenant override
    pub fn descriptor(&self, headers: Option<&dyn RequestHeaders>) -> ConnectionDescriptor {
        let resolved = self.connections.resolve(headers, Some(self.mappings()));
        let values = self.values();

        let migrations_assembly_name = if self.migrations_enabled() {
            self.migrations_assembly.clone()
        } else {
            None
        };

        ConnectionDescriptor {
            provider: resolved.provider,
            connection_string: resolved.connection_string,
            command_timeout_seconds: values
                .parse_or(settings::COMMAND_TIMEOUT, defaults::COMMAND_TIMEOUT_SECONDS),
            max_retry_count: values.parse_or(settings::MAX_RETRY_COUNT, defaults::MAX_RETRY_COUNT),
            migrations_assembly_name,
            use_lazy_loading: values
                .flag_or(settings::USE_LAZY_LOADING, defaults::USE_LAZY_LOADING),
            use_change_tracking_proxies: values.flag_or(
                settings::USE_CHANGE_TRACKING_PROXIES,
                defaults::USE_CHANGE_TRACKING_PROXIES,
            ),
            tracking_behavior_disabled: !values.flag_or(
                settings::USE_QUERY_TRACKING_BEHAVIOR,
                defaults::USE_QUERY_TRACKING_BEHAVIOR,
            ),
        }
    }
}

impl std::fmt::Debug for DescriptorFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorFactory")
            .field("connections", &self.connections)
            .field("migrations_assembly", &self.migrations_assembly)
            .field("mappings_loaded", &self.mappings.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigSource;
    use crate::env::MemoryEnvironment;
    use crate::logging::Logger;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn factory_over(config: Arc<MemoryConfigSource>) -> DescriptorFactory {
        let values = ConfigValueResolver::new(config)
            .with_environment(Arc::new(MemoryEnvironment::new()));
        DescriptorFactory::new(values)
    }

    fn tenant(name: &str) -> HashMap<String, String> {
        [("cx-db".to_string(), name.to_string())].into()
    }

    #[test]
    fn test_defaults() {
        let factory = factory_over(Arc::new(MemoryConfigSource::with_values([(
            "ConnectionString",
            "Server=sql01;Database=app",
        )])));
        let d = factory.descriptor(None);

        assert_eq!(d.provider, DbProvider::MsSql);
        assert_eq!(d.connection_string, "Server=sql01;Database=app");
        assert_eq!(d.command_timeout_seconds, 300);
        assert_eq!(d.max_retry_count, 0);
        assert_eq!(d.migrations_assembly_name, None);
        assert!(!d.use_lazy_loading);
        assert!(!d.use_change_tracking_proxies);
        assert!(!d.tracking_behavior_disabled);
    }

    #[test]
    fn test_tunables_from_configuration() {
        let factory = factory_over(Arc::new(MemoryConfigSource::with_values([
            ("ConnectionString", "Database=%db%"),
            ("AppSetting:EfSqlCommandTimeOutInSecond", "60"),
            ("AppSetting:EfSqlMaxRetryOnFailureCount", "3"),
            ("AppSetting:EfUseLazyLoading", "True"),
            ("AppSetting:EfUseChangeTrackingProxies", "true"),
            ("AppSetting:EfUseQueryTrackingBehavior", "false"),
        ])));
        let d = factory.descriptor(Some(&tenant("tenant7")));

        assert_eq!(d.connection_string, "Database=tenant7");
        assert_eq!(d.command_timeout_seconds, 60);
        assert_eq!(d.max_retry_count, 3);
        assert!(d.use_lazy_loading);
        assert!(d.use_change_tracking_proxies);
        assert!(d.tracking_behavior_disabled);
    }

    #[test]
    fn test_provider_mappings_section() {
        let factory = factory_over(Arc::new(MemoryConfigSource::with_values([
            ("ConnectionString", "Database=%db%"),
            ("AppSettings:DbProviderMappings:tenant7", "postgresql"),
            ("AppSettings:DbProviderMappings:tenant8", "mssql"),
        ])));

        assert_eq!(factory.mappings().len(), 2);
        assert_eq!(factory.descriptor(Some(&tenant("tenant7"))).provider, DbProvider::PostgreSql);
        assert_eq!(factory.descriptor(Some(&tenant("tenant8"))).provider, DbProvider::MsSql);
        assert_eq!(factory.descriptor(Some(&tenant("other"))).provider, DbProvider::MsSql);
    }

    #[test]
    fn test_mappings_loaded_once() {
        let config = Arc::new(MemoryConfigSource::with_values([
            ("ConnectionString", "Database=%db%"),
            ("AppSettings:DbProviderMappings:tenant7", "postgresql"),
        ]));
        let factory = factory_over(config.clone());
        assert_eq!(factory.descriptor(Some(&tenant("tenant7"))).provider, DbProvider::PostgreSql);

        config.set("AppSettings:DbProviderMappings:tenant7", "mssql");
        assert_eq!(factory.descriptor(Some(&tenant("tenant7"))).provider, DbProvider::PostgreSql);
    }

    #[test]
    fn test_migrations_assembly_needs_both_flag_and_name() {
        let enabled = Arc::new(MemoryConfigSource::with_values([(
            "AppSetting:EfEnableMigration",
            "true",
        )]));

        let named =
            factory_over(enabled.clone()).with_migrations_assembly("Billing.Migrations");
        assert!(named.migrations_enabled());
        assert_eq!(
            named.descriptor(None).migrations_assembly_name.as_deref(),
            Some("Billing.Migrations")
        );

        let blank = factory_over(enabled).with_migrations_assembly("  ");
        assert_eq!(blank.descriptor(None).migrations_assembly_name, None);

        let disabled = factory_over(Arc::new(MemoryConfigSource::new()))
            .with_migrations_assembly("Billing.Migrations");
        assert!(!disabled.migrations_enabled());
        assert_eq!(disabled.descriptor(None).migrations_assembly_name, None);
    }

    #[test]
    fn test_unusable_tunables_are_logged() {
        #[derive(Default)]
        struct Recording(Mutex<Vec<String>>);

        impl Logger for Recording {
            fn debug(&self, _message: &str) {}
            fn info(&self, _message: &str) {}
            fn warn(&self, message: &str) {
                self.0.lock().push(format!("warn:{message}"));
            }
            fn error(&self, message: &str) {
                self.0.lock().push(format!("error:{message}"));
            }
        }

        let recording = Arc::new(Recording::default());
        let factory = factory_over(Arc::new(MemoryConfigSource::with_values([
            ("ConnectionString", "Database=app"),
            ("AppSetting:EfSqlCommandTimeOutInSecond", "soon"),
            ("AppSetting:EfUseLazyLoading", "maybe"),
        ])))
        .with_logger(recording.clone());

        let d = factory.descriptor(None);
        assert_eq!(d.command_timeout_seconds, 300);
        assert!(!d.use_lazy_loading);

        let lines = recording.0.lock();
        assert_eq!(lines.len(), 2);
        assert!(lines
            .iter()
            .any(|l| l.starts_with("warn:Setting EfSqlCommandTimeOutInSecond")));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("warn:Setting EfUseLazyLoading")));
    }

    #[test]
    fn test_descriptor_serializes_camel_case() {
        let factory = factory_over(Arc::new(MemoryConfigSource::with_values([(
            "ConnectionString",
            "Database=app",
        )])));
        let json = serde_json::to_value(factory.descriptor(None)).unwrap();

        assert_eq!(json["provider"], "mssql");
        assert_eq!(json["connectionString"], "Database=app");
        assert_eq!(json["commandTimeoutSeconds"], 300);
        assert_eq!(json["trackingBehaviorDisabled"], false);
    }
}
