//! Well-known setting keys, defaults and header names

/// Namespace used when a caller doesn't name one
pub const DEFAULT_SETTING_NAME: &str = "AppSetting";

/// Plural namespace that is singularized when building secret-style keys
pub const PLURAL_SETTING_NAME: &str = "AppSettings";

/// Setting holding the *name* of the connection-string setting
pub const CONNECTION_STRING_KEY: &str = "ConnectionStringKey";

/// Connection-string setting name used when `ConnectionStringKey` is unset
pub const DEFAULT_CONNECTION_STRING_NAME: &str = "ConnectionString";

/// Section holding the `database name -> provider name` table
pub const PROVIDER_MAPPINGS_SECTION: &str = "AppSettings:DbProviderMappings";

/// Request header carrying the tenant database name
pub const DB_NAME_HEADER: &str = "cx-db";

/// Request header carrying the tenant database server
pub const DB_SERVER_HEADER: &str = "cx-db-server";

/// Placeholder replaced by the tenant database name
pub const DB_PLACEHOLDER: &str = "%db%";

/// Placeholder replaced by the tenant database server
pub const SERVER_PLACEHOLDER: &str = "%server%";

/// ORM tunables read through the `AppSetting` namespace
pub mod settings {
    pub const COMMAND_TIMEOUT: &str = "EfSqlCommandTimeOutInSecond";
    pub const MAX_RETRY_COUNT: &str = "EfSqlMaxRetryOnFailureCount";
    pub const ENABLE_MIGRATION: &str = "EfEnableMigration";
    pub const USE_LAZY_LOADING: &str = "EfUseLazyLoading";
    pub const USE_CHANGE_TRACKING_PROXIES: &str = "EfUseChangeTrackingProxies";
    pub const USE_QUERY_TRACKING_BEHAVIOR: &str = "EfUseQueryTrackingBehavior";
    /// Minimum level for [`ConsoleLogger`](crate::logging::ConsoleLogger)
    pub const LOG_LEVEL: &str = "TenantDbLogLevel";
}

/// Defaults for [`settings`]
pub mod defaults {
    pub const COMMAND_TIMEOUT_SECONDS: u32 = 300;
    pub const MAX_RETRY_COUNT: u32 = 0;
    pub const ENABLE_MIGRATION: bool = false;
    pub const USE_LAZY_LOADING: bool = false;
    pub const USE_CHANGE_TRACKING_PROXIES: bool = false;
    pub const USE_QUERY_TRACKING_BEHAVIOR: bool = true;
    pub const LOG_LEVEL: crate::logging::LogLevel = crate::logging::LogLevel::Warn;
}
