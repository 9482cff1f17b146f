//! Setting resolution
//!
//! A setting `key` in namespace `settingName` is looked up, first non-blank
//! value wins, in this order:
//! 1. `{settingName}-{key}` in configuration (secret-store style; `AppSettings`
//!    is singularized to `AppSetting` first)
//! 2. environment variable `{settingName}__{key}`
//! 3. `{settingName}:{key}` in configuration
//! 4. `key` in configuration
//!
//! and otherwise the caller's default is returned untouched. Values found by a
//! lookup are expanded (`%VAR%`, `$VAR`) before being returned and cached.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use super::cache::{CachedValue, LookupOrigin, ValueCache};
use crate::config::ConfigSource;
use crate::env::{expand_env_vars, Environment, ProcessEnvironment};
use crate::keys::{DEFAULT_SETTING_NAME, PLURAL_SETTING_NAME};
use crate::logging::{self, SharedLogger};

/// Secret-style key for `key` in `setting_name`
///
/// `AppSettings` (any case) loses its trailing character, so `AppSettings`
/// and `AppSetting` share secret keys.
pub fn secret_key(key: &str, setting_name: &str) -> String {
    let namespace = if setting_name.eq_ignore_ascii_case(PLURAL_SETTING_NAME) {
        &setting_name[..setting_name.len() - 1]
    } else {
        setting_name
    };
    format!("{namespace}-{key}")
}

/// The four keys a setting is looked up under, in precedence order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKeys {
    pub secret: String,
    pub env: String,
    pub setting: String,
    pub raw: String,
}

impl LookupKeys {
    pub fn new(key: &str, setting_name: &str) -> Self {
        Self {
            secret: secret_key(key, setting_name),
            env: format!("{setting_name}__{key}"),
            setting: format!("{setting_name}:{key}"),
            raw: key.to_string(),
        }
    }
}

/// Looks settings up across configuration and environment
///
/// Cloning is cheap and clones share the cache.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tenantdb_core::config::MemoryConfigSource;
/// use tenantdb_core::env::MemoryEnvironment;
/// use tenantdb_core::resolver::ConfigValueResolver;
///
/// let config = MemoryConfigSource::with_values([("AppSetting:EfUseLazyLoading", "true")]);
/// let resolver = ConfigValueResolver::new(Arc::new(config))
///     .with_environment(Arc::new(MemoryEnvironment::new()));
///
/// assert_eq!(resolver.resolve("EfUseLazyLoading", "AppSetting", "false"), "true");
/// assert_eq!(resolver.resolve("Missing", "AppSetting", "fallback"), "fallback");
/// ```
#[derive(Clone)]
pub struct ConfigValueResolver {
    source: Arc<dyn ConfigSource>,
    env: Arc<dyn Environment>,
    cache: Arc<ValueCache>,
    logger: SharedLogger,
}

impl ConfigValueResolver {
    /// Resolver over `source`, the process environment and a fresh cache
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source,
            env: Arc::new(ProcessEnvironment::new()),
            cache: Arc::new(ValueCache::new()),
            logger: logging::noop(),
        }
    }

    pub fn with_environment(mut self, env: Arc<dyn Environment>) -> Self {
        self.env = env;
        self
    }

    /// Share a cache owned by the caller (normally one per process)
    pub fn with_cache(mut self, cache: Arc<ValueCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn source(&self) -> &Arc<dyn ConfigSource> {
        &self.source
    }

    pub fn environment(&self) -> &Arc<dyn Environment> {
        &self.env
    }

    pub fn cache(&self) -> &Arc<ValueCache> {
        &self.cache
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    /// Resolve `key` in `setting_name`, falling back to `default_value`
    pub fn resolve(&self, key: &str, setting_name: &str, default_value: &str) -> String {
        let keys = LookupKeys::new(key, setting_name);
        let candidates = [
            (&keys.secret, LookupOrigin::Config),
            (&keys.env, LookupOrigin::Env),
            (&keys.setting, LookupOrigin::Config),
            (&keys.raw, LookupOrigin::Config),
        ];

        let found = candidates
            .into_iter()
            .find_map(|(lookup_key, origin)| self.lookup(lookup_key, origin));
        found.unwrap_or_else(|| default_value.to_string())
    }

    /// `resolve(key, "AppSetting", "")`
    pub fn get(&self, key: &str) -> String {
        self.resolve(key, DEFAULT_SETTING_NAME, "")
    }

    /// `resolve(key, "AppSetting", default_value)`
    pub fn get_or(&self, key: &str, default_value: &str) -> String {
        self.resolve(key, DEFAULT_SETTING_NAME, default_value)
    }

    /// Parse an `AppSetting` value, `default` when unset or unparsable
    pub fn parse_or<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        let value = self.get(key);
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return default;
        }
        match trimmed.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                crate::log_warn!(
                    self.logger,
                    "Setting {} has unusable value {:?} ({}), using {}",
                    key,
                    trimmed,
                    e,
                    default
                );
                default
            }
        }
    }

    /// Boolean `AppSetting`, `true`/`false` in any case
    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        let value = self.get(key);
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return default;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            true
        } else if trimmed.eq_ignore_ascii_case("false") {
            false
        } else {
            crate::log_warn!(
                self.logger,
                "Setting {} has non-boolean value {:?}, using {}",
                key,
                trimmed,
                default
            );
            default
        }
    }

    /// Children of a configuration section, read straight from the source
    pub fn section(&self, path: &str) -> BTreeMap<String, String> {
        self.source.section(path)
    }

    fn lookup(&self, key: &str, origin: LookupOrigin) -> Option<String> {
        match self.cache.get(origin, key) {
            Some(CachedValue::Hit(value)) => return Some(value),
            Some(CachedValue::Miss) => return None,
            None => {}
        }

        let raw = match origin {
            LookupOrigin::Config => self.source.get(key),
            LookupOrigin::Env => self.env.var(key),
        };
        let outcome = match raw {
            Some(value) if !value.trim().is_empty() => {
                CachedValue::Hit(expand_env_vars(&value, self.env.as_ref()))
            }
            _ => CachedValue::Miss,
        };
        self.cache.insert(origin, key, outcome.clone());

        match outcome {
            CachedValue::Hit(value) => Some(value),
            CachedValue::Miss => None,
        }
    }
}

impl std::fmt::Debug for ConfigValueResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigValueResolver")
            .field("source", &self.source.name())
            .field("cached", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigSource;
    use crate::env::MemoryEnvironment;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts reads so tests can prove cache hits
    struct CountingSource {
        inner: MemoryConfigSource,
        reads: AtomicUsize,
    }

    impl CountingSource {
        fn new<const N: usize>(values: [(&str, &str); N]) -> Self {
            Self {
                inner: MemoryConfigSource::with_values(values),
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl ConfigSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        fn get(&self, key: &str) -> Option<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn section(&self, path: &str) -> BTreeMap<String, String> {
            self.inner.section(path)
        }
    }

    fn resolver_over<const N: usize>(
        values: [(&str, &str); N],
        env: MemoryEnvironment,
    ) -> (ConfigValueResolver, Arc<CountingSource>) {
        let source = Arc::new(CountingSource::new(values));
        let resolver =
            ConfigValueResolver::new(source.clone()).with_environment(Arc::new(env));
        (resolver, source)
    }

    #[test]
    fn test_secret_key_singularizes_app_settings() {
        assert_eq!(secret_key("Key", "AppSettings"), "AppSetting-Key");
        assert_eq!(secret_key("Key", "AppSetting"), "AppSetting-Key");
        assert_eq!(secret_key("Key", "appsettings"), "appsetting-Key");
        assert_eq!(secret_key("Key", "Tenants"), "Tenants-Key");
        assert_eq!(secret_key("Key", "AppSettings"), secret_key("Key", "AppSetting"));
    }

    #[test]
    fn test_lookup_keys() {
        let keys = LookupKeys::new("EfUseLazyLoading", "AppSetting");
        assert_eq!(keys.secret, "AppSetting-EfUseLazyLoading");
        assert_eq!(keys.env, "AppSetting__EfUseLazyLoading");
        assert_eq!(keys.setting, "AppSetting:EfUseLazyLoading");
        assert_eq!(keys.raw, "EfUseLazyLoading");
    }

    #[test]
    fn test_precedence_order() {
        let env = MemoryEnvironment::with_vars([("AppSetting__Key", "from_env")]);
        let all = [
            ("AppSetting-Key", "from_secret"),
            ("AppSetting:Key", "from_path"),
            ("Key", "from_raw"),
        ];

        let (resolver, _) = resolver_over(all, env);
        assert_eq!(resolver.resolve("Key", "AppSetting", "default"), "from_secret");

        let env = MemoryEnvironment::with_vars([("AppSetting__Key", "from_env")]);
        let path_and_raw = [("AppSetting:Key", "from_path"), ("Key", "from_raw")];
        let (resolver, _) = resolver_over(path_and_raw, env);
        assert_eq!(resolver.resolve("Key", "AppSetting", "default"), "from_env");

        let (resolver, _) = resolver_over(path_and_raw, MemoryEnvironment::new());
        assert_eq!(resolver.resolve("Key", "AppSetting", "default"), "from_path");

        let (resolver, _) = resolver_over([("Key", "from_raw")], MemoryEnvironment::new());
        assert_eq!(resolver.resolve("Key", "AppSetting", "default"), "from_raw");

        let (resolver, _) = resolver_over([], MemoryEnvironment::new());
        assert_eq!(resolver.resolve("Key", "AppSetting", "default"), "default");
    }

    #[test]
    fn test_blank_values_fall_through() {
        let env = MemoryEnvironment::with_vars([("AppSetting__Key", "  ")]);
        let (resolver, _) = resolver_over([("AppSetting-Key", ""), ("Key", "from_raw")], env);
        assert_eq!(resolver.resolve("Key", "AppSetting", ""), "from_raw");
    }

    #[test]
    fn test_plural_namespace_reads_singular_secret() {
        let (resolver, _) = resolver_over([("AppSetting-Key", "secret")], MemoryEnvironment::new());
        assert_eq!(resolver.resolve("Key", "AppSettings", ""), "secret");
        assert_eq!(resolver.resolve("Key", "appSETTINGS", ""), "secret");
    }

    #[test]
    fn test_expansion_applies_to_found_values_only() {
        let env = MemoryEnvironment::with_vars([("DB_HOST", "sql01")]);
        let (resolver, _) = resolver_over([("AppSetting:Host", "%DB_HOST%")], env);

        assert_eq!(resolver.get("Host"), "sql01");
        assert_eq!(resolver.get_or("Missing", "%DB_HOST%"), "%DB_HOST%");
    }

    #[test]
    fn test_second_resolution_is_served_from_cache() {
        let (resolver, source) = resolver_over([("Key", "from_raw")], MemoryEnvironment::new());

        let first = resolver.resolve("Key", "AppSetting", "");
        let reads_after_first = source.reads();
        assert_eq!(reads_after_first, 3);

        let second = resolver.resolve("Key", "AppSetting", "");
        assert_eq!(first, second);
        assert_eq!(source.reads(), reads_after_first);
    }

    #[test]
    fn test_missing_settings_are_cached_but_default_is_not() {
        let (resolver, source) = resolver_over([], MemoryEnvironment::new());

        assert_eq!(resolver.resolve("Key", "AppSetting", "a"), "a");
        let reads = source.reads();
        assert_eq!(resolver.resolve("Key", "AppSetting", "b"), "b");
        assert_eq!(source.reads(), reads);
    }

    #[test]
    fn test_shared_cache_between_resolvers() {
        let cache = Arc::new(ValueCache::new());
        let (first, source) =
            resolver_over([("AppSetting:Key", "value")], MemoryEnvironment::new());
        let first = first.with_cache(cache.clone());
        let second = ConfigValueResolver::new(source.clone())
            .with_environment(Arc::new(MemoryEnvironment::new()))
            .with_cache(cache.clone());

        assert_eq!(first.get("Key"), "value");
        let reads = source.reads();
        assert_eq!(second.get("Key"), "value");
        assert_eq!(source.reads(), reads);
        assert!(cache.hits() > 0);
    }

    #[test]
    fn test_config_miss_does_not_hide_variable_of_same_name() {
        let env = MemoryEnvironment::with_vars([("AppSetting__Timeout", "60")]);
        let (resolver, _) = resolver_over([], env);

        // Raw configuration lookup of a key spelled like the variable
        assert_eq!(resolver.resolve("AppSetting__Timeout", "Other", ""), "");
        assert_eq!(resolver.get("Timeout"), "60");
    }

    #[test]
    fn test_warnings_reach_injected_logger() {
        use crate::logging::Logger;
        use parking_lot::Mutex;

        #[derive(Default)]
        struct Warnings(Mutex<Vec<String>>);

        impl Logger for Warnings {
            fn debug(&self, _message: &str) {}
            fn info(&self, _message: &str) {}
            fn warn(&self, message: &str) {
                self.0.lock().push(message.to_string());
            }
            fn error(&self, _message: &str) {}
        }

        let warnings = Arc::new(Warnings::default());
        let (resolver, _) = resolver_over(
            [("AppSetting:Broken", "soon"), ("AppSetting:Odd", "yes")],
            MemoryEnvironment::new(),
        );
        let resolver = resolver.with_logger(warnings.clone());

        assert_eq!(resolver.parse_or("Broken", 300u32), 300);
        assert!(!resolver.flag_or("Odd", false));

        let lines = warnings.0.lock();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Setting Broken has unusable value \"soon\""));
        assert!(lines[1].starts_with("Setting Odd has non-boolean value \"yes\""));
    }

    #[test]
    fn test_parse_and_flag_helpers() {
        let (resolver, _) = resolver_over(
            [
                ("AppSetting:Timeout", " 120 "),
                ("AppSetting:Broken", "soon"),
                ("AppSetting:Lazy", "TRUE"),
                ("AppSetting:Odd", "yes"),
            ],
            MemoryEnvironment::new(),
        );

        assert_eq!(resolver.parse_or("Timeout", 300u32), 120);
        assert_eq!(resolver.parse_or("Broken", 300u32), 300);
        assert_eq!(resolver.parse_or("Unset", 7u32), 7);
        assert!(resolver.flag_or("Lazy", false));
        assert!(!resolver.flag_or("Odd", false));
        assert!(resolver.flag_or("Unset", true));
    }

    #[test]
    fn test_concurrent_resolution() {
        use std::thread;

        let (resolver, _) = resolver_over([("AppSetting:Key", "value")], MemoryEnvironment::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                thread::spawn(move || resolver.get("Key"))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "value");
        }
    }
}
