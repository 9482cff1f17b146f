//! Setting resolution across secret-style keys, environment variables and
//! configuration paths, memoized in a [`ValueCache`].

mod cache;
mod value_resolver;

pub use cache::{CachedValue, LookupOrigin, ValueCache};
pub use value_resolver::{secret_key, ConfigValueResolver, LookupKeys};
