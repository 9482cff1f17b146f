//! Connection descriptors and provider-specific tuning
//!
//! [`DescriptorFactory`] turns configuration plus a request into a
//! [`ConnectionDescriptor`]; [`ProviderOptions`] is what an ORM layer needs to
//! open a context for it.

mod descriptor;
mod provider_options;

pub use descriptor::{ConnectionDescriptor, DescriptorFactory};
pub use provider_options::{
    sql_connection_string, ProviderOptions, COMMAND_TIMEOUT_KEY, TRUST_SERVER_CERTIFICATE,
};
