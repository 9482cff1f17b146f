//! Tenant overrides carried by request headers

use std::collections::{BTreeMap, HashMap};

use hyper::HeaderMap;

use crate::keys::{DB_NAME_HEADER, DB_SERVER_HEADER};

/// Read access to the headers of an incoming request
///
/// Header names compare ASCII case-insensitively.
pub trait RequestHeaders {
    fn header(&self, name: &str) -> Option<String>;
}

impl RequestHeaders for HeaderMap {
    fn header(&self, name: &str) -> Option<String> {
        self.get(name)?.to_str().ok().map(str::to_string)
    }
}

impl RequestHeaders for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<String> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .cloned()
    }
}

impl RequestHeaders for BTreeMap<String, String> {
    fn header(&self, name: &str) -> Option<String> {
        self.get(name)
            .or_else(|| {
                self.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .cloned()
    }
}

/// Per-request redirection of the shared connection template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantOverride {
    /// Replaces `%db%` and the template's current database name
    pub db_name: Option<String>,
    /// Replaces `%server%`
    pub db_server_name: Option<String>,
}

impl TenantOverride {
    /// No override at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `cx-db` / `cx-db-server` headers; blank values count as absent
    pub fn from_headers(headers: &dyn RequestHeaders) -> Self {
        Self {
            db_name: non_blank(headers.header(DB_NAME_HEADER)),
            db_server_name: non_blank(headers.header(DB_SERVER_HEADER)),
        }
    }

    pub fn with_db_name(mut self, name: impl Into<String>) -> Self {
        self.db_name = non_blank(Some(name.into()));
        self
    }

    pub fn with_db_server_name(mut self, name: impl Into<String>) -> Self {
        self.db_server_name = non_blank(Some(name.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.db_name.is_none() && self.db_server_name.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
