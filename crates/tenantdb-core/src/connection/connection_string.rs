//! Key/value connection-string parsing and database-name extraction

use once_cell::sync::Lazy;
use regex::Regex;

use crate::logging::SharedLogger;

/// Database name inside a MongoDB URI: first path segment after the host
static MONGO_DATABASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"mongodb(?:\+srv)?://[^/]+/([^/?]+)").expect("valid MongoDB URI pattern")
});

const DATABASE_KEYS: [&str; 2] = ["Database", "Initial Catalog"];

/// Errors produced while parsing a `key=value;...` connection string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionStringError {
    #[error("Format of the connection string does not conform to key=value at index {position}")]
    MissingEquals { position: usize },

    #[error("Empty keyword at index {position}")]
    EmptyKey { position: usize },

    #[error("Unterminated quoted value starting at index {position}")]
    UnterminatedQuote { position: usize },

    #[error("Unexpected characters after quoted value at index {position}")]
    TrailingCharacters { position: usize },
}

pub type ConnectionStringResult<T> = Result<T, ConnectionStringError>;

/// A parsed `key=value;...` connection string
///
/// Keys compare ASCII case-insensitively; a repeated key keeps its last
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStringParts {
    pairs: Vec<(String, String)>,
}

impl ConnectionStringParts {
    /// Parse a connection string
    ///
    /// Values may be wrapped in `'` or `"`, with the quote doubled to escape
    /// it. In keys, `==` stands for a literal `=`.
    pub fn parse(input: &str) -> ConnectionStringResult<Self> {
        let bytes = input.as_bytes();
        let mut parts = Self::default();
        let mut pos = 0;

        while pos < bytes.len() {
            if bytes[pos] == b';' || bytes[pos].is_ascii_whitespace() {
                pos += 1;
                continue;
            }

            let (key, after_key) = parse_key(input, pos)?;
            let (value, after_value) = parse_value(input, after_key)?;
            parts.insert(key, value);
            pos = after_value;
        }

        Ok(parts)
    }

    /// Value for `key`, compared case-insensitively
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, key: String, value: String) {
        match self.pairs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(existing) => existing.1 = value,
            None => self.pairs.push((key, value)),
        }
    }
}

/// Reads a key starting at `start`, returns it and the index after its `=`
fn parse_key(input: &str, start: usize) -> ConnectionStringResult<(String, usize)> {
    let bytes = input.as_bytes();
    let mut key = String::new();
    let mut pos = start;
    let mut run = start;

    loop {
        match bytes.get(pos) {
            None | Some(b';') => {
                return Err(ConnectionStringError::MissingEquals { position: start })
            }
            Some(b'=') if bytes.get(pos + 1) == Some(&b'=') => {
                key.push_str(&input[run..=pos]);
                pos += 2;
                run = pos;
            }
            Some(b'=') => {
                key.push_str(&input[run..pos]);
                pos += 1;
                break;
            }
            Some(_) => pos += 1,
        }
    }

    let key = key.trim();
    if key.is_empty() {
        return Err(ConnectionStringError::EmptyKey { position: start });
    }
    Ok((key.to_string(), pos))
}

/// Reads a value starting at `start`, returns it and the index of the
/// terminating `;` (or the end of input)
fn parse_value(input: &str, start: usize) -> ConnectionStringResult<(String, usize)> {
    let bytes = input.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && bytes[pos] != b';' && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }

    let quote = match bytes.get(pos) {
        Some(&q @ (b'"' | b'\'')) => q,
        _ => {
            let end = input[pos..].find(';').map_or(input.len(), |i| pos + i);
            return Ok((input[pos..end].trim().to_string(), end));
        }
    };

    let open = pos;
    let mut value = String::new();
    pos += 1;
    let mut run = pos;
    loop {
        match bytes.get(pos) {
            None => return Err(ConnectionStringError::UnterminatedQuote { position: open }),
            Some(&b) if b == quote && bytes.get(pos + 1) == Some(&quote) => {
                value.push_str(&input[run..=pos]);
                pos += 2;
                run = pos;
            }
            Some(&b) if b == quote => {
                value.push_str(&input[run..pos]);
                pos += 1;
                break;
            }
            Some(_) => pos += 1,
        }
    }

    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    match bytes.get(pos) {
        None | Some(b';') => Ok((value, pos)),
        Some(_) => Err(ConnectionStringError::TrailingCharacters { position: pos }),
    }
}

/// Database named by a MongoDB URI (`mongodb://` or `mongodb+srv://`)
pub fn mongo_database_name(connection_string: &str) -> Option<String> {
    MONGO_DATABASE
        .captures(connection_string)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_mongo_uri(connection_string: &str) -> bool {
    ["mongodb://", "mongodb+srv://"].iter().any(|scheme| {
        connection_string
            .get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// Database a connection string currently points at
///
/// Key/value strings answer with `Database`, then `Initial Catalog`. Strings
/// that don't parse as key/value are reported to `logger` at error level,
/// then MongoDB URIs are tried. Anything else is unknown.
pub fn database_name(connection_string: &str, logger: &SharedLogger) -> Option<String> {
    match ConnectionStringParts::parse(connection_string) {
        Ok(parts) => {
            let found = DATABASE_KEYS.iter().find_map(|key| parts.get(key));
            if let Some(name) = found {
                return Some(name.to_string()).filter(|n| !n.trim().is_empty());
            }
        }
        Err(e) => {
            crate::log_error!(logger, "{}", e);
        }
    }

    if is_mongo_uri(connection_string) {
        return mongo_database_name(connection_string);
    }

    None
}
