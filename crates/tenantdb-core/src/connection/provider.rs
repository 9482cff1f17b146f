//! Database provider selection

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// `database name -> provider name`, normally bound from
/// `AppSettings:DbProviderMappings`
pub type ProviderMappings = BTreeMap<String, String>;

/// Target database engine family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DbProvider {
    /// SQL Server, the fallback whenever nothing better is known
    #[default]
    #[serde(rename = "mssql")]
    MsSql,
    #[serde(rename = "postgresql")]
    PostgreSql,
}

/// A provider name that doesn't name a supported engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown database provider: {0}")]
pub struct UnknownProvider(pub String);

impl DbProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbProvider::MsSql => "mssql",
            DbProvider::PostgreSql => "postgresql",
        }
    }

    /// Guess the provider from the shape of a connection string
    ///
    /// Npgsql-style strings spell their keys in lowercase (`host=`,
    /// `server=`), so the test is case-sensitive on purpose.
    pub fn sniff(connection_string: &str) -> Self {
        if connection_string.contains("server") || connection_string.contains("host") {
            DbProvider::PostgreSql
        } else {
            DbProvider::MsSql
        }
    }
}

impl FromStr for DbProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql-server" => Ok(DbProvider::MsSql),
            "postgresql" | "postgres" | "npgsql" | "pgsql" => Ok(DbProvider::PostgreSql),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for DbProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("postgresql".parse::<DbProvider>(), Ok(DbProvider::PostgreSql));
        assert_eq!(" PostgreSQL ".parse::<DbProvider>(), Ok(DbProvider::PostgreSql));
        assert_eq!("npgsql".parse::<DbProvider>(), Ok(DbProvider::PostgreSql));
        assert_eq!("MSSQL".parse::<DbProvider>(), Ok(DbProvider::MsSql));
        assert_eq!("sqlserver".parse::<DbProvider>(), Ok(DbProvider::MsSql));
        assert_eq!(
            "oracle".parse::<DbProvider>(),
            Err(UnknownProvider("oracle".to_string()))
        );
    }

    #[test]
    fn test_display_and_default() {
        assert_eq!(DbProvider::default(), DbProvider::MsSql);
        assert_eq!(DbProvider::PostgreSql.to_string(), "postgresql");
        assert_eq!(DbProvider::MsSql.as_str(), "mssql");
    }

    #[test]
    fn test_sniff() {
        assert_eq!(DbProvider::sniff("host=pg01;Database=app"), DbProvider::PostgreSql);
        assert_eq!(DbProvider::sniff("server=pg01;database=app"), DbProvider::PostgreSql);
        assert_eq!(DbProvider::sniff("Server=sql01;Database=app"), DbProvider::MsSql);
        assert_eq!(DbProvider::sniff(""), DbProvider::MsSql);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&DbProvider::PostgreSql).unwrap(), "\"postgresql\"");
        let parsed: DbProvider = serde_json::from_str("\"mssql\"").unwrap();
        assert_eq!(parsed, DbProvider::MsSql);
    }
}
