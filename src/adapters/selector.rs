use super::DatabaseAdapter;
use super::sqlite::SqliteAdapter;
use crate::error::{ReversionError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Sqlite,
    MsSql,
}

impl AdapterKind {
    pub fn name(self) -> &'static str {
        match self {
            AdapterKind::Sqlite => "sqlite",
            AdapterKind::MsSql => "mssql",
        }
    }
}

/// Guess the provider from the shape of a connection string.
pub fn detect_kind(connection_string: &str) -> AdapterKind {
    let lower = connection_string.trim().to_ascii_lowercase();
    let is_ado = ["server=", "data source=", "initial catalog="]
        .iter()
        .any(|key| lower.contains(key));

    if lower.starts_with("mssql://") || lower.starts_with("sqlserver://") || is_ado {
        AdapterKind::MsSql
    } else {
        AdapterKind::Sqlite
    }
}

pub fn adapter_for(kind: AdapterKind) -> Result<Box<dyn DatabaseAdapter>> {
    match kind {
        AdapterKind::Sqlite => Ok(Box::new(SqliteAdapter::sqlite())),
        #[cfg(feature = "mssql")]
        AdapterKind::MsSql => Ok(Box::new(super::mssql::MsSqlAdapter::mssql())),
        #[cfg(not(feature = "mssql"))]
        AdapterKind::MsSql => Err(ReversionError::Configuration(
            "SQL Server support is not compiled in; rebuild with the `mssql` feature".into(),
        )),
    }
}

pub fn select_adapter_for_target(connection_string: &str) -> Result<Box<dyn DatabaseAdapter>> {
    if connection_string.trim().is_empty() {
        return Err(ReversionError::Configuration("empty connection string".into()));
    }
    adapter_for(detect_kind(connection_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_providers() {
        assert_eq!(detect_kind("sqlite://tests/app.db"), AdapterKind::Sqlite);
        assert_eq!(detect_kind("./app.sqlite3"), AdapterKind::Sqlite);
        assert_eq!(
            detect_kind("Server=tcp:localhost,1433;Database=Shop;User Id=sa;Password=x"),
            AdapterKind::MsSql
        );
        assert_eq!(detect_kind("Data Source=.;Initial Catalog=Shop"), AdapterKind::MsSql);
    }

    #[test]
    fn sqlite_target_selects_sqlite_adapter() {
        let adapter = select_adapter_for_target("sqlite://app.db").unwrap();
        assert_eq!(adapter.name(), "sqlite");
        assert!(!adapter.is_open());
    }

    #[test]
    fn empty_target_is_a_configuration_error() {
        assert!(matches!(
            select_adapter_for_target("  "),
            Err(ReversionError::Configuration(_))
        ));
    }
}
