use thiserror::Error;

use crate::adapters::template::TemplateError;

pub type Result<T> = std::result::Result<T, ReversionError>;

/// Failures surfaced by the snapshot orchestrator and its adapters.
#[derive(Debug, Error)]
pub enum ReversionError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("failed to copy table '{table}' to '{backup}': {source}")]
    Copy {
        table: String,
        backup: String,
        #[source]
        source: SqlError,
    },

    #[error("failed to restore table '{table}' from '{backup}': {source}")]
    Restore {
        table: String,
        backup: String,
        #[source]
        source: SqlError,
    },

    #[error("no tables are currently being tracked")]
    NoTrackedTables,

    #[error("table discovery failed: {0}")]
    Discovery(#[source] SqlError),
}

/// Low-level failure of a single statement or the text that feeds it.
#[derive(Debug, Error)]
pub enum SqlError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[cfg(feature = "mssql")]
    #[error(transparent)]
    MsSql(#[from] tiberius::error::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Precondition(String),
}

impl ReversionError {
    pub(crate) fn copy(table: &str, suffix: &str, source: impl Into<SqlError>) -> Self {
        ReversionError::Copy {
            table: table.to_string(),
            backup: format!("{}{}", table, suffix),
            source: source.into(),
        }
    }

    pub(crate) fn restore(table: &str, suffix: &str, source: impl Into<SqlError>) -> Self {
        ReversionError::Restore {
            table: table.to_string(),
            backup: format!("{}{}", table, suffix),
            source: source.into(),
        }
    }
}
