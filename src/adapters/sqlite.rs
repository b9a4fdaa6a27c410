use rusqlite::{Connection, OpenFlags, params_from_iter};

use super::dialect::SQLITE;
use super::session::SqlSession;
use super::sql::SqlAdapter;
use crate::error::SqlError;

pub type SqliteAdapter = SqlAdapter<SqliteSession>;

impl SqliteAdapter {
    pub fn sqlite() -> Self {
        SqlAdapter::new(&SQLITE)
    }
}

pub struct SqliteSession {
    conn: Connection,
}

/// Accepts `sqlite://path`, `sqlite:path` or a bare file path.
pub fn database_path(connection_string: &str) -> &str {
    connection_string
        .strip_prefix("sqlite://")
        .or_else(|| connection_string.strip_prefix("sqlite:"))
        .unwrap_or(connection_string)
}

impl SqlSession for SqliteSession {
    fn open(connection_string: &str) -> Result<Self, SqlError> {
        // no CREATE flag: a missing file is a connection failure, not a new database
        let conn = Connection::open_with_flags(
            database_path(connection_string),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    fn database_name(&self) -> &str {
        "main"
    }

    fn execute(&mut self, sql: &str) -> Result<(), SqlError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn query_strings(&mut self, sql: &str, param: Option<&str>) -> Result<Vec<String>, SqlError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(param), |row| row.get::<_, String>(0))?;
        let values = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn close(self) -> Result<(), SqlError> {
        self.conn.close().map_err(|(_, err)| SqlError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_prefixes() {
        assert_eq!(database_path("sqlite:///tmp/app.db"), "/tmp/app.db");
        assert_eq!(database_path("sqlite:app.db"), "app.db");
        assert_eq!(database_path("data/app.sqlite"), "data/app.sqlite");
    }

    #[test]
    fn missing_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        assert!(SqliteSession::open(path.to_str().unwrap()).is_err());
    }
}
