use std::path::PathBuf;

use tracing::debug;

use super::DatabaseAdapter;
use super::dialect::Dialect;
use super::session::SqlSession;
use super::template::{TemplateContext, render};
use crate::error::{ReversionError, Result, SqlError};

/// Adapter driving any [`SqlSession`] with the statements of one [`Dialect`].
pub struct SqlAdapter<S: SqlSession> {
    dialect: &'static Dialect,
    session: Option<S>,
    app_path: PathBuf,
}

impl<S: SqlSession> SqlAdapter<S> {
    pub fn new(dialect: &'static Dialect) -> Self {
        Self {
            dialect,
            session: None,
            app_path: std::env::current_dir().unwrap_or_default(),
        }
    }

    pub fn dialect(&self) -> &'static Dialect {
        self.dialect
    }

    fn session(&mut self) -> Result<&mut S> {
        self.session
            .as_mut()
            .ok_or_else(|| ReversionError::Connection("no open connection to perform operation".into()))
    }

    fn try_copy(&mut self, table: &str, suffix: &str) -> std::result::Result<(), SqlError> {
        let dialect = self.dialect;
        let Some(session) = self.session.as_mut() else {
            return Err(SqlError::Precondition("connection closed".into()));
        };
        let ctx = TemplateContext::new(dialect.quotes).table(table).suffix(suffix);
        let copy = render(dialect.copy_table, &ctx)?;

        let backup = format!("{}{}", table, suffix);
        if !session.query_strings(dialect.table_exists, Some(&backup))?.is_empty() {
            return Err(SqlError::Precondition(format!("backup table '{}' already exists", backup)));
        }

        run(session, &copy)
    }

    fn try_restore(&mut self, table: &str, suffix: &str) -> std::result::Result<(), SqlError> {
        let dialect = self.dialect;
        let Some(session) = self.session.as_mut() else {
            return Err(SqlError::Precondition("connection closed".into()));
        };

        let backup = format!("{}{}", table, suffix);
        if session.query_strings(dialect.table_exists, Some(&backup))?.is_empty() {
            return Err(SqlError::Precondition(format!("backup table '{}' does not exist", backup)));
        }

        let columns = session.query_strings(dialect.list_columns, Some(table))?;
        if columns.is_empty() {
            return Err(SqlError::Precondition(format!("table '{}' has no insertable columns", table)));
        }
        let has_identity = match dialect.identity_columns {
            Some(query) => !session.query_strings(query, Some(table))?.is_empty(),
            None => false,
        };

        let ctx = TemplateContext::new(dialect.quotes)
            .table(table)
            .suffix(suffix)
            .columns(&columns);
        let clear = render(dialect.clear_table, &ctx)?;
        let insert = render(dialect.insert_from_backup, &ctx)?;
        let drop = render(dialect.drop_backup, &ctx)?;
        let toggle = match (has_identity, dialect.identity_insert_on, dialect.identity_insert_off) {
            (true, Some(on), Some(off)) => Some((render(on, &ctx)?, render(off, &ctx)?)),
            _ => None,
        };

        run(session, &clear)?;
        match toggle {
            Some((on, off)) => {
                run(session, &on)?;
                let inserted = run(session, &insert);
                // the toggle is reset even when the insert fails; the insert error wins
                let reset = run(session, &off);
                inserted?;
                reset?;
            }
            None => run(session, &insert)?,
        }
        run(session, &drop)
    }
}

fn run<S: SqlSession>(session: &mut S, sql: &str) -> std::result::Result<(), SqlError> {
    debug!(%sql, "executing");
    session.execute(sql)
}

impl<S: SqlSession> DatabaseAdapter for SqlAdapter<S> {
    fn name(&self) -> &'static str {
        self.dialect.name
    }

    fn open_connection(&mut self, connection_string: &str) -> Result<()> {
        self.close_connection()?;
        let session = S::open(connection_string).map_err(|e| ReversionError::Connection(e.to_string()))?;
        debug!(adapter = self.dialect.name, database = session.database_name(), "connection opened");
        self.session = Some(session);
        Ok(())
    }

    fn close_connection(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => {
                session.close().map_err(|e| ReversionError::Connection(e.to_string()))?;
                debug!(adapter = self.dialect.name, "connection closed");
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn list_tables(&mut self) -> Result<Vec<String>> {
        let dialect = self.dialect;
        let app_path = self.app_path.clone();
        let session = self.session()?;
        let ctx = TemplateContext::new(dialect.quotes)
            .database(session.database_name())
            .app_path(&app_path);
        let sql = render(dialect.list_tables, &ctx).map_err(|e| ReversionError::Discovery(e.into()))?;
        session.query_strings(&sql, None).map_err(ReversionError::Discovery)
    }

    fn copy_table(&mut self, table: &str, suffix: &str) -> Result<bool> {
        self.session()?;
        self.try_copy(table, suffix)
            .map_err(|e| ReversionError::copy(table, suffix, e))?;
        Ok(true)
    }

    fn restore_table(&mut self, table: &str, suffix: &str) -> Result<bool> {
        self.session()?;
        self.try_restore(table, suffix)
            .map_err(|e| ReversionError::restore(table, suffix, e))?;
        Ok(true)
    }
}
