//! Snapshot orchestration.
//!
//! A [`Snapshotter`] owns the tracked tables, the backup suffix and the
//! connection string, and drives an injected [`DatabaseAdapter`] through one
//! connection per batch: open, copy or restore every table, close.

use std::ops::{Deref, DerefMut};

use chrono::Local;
use tracing::{info, warn};

use crate::adapters::DatabaseAdapter;
use crate::config::ConnectionStrings;
use crate::error::{ReversionError, Result, SqlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    Configured,
    Snapshotted,
    Reverted,
}

/// Arguments of [`Snapshotter::take_snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    /// Replaces the tracked set when given.
    pub tables: Option<Vec<String>>,
    /// Rediscover tables even if some are already tracked.
    pub force_discovery: bool,
    /// Restore the previous snapshot first so its backups are not orphaned.
    pub revert_previous: bool,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            tables: None,
            force_discovery: false,
            revert_previous: true,
        }
    }
}

/// Local `HHMM`; only unique within a day.
pub fn default_suffix() -> String {
    Local::now().format("%H%M").to_string()
}

pub struct Snapshotter {
    adapter: Box<dyn DatabaseAdapter>,
    connection_string: String,
    tables: Vec<String>,
    suffix: String,
    state: SnapshotState,
}

#[derive(Default)]
pub struct SnapshotterBuilder<'a> {
    adapter: Option<Box<dyn DatabaseAdapter>>,
    connection_string: Option<String>,
    connection_source: Option<&'a ConnectionStrings>,
    tables: Option<Vec<String>>,
    suffix: Option<String>,
}

impl<'a> SnapshotterBuilder<'a> {
    pub fn adapter(mut self, adapter: Box<dyn DatabaseAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    /// Consulted only when no non-empty connection string was given.
    pub fn connection_source(mut self, source: &'a ConnectionStrings) -> Self {
        self.connection_source = Some(source);
        self
    }

    pub fn tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn build(self) -> Result<Snapshotter> {
        let adapter = self
            .adapter
            .ok_or_else(|| ReversionError::Configuration("no database adapter has been supplied".into()))?;

        let connection_string = match self.connection_string.filter(|s| !s.trim().is_empty()) {
            Some(s) => s,
            None => self
                .connection_source
                .and_then(|source| source.last())
                .map(|entry| entry.connection_string.clone())
                .unwrap_or_default(),
        };

        let suffix = self
            .suffix
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_suffix);

        Ok(Snapshotter {
            adapter,
            connection_string,
            tables: self.tables.unwrap_or_default(),
            suffix,
            state: SnapshotState::Configured,
        })
    }
}

impl Snapshotter {
    pub fn builder<'a>() -> SnapshotterBuilder<'a> {
        SnapshotterBuilder::default()
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn state(&self) -> SnapshotState {
        self.state
    }

    pub fn adapter_name(&self) -> &'static str {
        self.adapter.name()
    }

    pub fn backup_table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| format!("{}{}", t, self.suffix)).collect()
    }

    pub fn take_snapshot_default(&mut self) -> Result<()> {
        self.take_snapshot(SnapshotOptions::default())
    }

    /// Copy every tracked table to `table + suffix`.
    ///
    /// Stops at the first failing table; tables already copied keep their
    /// backups. The connection is closed on every path.
    pub fn take_snapshot(&mut self, options: SnapshotOptions) -> Result<()> {
        if options.revert_previous && self.state == SnapshotState::Snapshotted {
            self.revert_changes()?;
        }
        if let Some(tables) = options.tables {
            self.tables = tables;
        }

        self.check_dependencies()?;
        let mut conn = ScopedConnection::open(self.adapter.as_mut(), &self.connection_string)?;

        if self.tables.is_empty() || options.force_discovery {
            self.tables = conn.list_tables()?;
            info!(count = self.tables.len(), "discovered tables");
        }

        for table in &self.tables {
            info!(table = %table, suffix = %self.suffix, "copying table");
            if !conn.copy_table(table, &self.suffix)? {
                return Err(ReversionError::copy(
                    table,
                    &self.suffix,
                    SqlError::Precondition("adapter reported failure".into()),
                ));
            }
        }

        conn.close()?;
        self.state = SnapshotState::Snapshotted;
        Ok(())
    }

    /// Restore every tracked table from its backup and drop the backups.
    pub fn revert_changes(&mut self) -> Result<()> {
        if self.state != SnapshotState::Snapshotted || self.tables.is_empty() {
            return Err(ReversionError::NoTrackedTables);
        }

        self.check_dependencies()?;
        let mut conn = ScopedConnection::open(self.adapter.as_mut(), &self.connection_string)?;

        for table in &self.tables {
            info!(table = %table, suffix = %self.suffix, "restoring table");
            if !conn.restore_table(table, &self.suffix)? {
                return Err(ReversionError::restore(
                    table,
                    &self.suffix,
                    SqlError::Precondition("adapter reported failure".into()),
                ));
            }
        }

        conn.close()?;
        self.state = SnapshotState::Reverted;
        Ok(())
    }

    /// Track backups created earlier with this suffix, e.g. by another process.
    pub fn adopt_snapshot(&mut self, tables: Vec<String>) {
        self.tables = tables;
        self.state = SnapshotState::Snapshotted;
    }

    fn check_dependencies(&self) -> Result<()> {
        if self.connection_string.trim().is_empty() {
            return Err(ReversionError::Configuration(
                "no valid connection string could be found or has been set".into(),
            ));
        }
        Ok(())
    }
}

/// Keeps the adapter's connection open for one batch and closes it on drop.
struct ScopedConnection<'a> {
    adapter: &'a mut dyn DatabaseAdapter,
    closed: bool,
}

impl<'a> ScopedConnection<'a> {
    fn open(adapter: &'a mut dyn DatabaseAdapter, connection_string: &str) -> Result<Self> {
        adapter.open_connection(connection_string)?;
        Ok(Self { adapter, closed: false })
    }

    fn close(mut self) -> Result<()> {
        self.closed = true;
        self.adapter.close_connection()
    }
}

impl<'a> Deref for ScopedConnection<'a> {
    type Target = dyn DatabaseAdapter + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.adapter
    }
}

impl<'a> DerefMut for ScopedConnection<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.adapter
    }
}

impl Drop for ScopedConnection<'_> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.adapter.close_connection() {
                warn!(error = %err, "failed to close connection after error");
            }
        }
    }
}
