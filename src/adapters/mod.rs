use crate::error::Result;

pub mod dialect;
#[cfg(feature = "mssql")]
pub mod mssql;
pub mod selector;
pub mod session;
pub mod sql;
pub mod sqlite;
pub mod template;

pub use sql::SqlAdapter;
pub use sqlite::SqliteAdapter;

#[cfg(feature = "mssql")]
pub use mssql::MsSqlAdapter;

/// Provider-specific connection handling and SQL behind one capability set.
pub trait DatabaseAdapter: Send {
    fn name(&self) -> &'static str;

    /// Open a live connection; it stays owned by the adapter until
    /// [`DatabaseAdapter::close_connection`] is called.
    fn open_connection(&mut self, connection_string: &str) -> Result<()>;

    /// Close the live connection. A no-op when nothing is open.
    fn close_connection(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Every non-system table in the connected database, in catalog order.
    fn list_tables(&mut self) -> Result<Vec<String>>;

    /// Create `table + suffix` as a structure and data copy of `table`.
    fn copy_table(&mut self, table: &str, suffix: &str) -> Result<bool>;

    /// Replace the rows of `table` with those of `table + suffix`, then drop the backup.
    fn restore_table(&mut self, table: &str, suffix: &str) -> Result<bool>;
}
