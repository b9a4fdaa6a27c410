use crate::error::SqlError;

/// A live provider connection, held by an adapter for the length of one batch.
pub trait SqlSession: Sized + Send {
    fn open(connection_string: &str) -> Result<Self, SqlError>;

    /// Name substituted for `{db.name}`.
    fn database_name(&self) -> &str;

    /// Run one statement batch, discarding any rows.
    fn execute(&mut self, sql: &str) -> Result<(), SqlError>;

    /// Run a query and collect the first column of every row as text.
    fn query_strings(&mut self, sql: &str, param: Option<&str>) -> Result<Vec<String>, SqlError>;

    fn close(self) -> Result<(), SqlError>;
}
