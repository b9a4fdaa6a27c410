/// The SQL a provider needs for discovery, copy and restore.
///
/// Statements go through [`super::template::render`]. Queries marked "bound"
/// take the table name as their single positional parameter instead of a token.
#[derive(Debug)]
pub struct Dialect {
    pub name: &'static str,
    pub quotes: (char, char),
    pub list_tables: &'static str,
    /// bound: returns the insertable column names of a table, in order
    pub list_columns: &'static str,
    /// bound: returns the table name when it exists
    pub table_exists: &'static str,
    /// bound: returns identity column names; `None` when the provider accepts
    /// explicit key values without a toggle
    pub identity_columns: Option<&'static str>,
    pub identity_insert_on: Option<&'static str>,
    pub identity_insert_off: Option<&'static str>,
    pub copy_table: &'static str,
    pub clear_table: &'static str,
    pub insert_from_backup: &'static str,
    pub drop_backup: &'static str,
}

pub const MSSQL: Dialect = Dialect {
    name: "mssql",
    quotes: ('[', ']'),
    list_tables: "SELECT [name] FROM [{db.name}].sys.tables WHERE is_ms_shipped = 0",
    list_columns: "SELECT c.[name] FROM sys.columns c \
                   WHERE c.object_id = OBJECT_ID(@P1) AND c.is_computed = 0 \
                   AND TYPE_NAME(c.system_type_id) <> 'timestamp' \
                   ORDER BY c.column_id",
    table_exists: "SELECT [name] FROM sys.tables WHERE [name] = @P1",
    identity_columns: Some("SELECT [name] FROM sys.identity_columns WHERE object_id = OBJECT_ID(@P1)"),
    identity_insert_on: Some("SET IDENTITY_INSERT [{table.name}] ON"),
    identity_insert_off: Some("SET IDENTITY_INSERT [{table.name}] OFF"),
    copy_table: "SELECT * INTO [{table.name}{post}] FROM [{table.name}]",
    clear_table: "DELETE FROM [{table.name}]",
    insert_from_backup: "INSERT INTO [{table.name}] ({columns}) SELECT {columns} FROM [{table.name}{post}]",
    drop_backup: "DROP TABLE [{table.name}{post}]",
};

pub const SQLITE: Dialect = Dialect {
    name: "sqlite",
    quotes: ('"', '"'),
    list_tables: "SELECT name FROM \"{db.name}\".sqlite_master \
                  WHERE type = 'table' AND substr(name, 1, 7) <> 'sqlite_' ORDER BY name",
    list_columns: "SELECT name FROM pragma_table_info(?1) ORDER BY cid",
    table_exists: "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
    identity_columns: None,
    identity_insert_on: None,
    identity_insert_off: None,
    copy_table: "CREATE TABLE \"{table.name}{post}\" AS SELECT * FROM \"{table.name}\"",
    clear_table: "DELETE FROM \"{table.name}\"",
    insert_from_backup: "INSERT INTO \"{table.name}\" ({columns}) SELECT {columns} FROM \"{table.name}{post}\"",
    drop_backup: "DROP TABLE \"{table.name}{post}\"",
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::template::{TemplateContext, render};

    #[test]
    fn mssql_restore_statements() {
        let columns = vec!["Id".to_string(), "Email".to_string()];
        let ctx = TemplateContext::new(MSSQL.quotes).table("Users").suffix("1200").columns(&columns);

        assert_eq!(render(MSSQL.clear_table, &ctx).unwrap(), "DELETE FROM [Users]");
        assert_eq!(
            render(MSSQL.insert_from_backup, &ctx).unwrap(),
            "INSERT INTO [Users] ([Id], [Email]) SELECT [Id], [Email] FROM [Users1200]"
        );
        assert_eq!(
            render(MSSQL.identity_insert_on.unwrap(), &ctx).unwrap(),
            "SET IDENTITY_INSERT [Users] ON"
        );
        assert_eq!(render(MSSQL.drop_backup, &ctx).unwrap(), "DROP TABLE [Users1200]");
    }

    #[test]
    fn mssql_discovery_is_scoped_to_database() {
        let ctx = TemplateContext::new(MSSQL.quotes).database("Shop");
        assert_eq!(
            render(MSSQL.list_tables, &ctx).unwrap(),
            "SELECT [name] FROM [Shop].sys.tables WHERE is_ms_shipped = 0"
        );
    }

    #[test]
    fn sqlite_copy_statement() {
        let ctx = TemplateContext::new(SQLITE.quotes).table("Orders").suffix("0930");
        assert_eq!(
            render(SQLITE.copy_table, &ctx).unwrap(),
            "CREATE TABLE \"Orders0930\" AS SELECT * FROM \"Orders\""
        );
    }
}
