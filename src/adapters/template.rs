//! Token substitution for dialect SQL.
//!
//! Table names, suffixes and column lists cannot be bound as parameters, so
//! every identifier is checked against `[A-Za-z0-9_]+` before it is spliced
//! into the statement text.

use std::path::Path;
use thiserror::Error;

pub const TABLE_TOKEN: &str = "{table.name}";
pub const SUFFIX_TOKEN: &str = "{post}";
pub const DATABASE_TOKEN: &str = "{db.name}";
pub const APP_PATH_TOKEN: &str = "{app.path}";
pub const COLUMNS_TOKEN: &str = "{columns}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("invalid {kind} '{value}': only ASCII letters, digits and '_' are allowed")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("no value supplied for token {0}")]
    MissingValue(&'static str),
}

/// Values available to a template. Unset fields are only an error when the
/// template actually references their token.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub table: Option<&'a str>,
    pub suffix: Option<&'a str>,
    pub database: Option<&'a str>,
    pub columns: Option<&'a [String]>,
    pub app_path: Option<&'a Path>,
    /// Opening and closing identifier quotes used for the column list.
    pub quotes: (char, char),
}

impl<'a> TemplateContext<'a> {
    pub fn new(quotes: (char, char)) -> Self {
        Self {
            table: None,
            suffix: None,
            database: None,
            columns: None,
            app_path: None,
            quotes,
        }
    }

    pub fn table(mut self, table: &'a str) -> Self {
        self.table = Some(table);
        self
    }

    pub fn suffix(mut self, suffix: &'a str) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn database(mut self, database: &'a str) -> Self {
        self.database = Some(database);
        self
    }

    pub fn columns(mut self, columns: &'a [String]) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn app_path(mut self, path: &'a Path) -> Self {
        self.app_path = Some(path);
        self
    }
}

pub fn validate_identifier(kind: &'static str, value: &str) -> Result<(), TemplateError> {
    let valid = !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(TemplateError::InvalidIdentifier { kind, value: value.to_string() })
    }
}

/// Replace every supported token in `template` with its validated value.
pub fn render(template: &str, ctx: &TemplateContext<'_>) -> Result<String, TemplateError> {
    let mut sql = template.to_string();

    if sql.contains(COLUMNS_TOKEN) {
        let columns = ctx.columns.ok_or(TemplateError::MissingValue(COLUMNS_TOKEN))?;
        if columns.is_empty() {
            return Err(TemplateError::MissingValue(COLUMNS_TOKEN));
        }
        let (open, close) = ctx.quotes;
        let mut quoted = Vec::with_capacity(columns.len());
        for column in columns {
            validate_identifier("column name", column)?;
            quoted.push(format!("{}{}{}", open, column, close));
        }
        sql = sql.replace(COLUMNS_TOKEN, &quoted.join(", "));
    }

    sql = substitute(sql, SUFFIX_TOKEN, "table suffix", ctx.suffix)?;
    sql = substitute(sql, DATABASE_TOKEN, "database name", ctx.database)?;
    sql = substitute(sql, TABLE_TOKEN, "table name", ctx.table)?;

    if sql.contains(APP_PATH_TOKEN) {
        let path = ctx.app_path.ok_or(TemplateError::MissingValue(APP_PATH_TOKEN))?;
        let literal = format!("'{}'", path.display().to_string().replace('\'', "''"));
        sql = sql.replace(APP_PATH_TOKEN, &literal);
    }

    Ok(sql)
}

fn substitute(
    sql: String,
    token: &'static str,
    kind: &'static str,
    value: Option<&str>,
) -> Result<String, TemplateError> {
    if !sql.contains(token) {
        return Ok(sql);
    }
    let value = value.ok_or(TemplateError::MissingValue(token))?;
    validate_identifier(kind, value)?;
    Ok(sql.replace(token, value))
}
