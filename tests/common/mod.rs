#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use rewind::error::{ReversionError, Result, SqlError};
use rewind::DatabaseAdapter;
use rusqlite::Connection;

#[derive(Debug, Default)]
pub struct MockState {
    pub opens: usize,
    pub closes: usize,
    pub open: bool,
    pub calls: Vec<String>,
    pub discoverable: Vec<String>,
    pub fail_copy_on: Option<String>,
    pub fail_restore_on: Option<String>,
    pub soft_fail_copy_on: Option<String>,
    pub reject_open: bool,
}

/// Adapter that records every call instead of touching a database.
pub struct MockAdapter {
    pub state: Arc<Mutex<MockState>>,
}

impl MockAdapter {
    pub fn new(discoverable: &[&str]) -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState {
            discoverable: discoverable.iter().map(|s| s.to_string()).collect(),
            ..MockState::default()
        }));
        (Self { state: state.clone() }, state)
    }

    fn require_open(state: &MockState) -> Result<()> {
        if state.open {
            Ok(())
        } else {
            Err(ReversionError::Connection("not open".into()))
        }
    }
}

impl DatabaseAdapter for MockAdapter {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn open_connection(&mut self, connection_string: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.opens += 1;
        state.calls.push(format!("open {}", connection_string));
        if state.reject_open {
            return Err(ReversionError::Connection("rejected".into()));
        }
        state.open = true;
        Ok(())
    }

    fn close_connection(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.closes += 1;
        state.calls.push("close".into());
        state.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    fn list_tables(&mut self) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        Self::require_open(&state)?;
        state.calls.push("list".into());
        Ok(state.discoverable.clone())
    }

    fn copy_table(&mut self, table: &str, suffix: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        Self::require_open(&state)?;
        state.calls.push(format!("copy {}{}", table, suffix));
        if state.fail_copy_on.as_deref() == Some(table) {
            return Err(ReversionError::Copy {
                table: table.into(),
                backup: format!("{}{}", table, suffix),
                source: SqlError::Precondition("boom".into()),
            });
        }
        Ok(state.soft_fail_copy_on.as_deref() != Some(table))
    }

    fn restore_table(&mut self, table: &str, suffix: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        Self::require_open(&state)?;
        state.calls.push(format!("restore {}{}", table, suffix));
        if state.fail_restore_on.as_deref() == Some(table) {
            return Err(ReversionError::Restore {
                table: table.into(),
                backup: format!("{}{}", table, suffix),
                source: SqlError::Precondition("boom".into()),
            });
        }
        Ok(true)
    }
}

/// Users (with AUTOINCREMENT ids that have gaps) and Orders.
pub fn create_shop_db(path: &Path) -> Connection {
    let conn = Connection::open(path).expect("create database");
    conn.execute_batch(
        "CREATE TABLE Users (Id INTEGER PRIMARY KEY AUTOINCREMENT, Email TEXT NOT NULL);
         CREATE TABLE Orders (Id INTEGER PRIMARY KEY, UserId INTEGER NOT NULL, Total REAL NOT NULL);
         INSERT INTO Users (Id, Email) VALUES (1, 'ada@example.com'), (4, 'grace@example.com'), (9, 'linus@example.com');
         INSERT INTO Orders (Id, UserId, Total) VALUES (1, 1, 10.5), (2, 4, 99.0), (3, 9, 12.25), (4, 9, 1.0);",
    )
    .expect("seed database");
    conn
}

pub fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get::<_, String>(0))
        .unwrap()
        .collect::<std::result::Result<Vec<_>, _>>()
        .unwrap()
}

pub fn users(conn: &Connection) -> Vec<(i64, String)> {
    let mut stmt = conn.prepare("SELECT Id, Email FROM Users ORDER BY Id").unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<std::result::Result<Vec<_>, _>>()
        .unwrap()
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| row.get(0))
        .unwrap()
}

pub fn connection_string(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}
