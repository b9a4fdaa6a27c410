use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// What a `snapshot` invocation left behind for a later `revert`.
///
/// The connection string is not stored; revert resolves it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub tables: Vec<String>,
    pub suffix: String,
    pub adapter: String,
    pub created_at: DateTime<Local>,
}

impl SessionRecord {
    pub fn new(tables: Vec<String>, suffix: impl Into<String>, adapter: impl Into<String>) -> Self {
        Self {
            tables,
            suffix: suffix.into(),
            adapter: adapter.into(),
            created_at: Local::now(),
        }
    }
}
