use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "rewind.json";
pub const CONNECTION_ENV_VAR: &str = "REWIND_CONNECTION_STRING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEntry {
    pub name: String,
    pub connection_string: String,
}

/// Named connection strings in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStrings {
    #[serde(default)]
    pub connection_strings: Vec<ConnectionEntry>,
}

impl ConnectionStrings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Config file found from `start` upwards, then the environment override.
    pub fn discover(start: &Path) -> Result<Self> {
        let env_value = std::env::var(CONNECTION_ENV_VAR).ok();
        Self::discover_with(start, env_value)
    }

    pub fn discover_with(start: &Path, env_value: Option<String>) -> Result<Self> {
        let mut strings = match find_config_file(start) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
            strings.register(CONNECTION_ENV_VAR, value);
        }
        Ok(strings)
    }

    /// Adds an entry; a name registered twice keeps only its latest position.
    pub fn register(&mut self, name: impl Into<String>, connection_string: impl Into<String>) {
        let name = name.into();
        self.connection_strings.retain(|e| e.name != name);
        self.connection_strings.push(ConnectionEntry {
            name,
            connection_string: connection_string.into(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&ConnectionEntry> {
        self.connection_strings.iter().find(|e| e.name == name)
    }

    /// Most recently registered entry.
    pub fn last(&self) -> Option<&ConnectionEntry> {
        self.connection_strings.last()
    }

    pub fn is_empty(&self) -> bool {
        self.connection_strings.is_empty()
    }
}

pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_is_most_recent_registration() {
        let mut strings = ConnectionStrings::new();
        assert!(strings.last().is_none());

        strings.register("primary", "sqlite://a.db");
        strings.register("reporting", "sqlite://b.db");
        assert_eq!(strings.last().unwrap().name, "reporting");

        strings.register("primary", "sqlite://c.db");
        assert_eq!(strings.last().unwrap().connection_string, "sqlite://c.db");
        assert_eq!(strings.connection_strings.len(), 2);
    }

    #[test]
    fn discovers_file_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"connection_strings":[{"name":"main","connection_string":"sqlite://main.db"}]}"#,
        )
        .unwrap();
        let nested = dir.path().join("tests").join("fixtures");
        fs::create_dir_all(&nested).unwrap();

        let strings = ConnectionStrings::discover_with(&nested, None).unwrap();
        assert_eq!(strings.get("main").unwrap().connection_string, "sqlite://main.db");
    }

    #[test]
    fn environment_value_is_registered_last() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"connection_strings":[{"name":"main","connection_string":"sqlite://main.db"}]}"#,
        )
        .unwrap();

        let strings = ConnectionStrings::discover_with(dir.path(), Some("sqlite://env.db".into())).unwrap();
        let last = strings.last().unwrap();
        assert_eq!(last.name, CONNECTION_ENV_VAR);
        assert_eq!(last.connection_string, "sqlite://env.db");
    }

    #[test]
    fn empty_file_is_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "  \n").unwrap();
        assert!(ConnectionStrings::load(&path).unwrap().is_empty());
    }
}
