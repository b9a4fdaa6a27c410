use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::config::SessionRecord;

pub const SESSION_DIR: &str = ".rewind";
const SESSION_FILE: &str = "session.json";

pub fn session_path(root: &Path) -> PathBuf {
    root.join(SESSION_DIR).join(SESSION_FILE)
}

pub fn load_session(root: &Path) -> Result<Option<SessionRecord>> {
    let path = session_path(root);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    let record = serde_json::from_str::<SessionRecord>(&content)
        .map_err(|e| anyhow!("corrupt session record at {}: {}", path.display(), e))?;
    Ok(Some(record))
}

pub fn save_session(root: &Path, record: &SessionRecord) -> Result<()> {
    let path = session_path(root);
    let dir = path.parent().ok_or_else(|| anyhow!("invalid session path"))?;
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(record)?;
    // Write atomically: temp file then rename
    let tmp = dir.join("session.json.tmp");
    fs::write(&tmp, json)?;
    if path.exists() {
        let _ = fs::remove_file(&path);
    }
    fs::rename(&tmp, &path)?;
    Ok(())
}

pub fn clear_session(root: &Path) -> Result<()> {
    let path = session_path(root);
    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_session(dir.path()).unwrap().is_none());

        let record = SessionRecord::new(vec!["Users".into(), "Orders".into()], "1200", "sqlite");
        save_session(dir.path(), &record).unwrap();
        assert_eq!(load_session(dir.path()).unwrap(), Some(record));

        clear_session(dir.path()).unwrap();
        assert!(load_session(dir.path()).unwrap().is_none());
        clear_session(dir.path()).unwrap();
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(SESSION_DIR)).unwrap();
        fs::write(session_path(dir.path()), "{not json").unwrap();
        assert!(load_session(dir.path()).is_err());
    }
}
