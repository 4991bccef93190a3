//! Snapshot file holding the objects the bucket is believed to contain.
//!
//! A JSON array of `{ "key", "hash" }` records. Writes go to `<path>.tmp`
//! first and are renamed into place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bucketsync::RemoteObjectRecord;

/// Loads the snapshot at `path`. A missing file is an empty snapshot.
pub fn load(path: &Path) -> Result<Vec<RemoteObjectRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid state file {}", path.display()))
}

/// Saves `records` to `path` atomically.
pub fn save(path: &Path, records: &[RemoteObjectRecord]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let tmp = tmp_path(path);
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace state file {}", path.display()))?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("state.json")).unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let records = vec![
            RemoteObjectRecord::new("index.html", "aa"),
            RemoteObjectRecord::new("css/site.css", "bb"),
        ];

        save(&path, &records).unwrap();

        assert_eq!(load(&path).unwrap(), records);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid state file"));
    }
}
