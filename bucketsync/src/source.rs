//! The desired file set: in-memory records, a directory on disk, or both.

use std::path::PathBuf;

use crate::error::SyncOutcome;
use crate::record::FileRecord;
use crate::scan::scan_dir;

#[derive(Clone, Debug, Default)]
pub struct FileSource {
    /// In-memory files.
    pub files: Vec<FileRecord>,
    /// Local directory to scan (absolute or relative).
    pub dir: Option<PathBuf>,
    /// Ignore globs for files under `dir`, e.g. `**/node_modules/**`.
    pub ignore: Vec<String>,
}

impl FileSource {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn from_files(files: Vec<FileRecord>) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }

    pub fn ignoring(mut self, pattern: impl Into<String>) -> Self {
        self.ignore.push(pattern.into());
        self
    }

    /// Explicit files first, followed by the scanned directory.
    pub async fn resolve(&self) -> SyncOutcome<Vec<FileRecord>> {
        let mut files = self.files.clone();
        if let Some(ref dir) = self.dir {
            files.extend(scan_dir(dir, &self.ignore).await?);
        }
        Ok(files)
    }
}
