//! Comparison of a file set against a remote snapshot.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::SyncOutcome;
use crate::record::{FileRecord, RemoteObjectRecord};
use crate::source::FileSource;

/// Difference between the local files and a list of previously known objects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    /// True if at least one file changed, was created, or was deleted.
    pub diff: bool,
    pub src_files: Vec<FileRecord>,
    /// Same key and same hash as a previous object.
    pub unchanged_files: Vec<FileRecord>,
    /// New files, or files whose hash differs.
    pub changed_files: Vec<FileRecord>,
    /// Previous objects whose key no longer exists locally.
    pub deleted_files: Vec<RemoteObjectRecord>,
}

/// Splits `files` into unchanged and changed, and finds deleted objects.
///
/// Deletion is decided by key alone; change by key and hash.
pub fn diff_files(files: Vec<FileRecord>, previous: &[RemoteObjectRecord]) -> FileDiff {
    let deleted_files = deleted_objects(&files, previous);

    let known: HashSet<(&str, &str)> = previous
        .iter()
        .map(|r| (r.key.as_str(), r.hash.as_str()))
        .collect();
    let (unchanged_files, changed_files): (Vec<_>, Vec<_>) = files
        .iter()
        .cloned()
        .partition(|f| known.contains(&(f.key.as_str(), f.hash.as_str())));

    FileDiff {
        diff: !changed_files.is_empty() || !deleted_files.is_empty(),
        src_files: files,
        unchanged_files,
        changed_files,
        deleted_files,
    }
}

/// Previous objects whose key is absent from `files`.
pub fn deleted_objects(
    files: &[FileRecord],
    previous: &[RemoteObjectRecord],
) -> Vec<RemoteObjectRecord> {
    let keys: HashSet<&str> = files.iter().map(|f| f.key.as_str()).collect();
    previous
        .iter()
        .filter(|r| !keys.contains(r.key.as_str()))
        .cloned()
        .collect()
}

/// Resolves `source` and diffs it against `previous`. No network calls.
pub async fn diff_source(
    source: &FileSource,
    previous: &[RemoteObjectRecord],
) -> SyncOutcome<FileDiff> {
    let files = source.resolve().await?;
    Ok(diff_files(files, previous))
}
