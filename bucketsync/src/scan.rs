//! Local file discovery.
//!
//! Walks a directory, drops files matching the ignore globs, then reads,
//! hashes and types every remaining file.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use mime_guess::mime;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ScanFailure, SyncError, SyncOutcome, io_err};
use crate::record::{FileRecord, content_hash};

/// Files read concurrently while scanning.
const READ_CONCURRENCY: usize = 10;

/// Essences outside `text/*` that still carry a charset.
const TEXTUAL_ESSENCES: [&str; 3] = ["application/json", "application/javascript", "application/xml"];

/// Scans `dir` recursively and returns one record per file, sorted by key.
///
/// `ignore` holds globs relative to `dir` (e.g. `**/node_modules/**`).
/// Read failures are collected and reported together.
pub async fn scan_dir(dir: &Path, ignore: &[String]) -> SyncOutcome<Vec<FileRecord>> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(SyncError::DirectoryNotFound(dir.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SyncError::DirectoryNotFound(dir.to_path_buf()));
        }
        Err(e) => return Err(io_err(dir, e)),
    }

    let ignore = build_ignore_set(ignore)?;
    let root = dir.to_path_buf();
    let paths = tokio::task::spawn_blocking(move || list_files(&root, &ignore)).await??;

    let files = read_files(paths).await?;
    debug!("scanned {} files under {}", files.len(), dir.display());
    Ok(files)
}

/// Reads and describes each (absolute path, relative path) pair.
///
/// Every path is attempted; unreadable ones are reported together.
async fn read_files(paths: Vec<(PathBuf, PathBuf)>) -> SyncOutcome<Vec<FileRecord>> {
    let reads: Vec<_> = stream::iter(paths)
        .map(|(file, relative)| async move {
            let result = tokio::fs::read(&file).await;
            (file, relative, result)
        })
        .buffered(READ_CONCURRENCY)
        .collect()
        .await;

    let mut files = Vec::with_capacity(reads.len());
    let mut failures = Vec::new();
    for (file, relative, result) in reads {
        match result {
            Ok(content) => files.push(record_for(&relative, content)),
            Err(source) => failures.push(ScanFailure { path: file, source }),
        }
    }
    if !failures.is_empty() {
        return Err(SyncError::Scan { failures });
    }

    files.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(files)
}

/// Compiles ignore globs. `*` does not cross `/`; use `**` for that.
pub fn build_ignore_set(patterns: &[String]) -> SyncOutcome<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    Ok(builder.build()?)
}

/// Lists regular files under `root` as (absolute path, relative path) pairs.
fn list_files(root: &Path, ignore: &GlobSet) -> SyncOutcome<Vec<(PathBuf, PathBuf)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            io_err(path, e.into())
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if ignore.is_match(object_key(relative)) {
            continue;
        }

        files.push((entry.path().to_path_buf(), relative.to_path_buf()));
    }

    Ok(files)
}

fn record_for(relative: &Path, content: Vec<u8>) -> FileRecord {
    let key = object_key(relative);
    FileRecord {
        path: relative.to_string_lossy().into_owned(),
        hash: content_hash(&content),
        content_length: content.len() as u64,
        content_type: content_type_for(&key),
        cache_control: None,
        content: Some(content),
        key,
    }
}

/// Object key for a relative path: components joined with `/`.
pub fn object_key(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Content type guessed from the file extension; empty when unknown.
///
/// Textual types carry `; charset=utf-8`.
pub fn content_type_for(name: &str) -> String {
    let Some(guess) = mime_guess::from_path(name).first() else {
        return String::new();
    };

    let essence = guess.essence_str();
    if guess.type_() == mime::TEXT || TEXTUAL_ESSENCES.iter().any(|t| *t == essence) {
        format!("{essence}; charset=utf-8")
    } else {
        essence.to_string()
    }
}
