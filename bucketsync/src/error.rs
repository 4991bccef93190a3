//! Sync error types.

use std::fmt;
use std::path::PathBuf;

use bucketsync_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncOutcome<T> = Result<T, SyncError>;

/// A single file that could not be uploaded.
#[derive(Debug)]
pub struct UploadFailure {
    /// Position of the file in the batch it was submitted with.
    pub index: usize,
    pub key: String,
    pub reason: UploadFailureReason,
}

#[derive(Debug)]
pub enum UploadFailureReason {
    MissingKey,
    MissingContent,
    Storage(StorageError),
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            UploadFailureReason::MissingKey => {
                write!(f, "files[{}]: missing required 'key' property", self.index)
            }
            UploadFailureReason::MissingContent => {
                write!(f, "files[{}] ({}): missing required 'content' property", self.index, self.key)
            }
            UploadFailureReason::Storage(e) => write!(f, "{}: {e}", self.key),
        }
    }
}

/// A local file that could not be read during a scan.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.source)
    }
}

/// Errors that can occur during file discovery, diffing and syncing.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),

    #[error("folder '{}' not found", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("failed to read {} file(s): {}", .failures.len(), join(.failures))]
    Scan { failures: Vec<ScanFailure> },

    #[error("{} upload(s) failed: {}", .failures.len(), join(.failures))]
    Upload { failures: Vec<UploadFailure> },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
