//! File-tree to bucket synchronization.
//!
//! Given a desired file set (in memory, on disk, or both) and a snapshot of
//! what the bucket already holds, [`Synchronizer::sync`] uploads new and
//! changed files and deletes objects whose key disappeared. Files are
//! compared by key and SHA-256 content hash.

pub mod diff;
pub mod error;
pub mod record;
pub mod scan;
pub mod source;
pub mod synchronizer;
pub mod upload;

pub use diff::{FileDiff, diff_files};
pub use error::{ScanFailure, SyncError, SyncOutcome, UploadFailure, UploadFailureReason};
pub use record::{FileRecord, RemoteObjectRecord, content_hash};
pub use scan::scan_dir;
pub use source::FileSource;
pub use synchronizer::{SyncRequest, SyncResult, Synchronizer};
pub use upload::{UploadedFile, upload_files};
