use std::path::PathBuf;

use bucketsync::{ScanFailure, SyncError, UploadFailure, UploadFailureReason};
use bucketsync_storage::StorageError;

#[test]
fn missing_argument_display() {
    let err = SyncError::MissingArgument("bucket");
    assert_eq!(err.to_string(), "missing required argument 'bucket'");
}

#[test]
fn directory_not_found_display() {
    let err = SyncError::DirectoryNotFound(PathBuf::from("/tmp/site"));
    assert_eq!(err.to_string(), "folder '/tmp/site' not found");
}

#[test]
fn upload_display_lists_each_failure() {
    let err = SyncError::Upload {
        failures: vec![
            UploadFailure {
                index: 0,
                key: String::new(),
                reason: UploadFailureReason::MissingKey,
            },
            UploadFailure {
                index: 3,
                key: "img/a.png".into(),
                reason: UploadFailureReason::Storage(StorageError::S3("access denied".into())),
            },
        ],
    };
    assert_eq!(
        err.to_string(),
        "2 upload(s) failed: files[0]: missing required 'key' property; \
         img/a.png: S3 operation failed: access denied"
    );
}

#[test]
fn scan_display_lists_each_path() {
    let err = SyncError::Scan {
        failures: vec![ScanFailure {
            path: PathBuf::from("site/locked.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        }],
    };
    assert_eq!(
        err.to_string(),
        "failed to read 1 file(s): site/locked.html: permission denied"
    );
}

#[test]
fn from_storage_error() {
    let err: SyncError = StorageError::BatchTooLarge {
        requested: 1200,
        max: 1000,
    }
    .into();
    assert_eq!(
        err.to_string(),
        "storage error: delete batch of 1200 keys exceeds the 1000 key limit"
    );
}
