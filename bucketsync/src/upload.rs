//! Bounded-concurrency upload of a file set.

use std::collections::HashSet;

use bucketsync_storage::{ObjectStore, PutObject};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::debug;

use crate::error::{SyncError, SyncOutcome, UploadFailure, UploadFailureReason};
use crate::record::{FileRecord, RemoteObjectRecord};

/// Outcome for one file passed to [`upload_files`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    #[serde(flatten)]
    pub file: FileRecord,
    /// True if the file was skipped because the same key and hash already
    /// exist remotely.
    pub ignored: bool,
}

/// Uploads `files` to `bucket`, skipping those matching `ignore_objects` on
/// both key and hash.
///
/// At most `concurrency` uploads are in flight. Every upload is attempted;
/// if any fails, all failures are returned together.
pub async fn upload_files(
    store: &dyn ObjectStore,
    bucket: &str,
    files: &[FileRecord],
    ignore_objects: &[RemoteObjectRecord],
    concurrency: usize,
) -> SyncOutcome<Vec<UploadedFile>> {
    if bucket.is_empty() {
        return Err(SyncError::MissingArgument("bucket"));
    }
    if files.is_empty() {
        return Ok(Vec::new());
    }
    validate_files(files)?;

    let known = known_objects(ignore_objects);
    let is_known = |f: &FileRecord| known.contains(&(f.key.as_str(), f.hash.as_str()));

    put_files(
        store,
        bucket,
        files.iter().enumerate().filter(|&(_, f)| !is_known(f)),
        concurrency,
    )
    .await?;

    Ok(files
        .iter()
        .map(|f| UploadedFile {
            file: f.clone(),
            ignored: is_known(f),
        })
        .collect())
}

/// (key, hash) pairs of objects already present remotely.
pub(crate) fn known_objects(objects: &[RemoteObjectRecord]) -> HashSet<(&str, &str)> {
    objects
        .iter()
        .map(|r| (r.key.as_str(), r.hash.as_str()))
        .collect()
}

/// Rejects files without a key or content before anything is sent.
pub(crate) fn validate_files(files: &[FileRecord]) -> SyncOutcome<()> {
    let failures: Vec<UploadFailure> = files
        .iter()
        .enumerate()
        .filter_map(|(index, f)| {
            let reason = if f.key.is_empty() {
                UploadFailureReason::MissingKey
            } else if f.content.is_none() {
                UploadFailureReason::MissingContent
            } else {
                return None;
            };
            Some(UploadFailure {
                index,
                key: f.key.clone(),
                reason,
            })
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Upload { failures })
    }
}

/// Puts every `(index, file)` pair with at most `concurrency` in flight.
pub(crate) async fn put_files<'a>(
    store: &dyn ObjectStore,
    bucket: &str,
    files: impl Iterator<Item = (usize, &'a FileRecord)>,
    concurrency: usize,
) -> SyncOutcome<usize> {
    let results: Vec<Result<(), UploadFailure>> = stream::iter(files)
        .map(|(index, file)| async move {
            store
                .put_object(bucket, put_request(file))
                .await
                .map_err(|e| UploadFailure {
                    index,
                    key: file.key.clone(),
                    reason: UploadFailureReason::Storage(e),
                })
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let attempted = results.len();
    let failures: Vec<UploadFailure> = results.into_iter().filter_map(Result::err).collect();
    if !failures.is_empty() {
        return Err(SyncError::Upload { failures });
    }

    debug!("uploaded {attempted} files to {bucket}");
    Ok(attempted)
}

fn put_request(file: &FileRecord) -> PutObject {
    PutObject {
        key: file.key.clone(),
        body: file.content.clone().unwrap_or_default(),
        content_type: Some(file.content_type.clone()).filter(|t| !t.is_empty()),
        cache_control: file.cache_control.clone(),
        content_length: Some(file.content_length),
        ..PutObject::default()
    }
}
