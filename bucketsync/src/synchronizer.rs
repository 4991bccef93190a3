//! Directory-to-bucket synchronization.
//!
//! A sync resolves the desired file set, diffs it against the caller's
//! snapshot of the bucket, uploads new or changed files with bounded
//! concurrency, then deletes every object whose key disappeared in one
//! batched call. Nothing is remembered between calls; the snapshot passed
//! in is the only link to previous runs.

use std::sync::Arc;

use bucketsync_storage::store::check_delete_batch;
use bucketsync_storage::{ObjectRef, ObjectStore, StorageConfig, remove_objects};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::diff::{FileDiff, diff_files, diff_source};
use crate::error::{SyncError, SyncOutcome};
use crate::record::{FileRecord, RemoteObjectRecord};
use crate::source::FileSource;
use crate::upload::{UploadedFile, known_objects, put_files, upload_files, validate_files};

/// Parameters for a single sync.
#[derive(Clone, Debug, Default)]
pub struct SyncRequest {
    pub bucket: String,
    pub source: FileSource,
    /// Objects believed to be in the bucket already. Files matching one of
    /// these on key and hash are skipped.
    pub existing_objects: Vec<RemoteObjectRecord>,
    /// Treat the file set as empty, deleting every existing object.
    pub remove: bool,
    /// Suppress the warning logged when the bucket does not exist.
    pub no_warning: bool,
}

impl SyncRequest {
    pub fn new(bucket: impl Into<String>, source: FileSource) -> Self {
        Self {
            bucket: bucket.into(),
            source,
            ..Self::default()
        }
    }

    pub fn with_existing(mut self, existing_objects: Vec<RemoteObjectRecord>) -> Self {
        self.existing_objects = existing_objects;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// True if at least one file was uploaded or deleted.
    pub updated: bool,
    /// Every file in the resolved file set.
    pub src_files: Vec<FileRecord>,
    /// Files uploaded because they were new or had changed.
    pub uploaded_files: Vec<FileRecord>,
    /// Existing objects removed because their key is no longer present.
    pub deleted_files: Vec<RemoteObjectRecord>,
}

impl SyncResult {
    /// Snapshot of the bucket after this sync, for the next call.
    pub fn remote_state(&self) -> Vec<RemoteObjectRecord> {
        self.src_files.iter().map(FileRecord::to_remote).collect()
    }
}

/// Syncs file sets into buckets through an injected [`ObjectStore`].
#[derive(Clone)]
pub struct Synchronizer {
    store: Arc<dyn ObjectStore>,
    upload_concurrency: usize,
}

impl Synchronizer {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_config(store, &StorageConfig::default())
    }

    pub fn with_config(store: Arc<dyn ObjectStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            upload_concurrency: config.upload_concurrency.max(1),
        }
    }

    pub fn upload_concurrency(&self) -> usize {
        self.upload_concurrency
    }

    /// Brings `request.bucket` in line with the resolved file set.
    ///
    /// A missing or unreachable bucket is not an error: the sync is skipped
    /// and an empty result returned. Upload failures are aggregated and no
    /// partial result is returned.
    pub async fn sync(&self, request: &SyncRequest) -> SyncOutcome<SyncResult> {
        let bucket = request.bucket.as_str();
        if bucket.is_empty() {
            return Err(SyncError::MissingArgument("bucket"));
        }

        let files = if request.remove {
            Vec::new()
        } else {
            request.source.resolve().await?
        };
        validate_files(&files)?;

        let FileDiff {
            src_files,
            changed_files,
            deleted_files,
            ..
        } = diff_files(files, &request.existing_objects);
        check_delete_batch(deleted_files.len())?;

        if !self.bucket_available(bucket, request.no_warning).await {
            return Ok(SyncResult::default());
        }

        // Failures report positions in the full file set, not the changed subset.
        let known = known_objects(&request.existing_objects);
        put_files(
            self.store.as_ref(),
            bucket,
            src_files
                .iter()
                .enumerate()
                .filter(|&(_, f)| !known.contains(&(f.key.as_str(), f.hash.as_str()))),
            self.upload_concurrency,
        )
        .await?;

        if !deleted_files.is_empty() {
            let refs: Vec<ObjectRef> = deleted_files
                .iter()
                .map(|r| ObjectRef::new(r.key.clone()))
                .collect();
            remove_objects(self.store.as_ref(), bucket, &refs).await?;
        }

        info!(
            "synced {bucket}: {} files, {} uploaded, {} deleted",
            src_files.len(),
            changed_files.len(),
            deleted_files.len()
        );

        Ok(SyncResult {
            updated: !changed_files.is_empty() || !deleted_files.is_empty(),
            src_files,
            uploaded_files: changed_files,
            deleted_files,
        })
    }

    async fn bucket_available(&self, bucket: &str, no_warning: bool) -> bool {
        let reason = match self.store.bucket_exists(bucket).await {
            Ok(true) => return true,
            Ok(false) => "does not exist (yet)".to_string(),
            Err(e) => format!("could not be reached ({e})"),
        };

        if no_warning {
            debug!("bucket '{bucket}' {reason}, sync skipped");
        } else {
            warn!("bucket '{bucket}' {reason}, sync skipped");
        }
        false
    }

    /// Uploads the resolved `source`, skipping files matching
    /// `ignore_objects` on key and hash.
    pub async fn upload(
        &self,
        bucket: &str,
        source: &FileSource,
        ignore_objects: &[RemoteObjectRecord],
    ) -> SyncOutcome<Vec<UploadedFile>> {
        if bucket.is_empty() {
            return Err(SyncError::MissingArgument("bucket"));
        }
        let files = source.resolve().await?;
        upload_files(
            self.store.as_ref(),
            bucket,
            &files,
            ignore_objects,
            self.upload_concurrency,
        )
        .await
    }

    /// Diffs the resolved `source` against `previous` without touching the
    /// bucket.
    pub async fn diff(
        &self,
        source: &FileSource,
        previous: &[RemoteObjectRecord],
    ) -> SyncOutcome<FileDiff> {
        diff_source(source, previous).await
    }
}
