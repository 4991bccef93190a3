//! The object store seam.
//!
//! Everything above this crate talks to storage through [`ObjectStore`], so
//! the S3 client can be swapped for an in-memory double in tests.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::types::{ObjectData, ObjectRef, PutObject};

/// Maximum number of keys a single batched delete may carry.
pub const MAX_DELETE_BATCH: usize = 1000;

/// Minimal remote key/value blob store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lightweight existence probe for a bucket.
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Creates or replaces a single object.
    async fn put_object(&self, bucket: &str, object: PutObject) -> StorageResult<()>;

    /// Deletes up to [`MAX_DELETE_BATCH`] objects in one request.
    async fn delete_objects(&self, bucket: &str, objects: &[ObjectRef]) -> StorageResult<()>;

    /// Downloads a single object.
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectData>;
}

/// Checks a delete batch against [`MAX_DELETE_BATCH`].
pub fn check_delete_batch(count: usize) -> StorageResult<()> {
    if count > MAX_DELETE_BATCH {
        return Err(StorageError::BatchTooLarge {
            requested: count,
            max: MAX_DELETE_BATCH,
        });
    }
    Ok(())
}

/// Uploads an object after validating the request.
pub async fn put_object(
    store: &dyn ObjectStore,
    bucket: &str,
    object: PutObject,
) -> StorageResult<()> {
    if bucket.is_empty() {
        return Err(StorageError::MissingArgument("bucket"));
    }
    if object.key.is_empty() {
        return Err(StorageError::MissingArgument("key"));
    }
    store.put_object(bucket, object).await
}

/// Downloads an object after validating the request.
pub async fn get_object(store: &dyn ObjectStore, bucket: &str, key: &str) -> StorageResult<ObjectData> {
    if bucket.is_empty() {
        return Err(StorageError::MissingArgument("bucket"));
    }
    if key.is_empty() {
        return Err(StorageError::MissingArgument("key"));
    }
    store.get_object(bucket, key).await
}

/// Removes objects from a bucket in a single batched call.
///
/// An empty batch is a no-op. Oversized batches are rejected before the
/// store is contacted.
pub async fn remove_objects(
    store: &dyn ObjectStore,
    bucket: &str,
    objects: &[ObjectRef],
) -> StorageResult<()> {
    if bucket.is_empty() {
        return Err(StorageError::MissingArgument("bucket"));
    }
    if objects.is_empty() {
        return Ok(());
    }
    check_delete_batch(objects.len())?;

    let objects: Vec<ObjectRef> = objects
        .iter()
        .filter(|o| !o.key.is_empty())
        .cloned()
        .collect();
    if objects.is_empty() {
        return Ok(());
    }

    store.delete_objects(bucket, &objects).await?;
    debug!("removed {} objects from {bucket}", objects.len());
    Ok(())
}
