//! Shared test helpers.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bucketsync_storage::{
    ObjectData, ObjectRef, ObjectStore, PutObject, S3Store, StorageConfig, StorageError,
    StorageResult,
};
use uuid::Uuid;

/// In-memory object store that records every call it receives.
#[derive(Default)]
pub struct RecordingStore {
    pub buckets: Mutex<BTreeMap<String, BTreeMap<String, PutObject>>>,
    pub calls: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn with_bucket(bucket: &str) -> Self {
        let store = Self::default();
        store
            .buckets
            .lock()
            .unwrap()
            .insert(bucket.to_string(), BTreeMap::new());
        store
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn keys(&self, bucket: &str) -> BTreeSet<String> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        self.record(format!("exists {bucket}"));
        Ok(self.buckets.lock().unwrap().contains_key(bucket))
    }

    async fn put_object(&self, bucket: &str, object: PutObject) -> StorageResult<()> {
        self.record(format!("put {bucket}/{}", object.key));
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StorageError::NotFound(bucket.to_string()))?;
        objects.insert(object.key.clone(), object);
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, refs: &[ObjectRef]) -> StorageResult<()> {
        self.record(format!("delete {bucket} x{}", refs.len()));
        let mut buckets = self.buckets.lock().unwrap();
        if let Some(objects) = buckets.get_mut(bucket) {
            for r in refs {
                objects.remove(&r.key);
            }
        }
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectData> {
        self.record(format!("get {bucket}/{key}"));
        let buckets = self.buckets.lock().unwrap();
        buckets
            .get(bucket)
            .and_then(|b| b.get(key))
            .map(|o| ObjectData {
                body: o.body.clone(),
                content_type: o.content_type.clone(),
                content_length: o.effective_length(),
                etag: None,
            })
            .ok_or_else(|| StorageError::NotFound(format!("{bucket}/{key}")))
    }
}

/// Bucket used by the MinIO integration tests (docker-compose.test.yml).
pub const MINIO_BUCKET: &str = "bucketsync-test";

/// S3Store pointing at local MinIO.
pub async fn minio_store() -> S3Store {
    S3Store::connect(&StorageConfig::minio("http://localhost:9000")).await
}

/// Per-test unique key prefix to prevent collisions.
pub fn unique_prefix() -> String {
    format!("test-runs/{}", Uuid::new_v4())
}
