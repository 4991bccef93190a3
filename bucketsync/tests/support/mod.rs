//! Shared test helpers: an in-memory object store and record builders.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bucketsync::{FileRecord, RemoteObjectRecord};
use bucketsync_storage::{ObjectData, ObjectRef, ObjectStore, PutObject, StorageError, StorageResult};

/// In-memory object store with call recording and failure injection.
#[derive(Default)]
pub struct MockStore {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, PutObject>>>,
    calls: Mutex<Vec<String>>,
    failing_keys: Mutex<HashSet<String>>,
    probe_error: Mutex<Option<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockStore {
    pub fn with_bucket(bucket: &str) -> Self {
        let store = Self::default();
        store.create_bucket(bucket);
        store
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default();
    }

    /// Puts to `key` fail with an S3 error.
    pub fn fail_key(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// The existence probe fails with an S3 error.
    pub fn fail_probe(&self, message: &str) {
        *self.probe_error.lock().unwrap() = Some(message.to_string());
    }

    /// Seeds an object without recording a call.
    pub fn seed(&self, bucket: &str, key: &str, body: &[u8]) {
        self.buckets
            .lock()
            .unwrap()
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), PutObject::new(key, body.to_vec()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than the existence probe.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("exists "))
            .collect()
    }

    pub fn put_count(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("put ")).count()
    }

    pub fn keys(&self, bucket: &str) -> BTreeSet<String> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<PutObject> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|b| b.get(key))
            .cloned()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        self.record(format!("exists {bucket}"));
        if let Some(message) = self.probe_error.lock().unwrap().clone() {
            return Err(StorageError::S3(message));
        }
        Ok(self.buckets.lock().unwrap().contains_key(bucket))
    }

    async fn put_object(&self, bucket: &str, object: PutObject) -> StorageResult<()> {
        self.record(format!("put {bucket}/{}", object.key));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_keys.lock().unwrap().contains(&object.key) {
            return Err(StorageError::S3(format!("upload failed for {}", object.key)));
        }

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
        self.object(bucket, key)
            .map(|o| ObjectData {
                content_length: o.effective_length(),
                body: o.body,
                content_type: o.content_type,
                etag: None,
            })
            .ok_or_else(|| StorageError::NotFound(format!("{bucket}/{key}")))
    }
}

/// In-memory file whose hash is set explicitly.
pub fn file(key: &str, hash: &str) -> FileRecord {
    FileRecord {
        hash: hash.to_string(),
        ..FileRecord::from_bytes(key, format!("content of {key}").into_bytes())
    }
}

pub fn remote(key: &str, hash: &str) -> RemoteObjectRecord {
    RemoteObjectRecord::new(key, hash)
}

pub fn keys_of(files: &[FileRecord]) -> Vec<&str> {
    files.iter().map(|f| f.key.as_str()).collect()
}

pub fn remote_keys(records: &[RemoteObjectRecord]) -> Vec<&str> {
    records.iter().map(|r| r.key.as_str()).collect()
}

/// Writes `files` (relative path, content) under `root`.
pub fn write_tree(root: &std::path::Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }
}

/// Log output captured by [`capture_logs`].
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Routes events at `DEBUG` and above into a buffer while the guard lives.
///
/// The guard is thread-local, which suits `#[tokio::test]`'s current-thread
/// runtime.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}
