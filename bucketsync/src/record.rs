//! File and remote object descriptors compared during a sync.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A file that should exist in the bucket.
///
/// Built by scanning a directory or supplied directly by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the scanned root.
    pub path: String,
    /// Object key, `/`-separated.
    pub key: String,
    /// Hex-encoded SHA-256 of the content.
    pub hash: String,
    pub content_length: u64,
    /// e.g. `application/javascript; charset=utf-8`
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(skip)]
    pub content: Option<Vec<u8>>,
}

impl FileRecord {
    /// Builds an in-memory file, deriving hash, length and content type.
    pub fn from_bytes(key: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let key = key.into();
        let content = content.into();
        Self {
            path: key.clone(),
            hash: content_hash(&content),
            content_length: content.len() as u64,
            content_type: crate::scan::content_type_for(&key),
            cache_control: None,
            content: Some(content),
            key,
        }
    }

    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    /// Snapshot of this file as it will exist remotely after upload.
    pub fn to_remote(&self) -> RemoteObjectRecord {
        RemoteObjectRecord {
            key: self.key.clone(),
            hash: self.hash.clone(),
        }
    }

    /// True if `remote` already holds this exact content under this key.
    pub fn matches(&self, remote: &RemoteObjectRecord) -> bool {
        self.key == remote.key && self.hash == remote.hash
    }
}

/// What the caller believes already exists in the bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteObjectRecord {
    pub key: String,
    pub hash: String,
}

impl RemoteObjectRecord {
    pub fn new(key: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            hash: hash.into(),
        }
    }
}

/// Hex-encoded SHA-256 digest used as the change detector.
pub fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
