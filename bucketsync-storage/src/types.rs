//! Shared types for object storage operations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// Upload request for a single object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PutObject {
    pub key: String,
    pub body: Vec<u8>,
    /// e.g. `image/jpeg`
    pub content_type: Option<String>,
    /// e.g. `max-age=172800`
    pub cache_control: Option<String>,
    /// Defaults to the body length when unset.
    pub content_length: Option<u64>,
    /// e.g. `AES256`
    pub server_side_encryption: Option<String>,
    /// e.g. `STANDARD_IA`
    pub storage_class: Option<String>,
    /// URL-encoded tag set, e.g. `key1=value1&key2=value2`
    pub tagging: Option<String>,
}

impl PutObject {
    pub fn new(key: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Serializes `value` as pretty-printed JSON (two-space indent).
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> StorageResult<Self> {
        let body = serde_json::to_vec_pretty(value)?;
        Ok(Self::new(key, body).with_content_type("application/json; charset=utf-8"))
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    /// Length sent to the store: explicit `content_length` or the body size.
    pub fn effective_length(&self) -> u64 {
        match self.content_length {
            Some(len) if len > 0 => len,
            _ => self.body.len() as u64,
        }
    }
}

/// Reference to an object scheduled for deletion.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ObjectRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version: None,
        }
    }

    pub fn versioned(key: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version: Some(version.into()),
        }
    }
}

impl From<&str> for ObjectRef {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ObjectRef {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// A downloaded object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectData {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub content_length: u64,
    pub etag: Option<String>,
}

/// Static website settings read back from a bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteDetails {
    pub index_document: Option<String>,
    pub error_document: Option<String>,
    pub redirect_all_requests_to: Option<Redirect>,
}

/// Bucket location and endpoint details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketDetails {
    /// e.g. `ap-southeast-2`
    pub region: String,
    /// e.g. `http://my-bucket.s3.amazonaws.com`
    pub location: String,
    /// e.g. `http://my-bucket.s3.ap-southeast-2.amazonaws.com`
    pub regional_location: String,
    /// e.g. `my-bucket.s3.amazonaws.com`
    pub bucket_domain_name: String,
    /// e.g. `my-bucket.s3.ap-southeast-2.amazonaws.com`
    pub bucket_regional_domain_name: String,
    /// Only populated when website details were requested and configured.
    pub website: Option<WebsiteDetails>,
    /// e.g. `http://my-bucket.s3-website-ap-southeast-2.amazonaws.com`
    pub website_endpoint: Option<String>,
}

impl BucketDetails {
    /// Derives every endpoint from the bucket name and its region.
    pub fn new(bucket: &str, region: &str, website: Option<WebsiteDetails>) -> Self {
        let website_endpoint = website
            .as_ref()
            .map(|_| format!("http://{bucket}.s3-website-{region}.amazonaws.com"));
        let bucket_domain_name = format!("{bucket}.s3.amazonaws.com");
        let bucket_regional_domain_name = format!("{bucket}.s3.{region}.amazonaws.com");

        Self {
            region: region.to_string(),
            location: format!("http://{bucket_domain_name}"),
            regional_location: format!("http://{bucket_regional_domain_name}"),
            bucket_domain_name,
            bucket_regional_domain_name,
            website,
            website_endpoint,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub name: String,
    pub creation_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketOwner {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

/// All buckets visible to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketList {
    pub buckets: Vec<BucketSummary>,
    pub owner: BucketOwner,
}

/// Bucket creation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBucket {
    pub name: String,
    /// Canned ACL: `private`, `public-read`, `public-read-write`, `authenticated-read`.
    pub acl: String,
    pub region: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl CreateBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            acl: "private".to_string(),
            region: "us-east-1".to_string(),
            tags: BTreeMap::new(),
        }
    }
}

/// Redirect target for every request made to a website bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub hostname: String,
    #[serde(default = "default_protocol")]
    pub protocol: String,
}

fn default_protocol() -> String {
    "http".to_string()
}

impl Redirect {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            protocol: default_protocol(),
        }
    }
}

/// Static website configuration request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteSettings {
    pub bucket: String,
    pub index: String,
    pub error: Option<String>,
    pub redirect: Option<Redirect>,
}

impl WebsiteSettings {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            index: "index.html".to_string(),
            error: None,
            redirect: None,
        }
    }
}
