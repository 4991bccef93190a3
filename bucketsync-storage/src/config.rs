//! Object storage configuration.

use serde::{Deserialize, Serialize};

/// Environment variables consulted for the region, highest priority first.
pub const REGION_ENV_VARS: [&str; 4] = ["AWSX_REGION", "AWS_REGION", "REGION", "DB_REGION"];

/// Environment variable holding an S3 endpoint override.
pub const ENDPOINT_ENV_VAR: &str = "AWSX_S3_ENDPOINT";

/// Default number of uploads in flight during a sync.
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 10;

/// Configuration for the S3 object store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// AWS region. `None` defers to the SDK's default provider chain.
    pub region: Option<String>,

    /// Optional S3 endpoint override (for MinIO in testing).
    pub endpoint_override: Option<String>,

    /// Maximum number of concurrent uploads.
    pub upload_concurrency: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_override: None,
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }
}

impl StorageConfig {
    /// Builds a config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            region: REGION_ENV_VARS.iter().find_map(|name| non_empty(name)),
            endpoint_override: non_empty(ENDPOINT_ENV_VAR),
            ..Self::default()
        }
    }

    /// Creates a config for testing with MinIO.
    pub fn minio(endpoint: impl Into<String>) -> Self {
        Self {
            region: Some("us-east-1".to_string()),
            endpoint_override: Some(endpoint.into()),
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }
}
