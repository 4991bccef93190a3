use std::collections::HashMap;

use bucketsync_storage::StorageConfig;
use bucketsync_storage::config::DEFAULT_UPLOAD_CONCURRENCY;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn default_has_no_region_or_endpoint() {
    let config = StorageConfig::default();
    assert!(config.region.is_none());
    assert!(config.endpoint_override.is_none());
}

#[test]
fn default_upload_concurrency_is_ten() {
    assert_eq!(StorageConfig::default().upload_concurrency, 10);
    assert_eq!(DEFAULT_UPLOAD_CONCURRENCY, 10);
}

#[test]
fn awsx_region_wins_over_aws_region() {
    let config = StorageConfig::from_lookup(lookup(&[
        ("AWS_REGION", "us-west-2"),
        ("AWSX_REGION", "ap-southeast-2"),
    ]));
    assert_eq!(config.region.as_deref(), Some("ap-southeast-2"));
}

#[test]
fn falls_back_through_region_variables() {
    let config = StorageConfig::from_lookup(lookup(&[("DB_REGION", "eu-west-1")]));
    assert_eq!(config.region.as_deref(), Some("eu-west-1"));
}

#[test]
fn empty_values_are_ignored() {
    let config = StorageConfig::from_lookup(lookup(&[
        ("AWSX_REGION", ""),
        ("REGION", "ca-central-1"),
        ("AWSX_S3_ENDPOINT", "  "),
    ]));
    assert_eq!(config.region.as_deref(), Some("ca-central-1"));
    assert!(config.endpoint_override.is_none());
}

#[test]
fn endpoint_override_from_env() {
    let config =
        StorageConfig::from_lookup(lookup(&[("AWSX_S3_ENDPOINT", "http://localhost:9000")]));
    assert_eq!(config.endpoint_override.as_deref(), Some("http://localhost:9000"));
    assert!(config.region.is_none());
}

#[test]
fn serialization_roundtrip() {
    let config = StorageConfig::minio("http://localhost:9000");
    let json = serde_json::to_string(&config).unwrap();
    let deserialized: StorageConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.region, config.region);
    assert_eq!(deserialized.endpoint_override, config.endpoint_override);
    assert_eq!(deserialized.upload_concurrency, config.upload_concurrency);
}
