//! S3-backed object store and bucket administration.
//!
//! The client is built once from [`StorageConfig`] (or handed in directly)
//! and shared by every operation; credentials come from the SDK's default
//! provider chain.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration, Delete, ErrorDocument,
    IndexDocument, ObjectIdentifier, Protocol, RedirectAllRequestsTo, ServerSideEncryption,
    StorageClass, Tag, Tagging, WebsiteConfiguration,
};
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectStore, check_delete_batch};
use crate::types::*;
use crate::website::public_read_policy;

/// Region S3 reports as an empty location constraint.
const DEFAULT_REGION: &str = "us-east-1";

/// Error code returned by `GetBucketWebsite` for buckets without a website.
const NO_WEBSITE_CODE: &str = "NoSuchWebsiteConfiguration";

/// Object store backed by Amazon S3 (or an S3-compatible endpoint).
#[derive(Clone, Debug)]
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    /// Wraps an already configured client.
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Builds a client from the SDK defaults plus `config` overrides.
    pub async fn connect(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(ref region) = config.region {
            loader = loader.region(aws_types::region::Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut config_builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(ref endpoint) = config.endpoint_override {
            config_builder = config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        Self::new(S3Client::from_conf(config_builder.build()))
    }

    /// Gets a bucket's region and endpoints, optionally with its website
    /// configuration. A bucket without a website is not an error.
    pub async fn get_bucket(&self, bucket: &str, website: bool) -> StorageResult<BucketDetails> {
        if bucket.is_empty() {
            return Err(StorageError::MissingArgument("bucket"));
        }

        let (location, website_details) = tokio::join!(self.bucket_region(bucket), async {
            if website {
                self.bucket_website(bucket).await
            } else {
                Ok(None)
            }
        });

        let mut errors = Vec::new();
        let region = location.unwrap_or_else(|e| {
            errors.push(e.to_string());
            String::new()
        });
        let website_details = website_details.unwrap_or_else(|e| {
            errors.push(e.to_string());
            None
        });

        if !errors.is_empty() {
            return Err(StorageError::S3(format!(
                "failed to get bucket '{bucket}' details: {}",
                errors.join("; ")
            )));
        }

        Ok(BucketDetails::new(bucket, &region, website_details))
    }

    async fn bucket_region(&self, bucket: &str) -> StorageResult<String> {
        let resp = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("get location failed for {bucket}: {e}")))?;

        let region = resp
            .location_constraint()
            .map(|c| c.as_str())
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_REGION);

        // Legacy constraint for buckets created in Ireland.
        Ok(if region == "EU" { "eu-west-1" } else { region }.to_string())
    }

    async fn bucket_website(&self, bucket: &str) -> StorageResult<Option<WebsiteDetails>> {
        match self.client.get_bucket_website().bucket(bucket).send().await {
            Ok(resp) => Ok(Some(WebsiteDetails {
                index_document: resp.index_document().map(|d| d.suffix().to_string()),
                error_document: resp.error_document().map(|d| d.key().to_string()),
                redirect_all_requests_to: resp.redirect_all_requests_to().map(|r| {
                    let mut redirect = Redirect::new(r.host_name());
                    if let Some(protocol) = r.protocol() {
                        redirect.protocol = protocol.as_str().to_string();
                    }
                    redirect
                }),
            })),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.code() == Some(NO_WEBSITE_CODE) {
                    Ok(None)
                } else {
                    Err(StorageError::S3(format!(
                        "get website failed for {bucket}: {service_err}"
                    )))
                }
            }
        }
    }

    /// Lists every bucket in the account.
    #[allow(deprecated)]
    pub async fn list_buckets(&self) -> StorageResult<BucketList> {
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("list buckets failed: {e}")))?;

        let buckets = resp
            .buckets()
            .iter()
            .map(|b| BucketSummary {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b
                    .creation_date()
                    .and_then(|d| chrono::DateTime::from_timestamp(d.secs(), d.subsec_nanos())),
            })
            .collect();

        let owner = resp
            .owner()
            .map(|o| BucketOwner {
                id: o.id().map(str::to_string),
                display_name: o.display_name().map(str::to_string),
            })
            .unwrap_or_default();

        Ok(BucketList { buckets, owner })
    }

    /// Creates a bucket and tags it. Returns the bucket location.
    pub async fn create_bucket(&self, request: &CreateBucket) -> StorageResult<Option<String>> {
        let name = request.name.as_str();
        if name.is_empty() {
            return Err(StorageError::MissingArgument("name"));
        }

        let mut create = self
            .client
            .create_bucket()
            .bucket(name)
            .acl(BucketCannedAcl::from(request.acl.as_str()));

        // us-east-1 rejects an explicit location constraint.
        if request.region != DEFAULT_REGION {
            create = create.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(request.region.as_str()))
                    .build(),
            );
        }

        let resp = create
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("create bucket failed for {name}: {e}")))?;
        debug!("created bucket {name} in {}", request.region);

        if !request.tags.is_empty() {
            self.tag_bucket(request)
                .await
                .map_err(|e| StorageError::S3(format!("bucket '{name}' created, but tagging it failed: {e}")))?;
        }

        Ok(resp.location().map(str::to_string))
    }

    async fn tag_bucket(&self, request: &CreateBucket) -> StorageResult<()> {
        let tag_set = request
            .tags
            .iter()
            .map(|(key, value)| {
                Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(|e| StorageError::S3(format!("invalid tag {key}: {e}")))
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let tagging = Tagging::builder()
            .set_tag_set(Some(tag_set))
            .build()
            .map_err(|e| StorageError::S3(e.to_string()))?;

        self.client
            .put_bucket_tagging()
            .bucket(&request.name)
            .tagging(tagging)
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;
        Ok(())
    }

    /// Configures a bucket as a static website and opens `s3:GetObject` to
    /// the public.
    ///
    /// S3 does not accept a redirect alongside index/error documents, so a
    /// redirect replaces them.
    pub async fn set_website(&self, settings: &WebsiteSettings) -> StorageResult<()> {
        let bucket = settings.bucket.as_str();
        if bucket.is_empty() {
            return Err(StorageError::MissingArgument("bucket"));
        }

        let build_err = |e: aws_sdk_s3::error::BuildError| StorageError::S3(e.to_string());
        let mut website = WebsiteConfiguration::builder();
        if let Some(ref redirect) = settings.redirect {
            website = website.redirect_all_requests_to(
                RedirectAllRequestsTo::builder()
                    .host_name(&redirect.hostname)
                    .protocol(Protocol::from(redirect.protocol.as_str()))
                    .build()
                    .map_err(build_err)?,
            );
        } else {
            website = website.index_document(
                IndexDocument::builder()
                    .suffix(&settings.index)
                    .build()
                    .map_err(build_err)?,
            );
            if let Some(ref error) = settings.error {
                website = website
                    .error_document(ErrorDocument::builder().key(error).build().map_err(build_err)?);
            }
        }

        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(website.build())
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("failed to configure bucket '{bucket}' as a website: {e}")))?;

        let policy = public_read_policy(bucket)?;
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| {
                StorageError::S3(format!(
                    "bucket '{bucket}' configured as website, but allowing 's3:GetObject' in its policy failed: {e}"
                ))
            })?;

        debug!("configured {bucket} as a static website");
        Ok(())
    }
}

/// S3 takes the length as a signed integer.
fn content_length(key: &str, size: u64) -> StorageResult<i64> {
    i64::try_from(size)
        .map_err(|_| StorageError::S3(format!("content length {size} of {key} exceeds the S3 limit")))
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::S3(format!("head bucket failed for {bucket}: {service_err}")))
                }
            }
        }
    }

    async fn put_object(&self, bucket: &str, object: PutObject) -> StorageResult<()> {
        let size = object.effective_length();
        let key = object.key;

        let mut put = self
            .client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .content_length(content_length(&key, size)?)
            .set_content_type(object.content_type)
            .set_cache_control(object.cache_control)
            .set_tagging(object.tagging);
        if let Some(sse) = object.server_side_encryption {
            put = put.server_side_encryption(ServerSideEncryption::from(sse.as_str()));
        }
        if let Some(class) = object.storage_class {
            put = put.storage_class(StorageClass::from(class.as_str()));
        }

        put.body(ByteStream::from(object.body))
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("upload failed for {key}: {e}")))?;

        debug!("uploaded {size} bytes to s3://{bucket}/{key}");
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, objects: &[ObjectRef]) -> StorageResult<()> {
        check_delete_batch(objects.len())?;

        let identifiers = objects
            .iter()
            .map(|o| {
                ObjectIdentifier::builder()
                    .key(&o.key)
                    .set_version_id(o.version.clone())
                    .build()
                    .map_err(|e| StorageError::S3(format!("invalid object identifier {}: {e}", o.key)))
            })
            .collect::<StorageResult<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|e| StorageError::S3(e.to_string()))?;

        let resp = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("delete failed in {bucket}: {e}")))?;

        let failures: Vec<String> = resp
            .errors()
            .iter()
            .map(|e| {
                format!(
                    "{}: {}",
                    e.key().unwrap_or("<unknown key>"),
                    e.message().unwrap_or("unknown error")
                )
            })
            .collect();
        if !failures.is_empty() {
            return Err(StorageError::S3(format!(
                "delete failed for {} of {} keys in {bucket}: {}",
                failures.len(),
                objects.len(),
                failures.join("; ")
            )));
        }

        debug!("deleted {} objects from s3://{bucket}", objects.len());
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<ObjectData> {
        let resp = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let service_err = e.into_service_error();
                return Err(if service_err.is_no_such_key() {
                    StorageError::NotFound(format!("s3://{bucket}/{key}"))
                } else {
                    StorageError::S3(format!("download failed for {key}: {service_err}"))
                });
            }
        };

        let content_type = resp.content_type().map(str::to_string);
        let etag = resp.e_tag().map(str::to_string);
        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("failed to read body for {key}: {e}")))?;

        let body = body.into_bytes().to_vec();
        debug!("downloaded {} bytes from s3://{bucket}/{key}", body.len());
        Ok(ObjectData {
            content_length: body.len() as u64,
            body,
            content_type,
            etag,
        })
    }
}
