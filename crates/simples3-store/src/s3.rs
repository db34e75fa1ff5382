use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use crate::acl::ObjectAcl;
use crate::error::{StoreError, StoreResult};
use crate::traits::{ListPage, ObjectStore};

/// [`ObjectStore`] backed by AWS S3.
///
/// Credentials and endpoint come from the ambient AWS configuration
/// (environment, profile, instance metadata); only the region is set here.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Load the default AWS configuration scoped to `region`.
    ///
    /// No request is sent; bucket existence is not checked.
    pub async fn connect(region: &str) -> Self {
        let region_provider =
            RegionProviderChain::first_try(Region::new(region.to_string())).or_default_provider();
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;
        Self::from_client(Client::new(&config))
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// The underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn acl_to_sdk(acl: ObjectAcl) -> ObjectCannedAcl {
    match acl {
        ObjectAcl::Private => ObjectCannedAcl::Private,
        ObjectAcl::PublicRead => ObjectCannedAcl::PublicRead,
        ObjectAcl::PublicReadWrite => ObjectCannedAcl::PublicReadWrite,
        ObjectAcl::AuthenticatedRead => ObjectCannedAcl::AuthenticatedRead,
        ObjectAcl::AwsExecRead => ObjectCannedAcl::AwsExecRead,
        ObjectAcl::BucketOwnerRead => ObjectCannedAcl::BucketOwnerRead,
        ObjectAcl::BucketOwnerFullControl => ObjectCannedAcl::BucketOwnerFullControl,
    }
}

/// Map an S3 error code onto the store taxonomy.
fn classify_code(
    code: Option<&str>,
    operation: &'static str,
    bucket: &str,
    key: &str,
    source: Box<dyn std::error::Error + Send + Sync>,
) -> StoreError {
    match code {
        Some("NoSuchKey") | Some("NotFound") => StoreError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        Some("AccessDenied") | Some("Forbidden") => StoreError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        Some("NoSuchBucket") => StoreError::NoSuchBucket(bucket.to_string()),
        _ => StoreError::Backend {
            operation,
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        },
    }
}

fn classify<E, R>(err: SdkError<E, R>, operation: &'static str, bucket: &str, key: &str) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let code = err.code().map(str::to_string);
    classify_code(code.as_deref(), operation, bucket, key, Box::new(err))
}

/// Continuation token for the page after a listing response.
///
/// A truncated response without a token is an error, never a short listing.
fn next_page_token(
    truncated: Option<bool>,
    token: Option<&str>,
    bucket: &str,
    prefix: &str,
) -> StoreResult<Option<String>> {
    match (truncated, token) {
        (Some(true), Some(token)) => Ok(Some(token.to_string())),
        (Some(true), None) => Err(StoreError::Backend {
            operation: "ListObjectsV2",
            bucket: bucket.to_string(),
            key: prefix.to_string(),
            source: "truncated listing without a continuation token".into(),
        }),
        _ => Ok(None),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        acl: ObjectAcl,
    ) -> StoreResult<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .acl(acl_to_sdk(acl))
            .send()
            .await
            .map_err(|e| classify(e, "PutObject", bucket, key))?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(e, "GetObject", bucket, key))?;
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Backend {
                operation: "GetObject",
                bucket: bucket.to_string(),
                key: key.to_string(),
                source: Box::new(e),
            })?;
        Ok(body.into_bytes())
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<&str>,
    ) -> StoreResult<ListPage> {
        let mut request = self.client.list_objects_v2().bucket(bucket);
        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }
        if let Some(token) = continuation {
            request = request.continuation_token(token);
        }
        let output = request
            .send()
            .await
            .map_err(|e| classify(e, "ListObjectsV2", bucket, prefix))?;

        let keys: Vec<String> = output
            .contents()
            .iter()
            .filter_map(|obj| obj.key().map(str::to_string))
            .collect();
        let next_token = next_page_token(
            output.is_truncated(),
            output.next_continuation_token(),
            bucket,
            prefix,
        )?;
        debug!(bucket, prefix, count = keys.len(), more = next_token.is_some(), "listed page");
        Ok(ListPage { keys, next_token })
    }
}
