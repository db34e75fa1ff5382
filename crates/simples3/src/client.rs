use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use simples3_codec::{compress_bytes, decompress_bytes, dump_jsonl, load_jsonl_bytes};
use simples3_store::{ObjectAcl, ObjectStore, S3ObjectStore};
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::keys::listing_prefix;

/// How an object is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PutOptions {
    /// Gzip the payload before upload.
    pub compress: bool,
    /// Canned ACL applied to the object.
    pub acl: ObjectAcl,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            compress: true,
            acl: ObjectAcl::Private,
        }
    }
}

impl PutOptions {
    /// Private object stored without compression.
    pub fn uncompressed() -> Self {
        Self {
            compress: false,
            ..Self::default()
        }
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_acl(mut self, acl: ObjectAcl) -> Self {
        self.acl = acl;
        self
    }
}

/// Client for one bucket, optionally scoped to a key prefix.
///
/// Every method takes logical keys; the configured prefix is applied the
/// same way on put, get, existence checks and URLs. The client holds no
/// state besides its configuration and store handle, so it can be shared
/// freely behind an `Arc`.
#[derive(Clone)]
pub struct S3 {
    config: ClientConfig,
    store: Arc<dyn ObjectStore>,
}

impl S3 {
    /// Connect to S3 in the configured region using the ambient AWS
    /// credentials. The bucket is not checked.
    pub async fn connect(config: ClientConfig) -> Self {
        let store = S3ObjectStore::connect(&config.region).await;
        Self::with_store(config, Arc::new(store))
    }

    /// Build a client over any storage backend.
    pub fn with_store(config: ClientConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    pub fn prefix(&self) -> Option<&str> {
        self.config.prefix()
    }

    /// Key used against the store for the logical `key`.
    pub fn effective_key(&self, key: &str) -> String {
        self.config.effective_key(key)
    }

    /// Public URL of an object on the default S3 endpoint.
    ///
    /// Plain formatting: no request is made and the URL is not signed.
    pub fn get_url(&self, key: &str) -> String {
        format!(
            "https://s3.amazonaws.com/{}/{}",
            self.config.bucket,
            self.effective_key(key)
        )
    }

    /// Check whether a single object exists.
    pub async fn file_exists(&self, key: &str) -> ClientResult<bool> {
        let flags = self.files_exist(&[key]).await?;
        Ok(flags.first().copied().unwrap_or(false))
    }

    /// Check which of `keys` exist, in input order.
    ///
    /// All keys are answered from one listing under their longest common
    /// prefix, so the number of requests depends on how many objects share
    /// that prefix, not on how many keys are asked about. Keys with no
    /// common prefix fall back to listing everything under the configured
    /// prefix. Any failed page fails the whole call.
    #[instrument(skip(self, keys), fields(bucket = %self.config.bucket, count = keys.len()))]
    pub async fn files_exist<K: AsRef<str>>(&self, keys: &[K]) -> ClientResult<Vec<bool>> {
        let logical: Vec<&str> = keys.iter().map(|key| key.as_ref()).collect();
        let prefix = listing_prefix(self.config.prefix(), &logical);
        debug!(%prefix, "listing objects for existence check");

        let found: HashSet<String> = self
            .store
            .list_objects(&self.config.bucket, &prefix)
            .await?
            .into_iter()
            .collect();
        debug!(listed = found.len(), "existence check listing complete");

        Ok(logical
            .iter()
            .map(|key| found.contains(&self.effective_key(key)))
            .collect())
    }

    /// Store raw bytes at `key`, gzip-compressed if requested.
    ///
    /// Creates or overwrites the object. Text payloads are passed as their
    /// UTF-8 bytes.
    #[instrument(skip(self, payload), fields(size = payload.len()))]
    pub async fn put_obj(&self, key: &str, payload: &[u8], options: PutOptions) -> ClientResult<()> {
        let key = self.effective_key(key);
        let body = if options.compress {
            compress_bytes(payload)?
        } else {
            payload.to_vec()
        };
        info!("storing data on s3://{}/{}", self.config.bucket, key);
        self.store
            .put_object(&self.config.bucket, &key, Bytes::from(body), options.acl)
            .await?;
        Ok(())
    }

    /// Fetch the full body of `key`, gunzipping it if requested.
    #[instrument(skip(self))]
    pub async fn get_obj(&self, key: &str, decompress: bool) -> ClientResult<Vec<u8>> {
        let key = self.effective_key(key);
        info!("fetching s3://{}/{}", self.config.bucket, key);
        let data = self.store.get_object(&self.config.bucket, &key).await?;
        if decompress {
            Ok(decompress_bytes(&data)?)
        } else {
            Ok(data.to_vec())
        }
    }

    /// Store `items` as a JSON Lines document.
    pub async fn put_jsonl<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
        options: PutOptions,
    ) -> ClientResult<()> {
        let text = dump_jsonl(items)?;
        self.put_obj(key, text.as_bytes(), options).await
    }

    /// Store one value as a single-line JSON Lines document.
    pub async fn put_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        options: PutOptions,
    ) -> ClientResult<()> {
        self.put_jsonl(key, std::slice::from_ref(value), options).await
    }

    /// Fetch and decode a JSON Lines document.
    pub async fn get_jsonl<T: DeserializeOwned>(
        &self,
        key: &str,
        decompress: bool,
    ) -> ClientResult<Vec<T>> {
        let data = self.get_obj(key, decompress).await?;
        Ok(load_jsonl_bytes(&data)?)
    }

    /// Fetch a document and return the value on its first line.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str, decompress: bool) -> ClientResult<T> {
        self.get_jsonl(key, decompress)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::EmptyDocument {
                key: self.effective_key(key),
            })
    }
}

impl std::fmt::Debug for S3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3")
            .field("bucket", &self.config.bucket)
            .field("region", &self.config.region)
            .field("prefix", &self.config.prefix)
            .finish()
    }
}
