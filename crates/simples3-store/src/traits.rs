use async_trait::async_trait;
use bytes::Bytes;

use crate::acl::ObjectAcl;
use crate::error::StoreResult;

/// One page of a prefix listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Keys on this page, in the order the store returned them.
    pub keys: Vec<String>,
    /// Token for the next page, `None` on the last page.
    pub next_token: Option<String>,
}

/// Remote object storage primitives.
///
/// Keys passed here are always effective keys; prefixing is the caller's
/// concern. Implementations must be safe to share across tasks and must
/// surface every failure instead of returning partial data.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite the object at `key` with the given canned ACL.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        acl: ObjectAcl,
    ) -> StoreResult<()>;

    /// Read the full body of the object at `key`.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) when
    /// the key does not exist.
    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes>;

    /// Fetch a single page of keys starting with `prefix`.
    ///
    /// Pass the previous page's `next_token` as `continuation` to resume.
    /// An empty `prefix` lists the whole bucket.
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<&str>,
    ) -> StoreResult<ListPage>;

    /// List every key starting with `prefix`, draining all pages in order.
    ///
    /// Fails as a whole if any page fails.
    async fn list_objects(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self
                .list_objects_page(bucket, prefix, token.as_deref())
                .await?;
            keys.extend(page.keys);
            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(keys)
    }
}
