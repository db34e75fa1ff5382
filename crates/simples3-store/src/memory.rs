use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::acl::ObjectAcl;
use crate::error::{StoreError, StoreResult};
use crate::traits::{ListPage, ObjectStore};

/// Largest page a single S3 `ListObjectsV2` call returns.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// An object held by [`InMemoryObjectStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryObject {
    /// Stored body, exactly as uploaded.
    pub body: Bytes,
    /// Canned ACL given on upload.
    pub acl: ObjectAcl,
}

/// In-memory, bucket-map object store.
///
/// Intended for tests and embedding. Buckets must be created before use,
/// keys are listed in lexicographic order, and listing is paginated like
/// S3 with the continuation token being the last key of the page. Every
/// listing request is counted so callers can assert how many round trips
/// an operation needed.
pub struct InMemoryObjectStore {
    buckets: RwLock<HashMap<String, BTreeMap<String, MemoryObject>>>,
    denied: RwLock<HashSet<String>>,
    page_size: usize,
    list_requests: AtomicUsize,
}

impl InMemoryObjectStore {
    /// Create a new store with no buckets.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            denied: RwLock::new(HashSet::new()),
            page_size: DEFAULT_PAGE_SIZE,
            list_requests: AtomicUsize::new(0),
        }
    }

    /// Set the maximum number of keys per listing page (at least 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create an empty bucket. Returns `false` if it already existed.
    pub fn create_bucket(&self, bucket: &str) -> bool {
        let mut buckets = self.buckets.write().expect("lock poisoned");
        if buckets.contains_key(bucket) {
            return false;
        }
        buckets.insert(bucket.to_string(), BTreeMap::new());
        true
    }

    /// Reject every subsequent request against `bucket` with
    /// [`StoreError::AccessDenied`].
    pub fn deny_access(&self, bucket: &str) {
        self.denied
            .write()
            .expect("lock poisoned")
            .insert(bucket.to_string());
    }

    /// Undo [`deny_access`](Self::deny_access).
    pub fn allow_access(&self, bucket: &str) {
        self.denied.write().expect("lock poisoned").remove(bucket);
    }

    /// Number of listing pages served so far.
    pub fn list_requests(&self) -> usize {
        self.list_requests.load(Ordering::SeqCst)
    }

    /// Look up a stored object without going through the trait.
    pub fn object(&self, bucket: &str, key: &str) -> Option<MemoryObject> {
        let buckets = self.buckets.read().expect("lock poisoned");
        buckets.get(bucket)?.get(key).cloned()
    }

    /// Number of objects in `bucket` (0 if it does not exist).
    pub fn object_count(&self, bucket: &str) -> usize {
        let buckets = self.buckets.read().expect("lock poisoned");
        buckets.get(bucket).map_or(0, BTreeMap::len)
    }

    fn check_access(&self, bucket: &str, key: &str) -> StoreResult<()> {
        if self.denied.read().expect("lock poisoned").contains(bucket) {
            return Err(StoreError::AccessDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        acl: ObjectAcl,
    ) -> StoreResult<()> {
        self.check_access(bucket, key)?;
        let mut buckets = self.buckets.write().expect("lock poisoned");
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects.insert(key.to_string(), MemoryObject { body, acl });
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        self.check_access(bucket, key)?;
        let buckets = self.buckets.read().expect("lock poisoned");
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        objects
            .get(key)
            .map(|obj| obj.body.clone())
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<&str>,
    ) -> StoreResult<ListPage> {
        self.check_access(bucket, prefix)?;
        let buckets = self.buckets.read().expect("lock poisoned");
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket(bucket.to_string()))?;
        self.list_requests.fetch_add(1, Ordering::SeqCst);

        let lower = match continuation {
            Some(token) => Bound::Excluded(token),
            None => Bound::Included(prefix),
        };
        let mut keys: Vec<String> = objects
            .range::<str, _>((lower, Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .take(self.page_size + 1)
            .cloned()
            .collect();

        let next_token = if keys.len() > self.page_size {
            keys.truncate(self.page_size);
            keys.last().cloned()
        } else {
            None
        };
        Ok(ListPage { keys, next_token })
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bucket_count = self.buckets.read().map(|b| b.len()).unwrap_or(0);
        f.debug_struct("InMemoryObjectStore")
            .field("bucket_count", &bucket_count)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = "test-bucket";

    fn store_with_bucket() -> InMemoryObjectStore {
        let store = InMemoryObjectStore::new();
        assert!(store.create_bucket(BUCKET));
        store
    }

    async fn put(store: &InMemoryObjectStore, key: &str) {
        store
            .put_object(BUCKET, key, Bytes::from_static(b"foo"), ObjectAcl::Private)
            .await
            .unwrap();
    }

    // -----------------------------------------------------------------------
    // Put / Get
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn put_and_get() {
        let store = store_with_bucket();
        store
            .put_object(BUCKET, "a/b", Bytes::from_static(b"hello"), ObjectAcl::PublicRead)
            .await
            .unwrap();

        let body = store.get_object(BUCKET, "a/b").await.unwrap();
        assert_eq!(&body[..], b"hello");

        let obj = store.object(BUCKET, "a/b").expect("should exist");
        assert_eq!(obj.acl, ObjectAcl::PublicRead);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = store_with_bucket();
        put(&store, "k").await;
        store
            .put_object(BUCKET, "k", Bytes::from_static(b"bar"), ObjectAcl::Private)
            .await
            .unwrap();
        assert_eq!(&store.get_object(BUCKET, "k").await.unwrap()[..], b"bar");
        assert_eq!(store.object_count(BUCKET), 1);
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let store = store_with_bucket();
        let err = store.get_object(BUCKET, "missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref key, .. } if key == "missing"));
    }

    #[tokio::test]
    async fn missing_bucket_is_reported() {
        let store = InMemoryObjectStore::new();
        let err = store
            .put_object("nope", "k", Bytes::new(), ObjectAcl::Private)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NoSuchBucket(ref b) if b == "nope"));
        assert!(matches!(
            store.get_object("nope", "k").await,
            Err(StoreError::NoSuchBucket(_))
        ));
        assert!(matches!(
            store.list_objects("nope", "").await,
            Err(StoreError::NoSuchBucket(_))
        ));
    }

    #[test]
    fn create_bucket_twice() {
        let store = store_with_bucket();
        assert!(!store.create_bucket(BUCKET));
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn list_filters_by_prefix() {
        let store = store_with_bucket();
        for key in ["a1", "a2", "ab", "b1", "test/x", "test2/y"] {
            put(&store, key).await;
        }
        assert_eq!(store.list_objects(BUCKET, "a").await.unwrap(), vec!["a1", "a2", "ab"]);
        assert_eq!(store.list_objects(BUCKET, "test/").await.unwrap(), vec!["test/x"]);
        assert_eq!(
            store.list_objects(BUCKET, "test").await.unwrap(),
            vec!["test/x", "test2/y"]
        );
        assert_eq!(store.list_objects(BUCKET, "").await.unwrap().len(), 6);
        assert!(store.list_objects(BUCKET, "zzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_paginates() {
        let store = store_with_bucket().with_page_size(2);
        for i in 0..5 {
            put(&store, &format!("k{i}")).await;
        }

        let first = store.list_objects_page(BUCKET, "k", None).await.unwrap();
        assert_eq!(first.keys, vec!["k0", "k1"]);
        assert_eq!(first.next_token.as_deref(), Some("k1"));

        let second = store
            .list_objects_page(BUCKET, "k", first.next_token.as_deref())
            .await
            .unwrap();
        assert_eq!(second.keys, vec!["k2", "k3"]);

        let all = store.list_objects(BUCKET, "k").await.unwrap();
        assert_eq!(all, vec!["k0", "k1", "k2", "k3", "k4"]);
        // 2 explicit pages + 3 pages for the full drain
        assert_eq!(store.list_requests(), 5);
    }

    #[tokio::test]
    async fn exact_page_boundary_has_no_trailing_page() {
        let store = store_with_bucket().with_page_size(2);
        put(&store, "k0").await;
        put(&store, "k1").await;
        let page = store.list_objects_page(BUCKET, "", None).await.unwrap();
        assert_eq!(page.keys.len(), 2);
        assert!(page.next_token.is_none());
    }

    // -----------------------------------------------------------------------
    // Access control
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn denied_bucket_rejects_everything() {
        let store = store_with_bucket();
        put(&store, "k").await;
        store.deny_access(BUCKET);

        assert!(matches!(
            store.get_object(BUCKET, "k").await,
            Err(StoreError::AccessDenied { .. })
        ));
        assert!(matches!(
            store.list_objects(BUCKET, "").await,
            Err(StoreError::AccessDenied { .. })
        ));
        assert!(matches!(
            store
                .put_object(BUCKET, "k", Bytes::new(), ObjectAcl::Private)
                .await,
            Err(StoreError::AccessDenied { .. })
        ));

        store.allow_access(BUCKET);
        assert!(store.get_object(BUCKET, "k").await.is_ok());
    }

    #[test]
    fn debug_format() {
        let store = store_with_bucket();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryObjectStore"));
        assert!(debug.contains("bucket_count"));
    }
}
