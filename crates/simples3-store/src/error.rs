/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The store refused the request for lack of permission.
    #[error("access denied: s3://{bucket}/{key}")]
    AccessDenied { bucket: String, key: String },

    /// The bucket does not exist.
    #[error("bucket not found: {0}")]
    NoSuchBucket(String),

    /// A canned ACL string outside the supported set.
    #[error("invalid canned ACL: {0:?}")]
    InvalidAcl(String),

    /// Any other failure reported by the storage backend.
    #[error("{operation} failed for s3://{bucket}/{key}: {source}")]
    Backend {
        operation: &'static str,
        bucket: String,
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
