//! A small convenience client for S3 buckets.
//!
//! [`S3`] wraps a bucket (and an optional key prefix) and offers:
//!
//! - existence checks for one key or many keys at once, the latter served
//!   by a single prefix listing instead of one request per key
//! - raw object put/get with optional gzip compression
//! - JSON Lines documents and single JSON values, serialized with `serde`
//!
//! ```no_run
//! use simples3::{ClientConfig, PutOptions, S3};
//!
//! # async fn demo() -> simples3::ClientResult<()> {
//! let s3 = S3::connect(ClientConfig::new("my-bucket").with_prefix("runs")).await;
//! s3.put_json("latest.json.gz", &serde_json::json!({"step": 3}), PutOptions::default())
//!     .await?;
//! let flags = s3.files_exist(&["0.json.gz", "1.json.gz"]).await?;
//! # let _ = flags;
//! # Ok(())
//! # }
//! ```
//!
//! Credentials and endpoints are resolved by the AWS SDK; nothing here reads
//! the environment directly.

pub mod client;
pub mod config;
pub mod error;
pub mod keys;

pub use client::{PutOptions, S3};
pub use config::{ClientConfig, DEFAULT_REGION};
pub use error::{ClientError, ClientResult};

// Re-export the layers the client is built on.
pub use simples3_codec::{self as codec, CodecError};
pub use simples3_store::{
    InMemoryObjectStore, ObjectAcl, ObjectStore, S3ObjectStore, StoreError,
};
