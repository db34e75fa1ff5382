//! Object storage boundary for simples3.
//!
//! The client layer only ever needs three primitives from a storage
//! service: put an object, get an object, and list keys under a prefix one
//! page at a time. This crate expresses them as the [`ObjectStore`] trait.
//!
//! # Storage Backends
//!
//! - [`S3ObjectStore`] -- AWS S3 through `aws-sdk-s3`
//! - [`InMemoryObjectStore`] -- bucket map held in memory, for tests and
//!   embedding
//!
//! # Design Rules
//!
//! 1. Backends never interpret object bodies; compression and encoding
//!    belong to the caller.
//! 2. Canned ACLs are validated when parsed ([`ObjectAcl`]), before any
//!    request is built.
//! 3. Errors are classified ([`StoreError`]) but never retried or
//!    swallowed.

pub mod acl;
pub mod error;
pub mod memory;
pub mod s3;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use acl::ObjectAcl;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;
pub use traits::{ListPage, ObjectStore};
