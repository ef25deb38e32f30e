//! Blob Gateway over Object Storage
//!
//! This crate provides the thin capability layer the connector consumes
//! from a flat, key-addressed blob store: existence checks (object vs.
//! "directory" prefix), metadata, delimiter-aware listing, and
//! get/put/remove. The [`Storage`] implementation is backed by pluggable
//! object storage (S3/MinIO/local filesystem/memory).
//!
//! # Example
//!
//! ```rust,no_run
//! use blobtree_object_store::{BlobGateway, ObjectStoreConfig, Storage};
//!
//! # async fn example() -> Result<(), blobtree_object_store::BlobStoreError> {
//! let storage = Storage::new(ObjectStoreConfig::Memory, "documents").await?;
//! assert!(!storage.exists("reports/q1.pdf").await?);
//! # Ok(())
//! # }
//! ```

mod error;
mod gateway;
mod storage;

pub use error::{BlobStoreError, Result};
pub use gateway::{BlobGateway, BlobMetadata, ByteStream, ListEntry};
pub use storage::{ObjectStoreConfig, Storage};
