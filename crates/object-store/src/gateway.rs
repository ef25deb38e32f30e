//! The blob gateway capability: the narrow set of operations the
//! connector needs from a flat, key-addressed blob store.

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::error::Result;

/// A lazily consumed stream of payload chunks. Dropping the stream
/// releases the underlying connection.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Size and modification time of a stored object.
///
/// Both fields are zero/`None` when the key does not resolve to a real
/// object; callers check existence first when that matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobMetadata {
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One entry of a delimiter-aware listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Full store-local key of the entry (no trailing delimiter)
    pub name: String,
    /// True if the entry is a common prefix ("directory"), not an object
    pub is_prefix: bool,
    /// Object size; zero for prefixes
    pub size: u64,
}

impl ListEntry {
    pub fn object(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            is_prefix: false,
            size,
        }
    }

    pub fn prefix(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_prefix: true,
            size: 0,
        }
    }
}

/// Capability contract over the backing blob store.
///
/// Every operation may fail with a transient error (retryable by the
/// caller) or an unavailable error (surfaced immediately). Implementations
/// never retry internally and must be safe to share across concurrent
/// requests.
#[async_trait]
pub trait BlobGateway: Send + Sync + Debug + 'static {
    /// Name of the container this gateway is bound to
    fn container(&self) -> &str;

    /// Whether an object exists at exactly `key`
    async fn exists(&self, key: &str) -> Result<bool>;

    /// "Directory" existence: true if any object key begins with
    ///  `prefix` followed by the delimiter. The empty prefix denotes
    ///  the container root.
    async fn is_prefix_populated(&self, prefix: &str) -> Result<bool>;

    /// Object metadata, defaulted when the key is absent
    async fn metadata(&self, key: &str) -> Result<BlobMetadata>;

    /// List the direct children of `prefix`, at most `max_results` of them.
    ///  Order must be stable across calls against an unmodified container.
    ///  Names are unescaped keys that round-trip through the other calls.
    async fn list(&self, prefix: &str, max_results: usize) -> Result<Vec<ListEntry>>;

    /// Open a byte stream over the payload at `key`
    async fn get(&self, key: &str) -> Result<ByteStream>;

    /// Store `payload` at `key`, replacing any existing object
    async fn put(
        &self,
        key: &str,
        payload: ByteStream,
        size: Option<u64>,
        content_type: &str,
    ) -> Result<()>;

    /// Remove the object at `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
