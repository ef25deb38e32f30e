//! Object storage backend abstraction (S3/MinIO/local filesystem/memory).

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::{Path as ObjectPath, PathPart, DELIMITER};
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::error::{BlobStoreError, Result};
use crate::gateway::{BlobGateway, BlobMetadata, ByteStream, ListEntry};

/// Configuration for the object storage backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectStoreConfig {
    /// In-memory storage (for testing)
    #[default]
    Memory,

    /// Local filesystem storage; the container is a subdirectory of `path`
    Local {
        /// Path to the storage directory
        path: PathBuf,
    },

    /// S3-compatible storage (AWS S3, MinIO, etc.); the container is the bucket
    S3 {
        /// S3 endpoint URL (e.g., "http://localhost:9000" for MinIO)
        endpoint: String,
        /// Access key ID
        access_key: String,
        /// Secret access key
        secret_key: String,
        /// Optional region (defaults to "us-east-1")
        region: Option<String>,
    },
}

impl ObjectStoreConfig {
    /// Short provider identifier, used in logs
    pub fn provider(&self) -> &'static str {
        match self {
            ObjectStoreConfig::Memory => "memory",
            ObjectStoreConfig::Local { .. } => "local",
            ObjectStoreConfig::S3 { .. } => "s3",
        }
    }
}

/// Blob gateway bound to a single container of an object store.
///
/// Cloning is cheap and shares the underlying client, which does its
/// own connection pooling.
#[derive(Debug, Clone)]
pub struct Storage {
    inner: Arc<dyn ObjectStore>,
    container: String,
    // LocalFileSystem rejects put attributes
    supports_attributes: bool,
    // S3 and InMemory list in key order, LocalFileSystem does not
    ordered_listing: bool,
}

impl Storage {
    /// Create a new storage backend from configuration.
    pub async fn new(config: ObjectStoreConfig, container: &str) -> Result<Self> {
        if container.is_empty() {
            return Err(BlobStoreError::InvalidConfig(
                "container name must not be empty".to_string(),
            ));
        }

        let (inner, local): (Arc<dyn ObjectStore>, bool) = match &config {
            ObjectStoreConfig::Memory => (Arc::new(InMemory::new()), false),

            ObjectStoreConfig::Local { path } => {
                let root = path.join(container);
                // Ensure directory exists
                tokio::fs::create_dir_all(&root).await?;
                let store = LocalFileSystem::new_with_prefix(&root)
                    .map_err(|e| BlobStoreError::InvalidConfig(e.to_string()))?;
                (Arc::new(store), true)
            }

            ObjectStoreConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                region,
            } => {
                let builder = AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_bucket_name(container)
                    .with_region(region.as_deref().unwrap_or("us-east-1"))
                    .with_allow_http(endpoint.starts_with("http://"));

                let store: Arc<dyn ObjectStore> = Arc::new(
                    builder
                        .build()
                        .map_err(|e| BlobStoreError::InvalidConfig(e.to_string()))?,
                );

                // Verify bucket exists by listing (empty prefix)
                // This will fail fast if the bucket doesn't exist
                {
                    let mut stream = store.list(None);
                    match stream.try_next().await {
                        Ok(_) => {}
                        Err(object_store::Error::NotFound { .. }) => {
                            return Err(BlobStoreError::ContainerNotFound(container.to_string()));
                        }
                        Err(e) => {
                            let msg = e.to_string();
                            if msg.contains("NoSuchBucket")
                                || msg.contains("bucket") && msg.contains("not")
                            {
                                return Err(BlobStoreError::ContainerNotFound(
                                    container.to_string(),
                                ));
                            }
                            return Err(BlobStoreError::Unavailable {
                                container: container.to_string(),
                                reason: msg,
                            });
                        }
                    }
                }

                (store, false)
            }
        };

        tracing::info!(
            provider = config.provider(),
            container = %container,
            "blob gateway ready"
        );

        Ok(Self {
            inner,
            container: container.to_string(),
            supports_attributes: !local,
            ordered_listing: !local,
        })
    }

    /// Create an in-memory storage backend.
    pub fn memory(container: &str) -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            container: container.to_string(),
            supports_attributes: true,
            ordered_listing: true,
        }
    }

    /// Fold a flat, key-ordered listing into the direct children of
    /// `path`, dropping the stream once `max_results` children are known.
    /// A prefix shadows an object of the same name.
    async fn list_streaming(
        &self,
        path: Option<&ObjectPath>,
        prefix: &str,
        max_results: usize,
    ) -> Result<Vec<ListEntry>> {
        let root = path.cloned().unwrap_or_default();
        let mut entries: HashMap<String, ListEntry> = HashMap::new();
        let mut stream = self.inner.list(path);

        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| self.classify(prefix, e))?
        {
            let Some(mut rest) = meta.location.prefix_match(&root) else {
                continue;
            };
            let Some(first) = rest.next() else {
                // the directory marker itself
                continue;
            };
            let nested = rest.next().is_some();
            let name = child_key(&root, &first);

            match entries.get(&name) {
                Some(existing) if existing.is_prefix || !nested => continue,
                Some(_) => {}
                None if entries.len() >= max_results => break,
                None => {}
            }

            let entry = if nested {
                ListEntry::prefix(name.clone())
            } else {
                ListEntry::object(name.clone(), meta.size as u64)
            };
            entries.insert(name, entry);
        }

        Ok(entries.into_values().collect())
    }

    /// Delimited listing of the whole prefix, for backends whose listing
    /// order is unspecified.
    async fn list_buffered(
        &self,
        path: Option<&ObjectPath>,
        prefix: &str,
        max_results: usize,
    ) -> Result<Vec<ListEntry>> {
        let listing = self
            .inner
            .list_with_delimiter(path)
            .await
            .map_err(|e| self.classify(prefix, e))?;

        let mut entries = BTreeMap::new();
        for meta in listing.objects {
            let name = decode_path(&meta.location);
            entries.insert(name.clone(), ListEntry::object(name, meta.size as u64));
        }
        for common in listing.common_prefixes {
            let name = decode_path(&common);
            entries.insert(name.clone(), ListEntry::prefix(name));
        }

        Ok(entries.into_values().take(max_results).collect())
    }

    fn classify(&self, key: &str, err: object_store::Error) -> BlobStoreError {
        BlobStoreError::classify(&self.container, key, err)
    }

    fn prefix_path(prefix: &str) -> Option<ObjectPath> {
        if prefix.is_empty() {
            None
        } else {
            Some(ObjectPath::from(prefix))
        }
    }
}

#[async_trait]
impl BlobGateway for Storage {
    fn container(&self) -> &str {
        &self.container
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Ok(false);
        }
        match self.inner.head(&ObjectPath::from(key)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(self.classify(key, e)),
        }
    }

    async fn is_prefix_populated(&self, prefix: &str) -> Result<bool> {
        let path = Self::prefix_path(prefix);
        let mut stream = self.inner.list(path.as_ref());
        match stream.try_next().await {
            Ok(first) => Ok(first.is_some()),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(self.classify(prefix, e)),
        }
    }

    async fn metadata(&self, key: &str) -> Result<BlobMetadata> {
        if key.is_empty() {
            return Ok(BlobMetadata::default());
        }
        match self.inner.head(&ObjectPath::from(key)).await {
            Ok(meta) => Ok(BlobMetadata {
                size: meta.size as u64,
                last_modified: Some(meta.last_modified),
            }),
            Err(object_store::Error::NotFound { .. }) => Ok(BlobMetadata::default()),
            Err(e) => Err(self.classify(key, e)),
        }
    }

    async fn list(&self, prefix: &str, max_results: usize) -> Result<Vec<ListEntry>> {
        let path = Self::prefix_path(prefix);
        let mut entries = if self.ordered_listing {
            self.list_streaming(path.as_ref(), prefix, max_results).await?
        } else {
            self.list_buffered(path.as_ref(), prefix, max_results).await?
        };

        // Sorting by name gives a stable order for an unmodified container.
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::debug!(
            container = %self.container,
            prefix = %prefix,
            found = entries.len(),
            "listed prefix"
        );

        Ok(entries)
    }

    async fn get(&self, key: &str) -> Result<ByteStream> {
        let result = self
            .inner
            .get(&ObjectPath::from(key))
            .await
            .map_err(|e| self.classify(key, e))?;

        let container = self.container.clone();
        let key = key.to_string();
        let stream = result
            .into_stream()
            .map_err(move |e| BlobStoreError::classify(&container, &key, e));
        Ok(stream.boxed())
    }

    async fn put(
        &self,
        key: &str,
        payload: ByteStream,
        size: Option<u64>,
        content_type: &str,
    ) -> Result<()> {
        let chunks: Vec<Bytes> = payload.try_collect().await?;
        let written: u64 = chunks.iter().map(|c| c.len() as u64).sum();
        if let Some(declared) = size {
            if declared != written {
                tracing::warn!(
                    container = %self.container,
                    key = %key,
                    declared,
                    written,
                    "payload size differs from declared size"
                );
            }
        }

        let mut opts = PutOptions::default();
        if self.supports_attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            opts.attributes = attributes;
        }

        self.inner
            .put_opts(&ObjectPath::from(key), PutPayload::from_iter(chunks), opts)
            .await
            .map_err(|e| self.classify(key, e))?;

        tracing::info!(container = %self.container, key = %key, size = written, "blob stored");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        // Ignore NotFound errors - the blob may already be deleted
        match self.inner.delete(&ObjectPath::from(key)).await {
            Ok(()) => {}
            Err(object_store::Error::NotFound { .. }) => {}
            Err(e) => return Err(self.classify(key, e)),
        }
        tracing::info!(container = %self.container, key = %key, "blob removed");
        Ok(())
    }
}

/// The unescaped key of a store path.
///
/// `ObjectPath::from` escapes characters such as `#` and `%` in every
/// segment; listings hand back that escaped form, so names are decoded
/// before they leave the gateway and re-escaped on the way in.
fn decode_path(path: &ObjectPath) -> String {
    path.parts()
        .map(|part| decode_part(&part))
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

fn decode_part(part: &PathPart<'_>) -> String {
    percent_decode_str(part.as_ref())
        .decode_utf8_lossy()
        .into_owned()
}

fn child_key(root: &ObjectPath, child: &PathPart<'_>) -> String {
    let name = decode_part(child);
    if root.as_ref().is_empty() {
        name
    } else {
        format!("{}{}{}", decode_path(root), DELIMITER, name)
    }
}
