//! Binary payload handles.
//!
//! A [`LazyBinary`] names a blob but owns no data: the payload stream is
//! opened only when consumed, and whoever opens it owns it. Dropping the
//! stream releases the underlying connection on every exit path.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::{StreamExt, TryStreamExt};
use mime::Mime;
use object_store::{BlobGateway, BlobStoreError, ByteStream};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::ConnectorError;
use crate::mime_detector::{MimeDetector, SNIFF_LEN};

/// Deferred handle to a blob payload with deferred MIME detection.
#[derive(Debug, Clone)]
pub struct LazyBinary {
    gateway: Arc<dyn BlobGateway>,
    detector: Arc<dyn MimeDetector>,
    key: String,
    declared_size: Option<u64>,
    name_hint: String,
    locator: String,
}

impl LazyBinary {
    pub fn new(
        gateway: Arc<dyn BlobGateway>,
        detector: Arc<dyn MimeDetector>,
        key: impl Into<String>,
        declared_size: Option<u64>,
        name_hint: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            detector,
            key: key.into(),
            declared_size,
            name_hint: name_hint.into(),
            locator: locator.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn container(&self) -> &str {
        self.gateway.container()
    }

    /// Size known at construction; `None` when unknown
    pub fn declared_size(&self) -> Option<u64> {
        self.declared_size
    }

    pub fn name_hint(&self) -> &str {
        &self.name_hint
    }

    /// Externally resolvable locator of the payload
    pub fn locator(&self) -> &str {
        &self.locator
    }

    fn content_missing(&self) -> ConnectorError {
        ConnectorError::ContentMissing {
            container: self.container().to_string(),
            key: self.key.clone(),
        }
    }

    /// Open the payload. Fails with `ContentMissing` if no object resolves
    ///  at the key, including when it vanishes between check and open.
    pub async fn open_stream(&self) -> Result<ByteStream, ConnectorError> {
        let exists = self
            .gateway
            .exists(&self.key)
            .await
            .map_err(|e| ConnectorError::store(self.container(), &self.key, e))?;
        if !exists {
            return Err(self.content_missing());
        }

        match self.gateway.get(&self.key).await {
            Ok(stream) => Ok(stream),
            Err(BlobStoreError::NotFound { .. }) => Err(self.content_missing()),
            Err(e) => Err(ConnectorError::store(self.container(), &self.key, e)),
        }
    }

    /// The declared size, or the stored object's size when undeclared
    pub async fn size(&self) -> Result<u64, ConnectorError> {
        if let Some(size) = self.declared_size {
            return Ok(size);
        }
        let metadata = self
            .gateway
            .metadata(&self.key)
            .await
            .map_err(|e| ConnectorError::store(self.container(), &self.key, e))?;
        Ok(metadata.size)
    }

    /// Detect the MIME type from a prefix of the payload.
    ///
    /// Reads through its own stream, so streams handed to other consumers
    /// are never advanced. Costs a round trip plus up to [`SNIFF_LEN`] bytes.
    pub async fn mime_type(&self) -> Result<Option<Mime>, ConnectorError> {
        let stream = self.open_stream().await?;
        let prefix = read_prefix(stream, SNIFF_LEN)
            .await
            .map_err(|e| ConnectorError::store(self.container(), &self.key, e))?;
        Ok(self.detector.detect(&prefix, &self.name_hint))
    }

    /// Read the whole payload into memory
    pub async fn to_bytes(&self) -> Result<Bytes, ConnectorError> {
        let stream = self.open_stream().await?;
        collect(stream)
            .await
            .map_err(|e| ConnectorError::store(self.container(), &self.key, e))
    }
}

/// A binary property value: either a handle to a stored blob or an
/// in-memory payload supplied by a writer.
#[derive(Debug, Clone)]
pub enum BinaryValue {
    Lazy(LazyBinary),
    Inline(Bytes),
}

impl BinaryValue {
    pub async fn open_stream(&self) -> Result<ByteStream, ConnectorError> {
        match self {
            BinaryValue::Lazy(lazy) => lazy.open_stream().await,
            BinaryValue::Inline(bytes) => {
                Ok(futures::stream::once(futures::future::ready(Ok(bytes.clone()))).boxed())
            }
        }
    }

    /// Size if known without touching the payload
    pub fn declared_size(&self) -> Option<u64> {
        match self {
            BinaryValue::Lazy(lazy) => lazy.declared_size(),
            BinaryValue::Inline(bytes) => Some(bytes.len() as u64),
        }
    }

    pub async fn to_bytes(&self) -> Result<Bytes, ConnectorError> {
        match self {
            BinaryValue::Lazy(lazy) => lazy.to_bytes().await,
            BinaryValue::Inline(bytes) => Ok(bytes.clone()),
        }
    }

    pub fn as_lazy(&self) -> Option<&LazyBinary> {
        match self {
            BinaryValue::Lazy(lazy) => Some(lazy),
            BinaryValue::Inline(_) => None,
        }
    }
}

impl From<LazyBinary> for BinaryValue {
    fn from(value: LazyBinary) -> Self {
        BinaryValue::Lazy(value)
    }
}

impl From<Bytes> for BinaryValue {
    fn from(value: Bytes) -> Self {
        BinaryValue::Inline(value)
    }
}

impl From<Vec<u8>> for BinaryValue {
    fn from(value: Vec<u8>) -> Self {
        BinaryValue::Inline(Bytes::from(value))
    }
}

impl From<&'static [u8]> for BinaryValue {
    fn from(value: &'static [u8]) -> Self {
        BinaryValue::Inline(Bytes::from_static(value))
    }
}

// Only a summary is serialized; the payload stays in the store.
impl Serialize for BinaryValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            BinaryValue::Lazy(lazy) => {
                let mut state = serializer.serialize_struct("BinaryValue", 4)?;
                state.serialize_field("container", lazy.container())?;
                state.serialize_field("key", lazy.key())?;
                state.serialize_field("size", &lazy.declared_size())?;
                state.serialize_field("locator", lazy.locator())?;
                state.end()
            }
            BinaryValue::Inline(bytes) => {
                let mut state = serializer.serialize_struct("BinaryValue", 1)?;
                state.serialize_field("size", &bytes.len())?;
                state.end()
            }
        }
    }
}

async fn read_prefix(mut stream: ByteStream, limit: usize) -> Result<Bytes, BlobStoreError> {
    let mut buf = BytesMut::new();
    while buf.len() < limit {
        match stream.try_next().await? {
            Some(chunk) => buf.extend_from_slice(&chunk),
            None => break,
        }
    }
    buf.truncate(limit);
    Ok(buf.freeze())
}

async fn collect(stream: ByteStream) -> Result<Bytes, BlobStoreError> {
    let chunks: Vec<Bytes> = stream.try_collect().await?;
    Ok(Bytes::from(chunks.concat()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mime_detector::GuessingMimeDetector;
    use object_store::Storage;

    fn lazy(storage: &Storage, key: &str) -> LazyBinary {
        LazyBinary::new(
            Arc::new(storage.clone()),
            Arc::new(GuessingMimeDetector),
            key,
            None,
            key,
            format!("memory:///bucket/{key}"),
        )
    }

    async fn put(storage: &Storage, key: &str, data: &'static [u8]) {
        let stream = BinaryValue::from(data).open_stream().await.unwrap();
        storage
            .put(key, stream, Some(data.len() as u64), "application/octet-stream")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_content_fails_on_open() {
        let storage = Storage::memory("bucket");
        let binary = lazy(&storage, "nope.txt");
        let err = binary.open_stream().await.err().unwrap();
        assert!(matches!(err, ConnectorError::ContentMissing { .. }));
    }

    #[tokio::test]
    async fn test_read_and_size() {
        let storage = Storage::memory("bucket");
        put(&storage, "a/b.txt", b"hello").await;

        let binary = lazy(&storage, "a/b.txt");
        assert_eq!(binary.to_bytes().await.unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(binary.size().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_mime_detection_does_not_disturb_other_streams() {
        let storage = Storage::memory("bucket");
        put(&storage, "blob", b"some text payload").await;
        let binary = lazy(&storage, "blob");

        let stream = binary.open_stream().await.unwrap();
        assert_eq!(binary.mime_type().await.unwrap(), Some(mime::TEXT_PLAIN));
        let rest = collect(stream).await.unwrap();
        assert_eq!(rest, Bytes::from_static(b"some text payload"));
    }

    #[tokio::test]
    async fn test_read_prefix_truncates() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"abc")),
            Ok(Bytes::from_static(b"defg")),
        ])
        .boxed();
        let prefix = read_prefix(stream, 5).await.unwrap();
        assert_eq!(prefix, Bytes::from_static(b"abcde"));
    }

    #[tokio::test]
    async fn test_inline_binary() {
        let binary = BinaryValue::from(b"inline".to_vec());
        assert_eq!(binary.declared_size(), Some(6));
        assert_eq!(binary.to_bytes().await.unwrap(), Bytes::from_static(b"inline"));
        assert!(binary.as_lazy().is_none());
    }
}
