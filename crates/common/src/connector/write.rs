use mime::APPLICATION_OCTET_STREAM;

use super::binary::BinaryValue;
use super::connector_inner::Connector;
use super::document::{
    Document, PrimaryType, PropertyValue, JCR_CREATED, JCR_DATA, JCR_LAST_MODIFIED,
    JCR_MIME_TYPE, JCR_PRIMARY_TYPE,
};
use super::id::{blob_key, child_name, content_id, is_content_id};
use super::ConnectorError;
use crate::extra::ExtraProperties;
use crate::mime_detector::SNIFF_LEN;

/// Derived on every read, never persisted as extra properties
const DERIVED_PROPERTIES: &[&str] = &[JCR_PRIMARY_TYPE, JCR_CREATED, JCR_LAST_MODIFIED, JCR_DATA];

impl Connector {
    /// Write a document, replacing its stored extra properties.
    ///
    /// Content documents put their binary under the file's key. Folders
    /// and files are implicit in the key space, so for them only the
    /// extra properties are written.
    pub async fn store_document(&self, document: Document) -> Result<(), ConnectorError> {
        self.write_document(document, false).await
    }

    /// Like [`store_document`](Self::store_document), but merges into the
    ///  stored extra properties; a `Null` value removes a property.
    pub async fn update_document(&self, document: Document) -> Result<(), ConnectorError> {
        self.write_document(document, true).await
    }

    async fn write_document(&self, mut document: Document, update: bool) -> Result<(), ConnectorError> {
        let id = document.id().to_string();
        let key = blob_key(&id)?;
        let is_content = is_content_id(&id);

        if is_content {
            if key.is_empty() {
                return Err(ConnectorError::InvalidIdentifier(id));
            }
            let binary = document
                .take_binary()
                .ok_or_else(|| ConnectorError::MissingPayload(id.clone()))?;
            self.put_binary(&document, &key, binary).await?;
        } else {
            tracing::debug!(
                id = %id,
                primary_type = %document.primary_type(),
                "folders and files are implicit, nothing to put"
            );
        }

        let mut extra = ExtraProperties::new(self.extra.clone(), id.as_str(), update);
        extra
            .add_all(document.all_properties())
            .except(DERIVED_PROPERTIES);

        // keep a type the store cannot express
        let expected = match document.primary_type() {
            PrimaryType::Resource => is_content,
            PrimaryType::Folder | PrimaryType::File => !is_content,
            PrimaryType::Other(_) => false,
        };
        if !expected {
            extra.add(
                JCR_PRIMARY_TYPE,
                PropertyValue::from(document.primary_type().as_str()),
            );
        }

        extra.save().await?;
        Ok(())
    }

    async fn put_binary(
        &self,
        document: &Document,
        key: &str,
        binary: BinaryValue,
    ) -> Result<(), ConnectorError> {
        let content_type = self.content_type_for(document, key, &binary);
        let size = binary.declared_size();
        let payload = binary.open_stream().await?;

        self.gateway
            .put(key, payload, size, &content_type)
            .await
            .map_err(self.store_err(key))?;

        tracing::info!(
            container = %self.container(),
            key = %key,
            size = ?size,
            content_type = %content_type,
            "stored content"
        );
        Ok(())
    }

    /// An explicit `jcr:mimeType` wins; otherwise ask the detector, which
    ///  only sees payload bytes that are already in memory.
    fn content_type_for(&self, document: &Document, key: &str, binary: &BinaryValue) -> String {
        if let Some(mime) = document
            .property(JCR_MIME_TYPE)
            .and_then(PropertyValue::as_str)
        {
            return mime.to_string();
        }

        let prefix: &[u8] = match binary {
            BinaryValue::Inline(bytes) => &bytes[..bytes.len().min(SNIFF_LEN)],
            BinaryValue::Lazy(_) => &[],
        };
        self.detector
            .detect(prefix, child_name(key))
            .unwrap_or(APPLICATION_OCTET_STREAM)
            .to_string()
    }

    /// Remove the object behind `id` and its extra properties.
    ///
    /// Returns `false` if there was neither. Folders are implicit, so
    /// removing one leaves its children in place.
    pub async fn remove_document(&self, id: &str) -> Result<bool, ConnectorError> {
        let key = blob_key(id)?;

        let object_exists = if key.is_empty() {
            false
        } else {
            self.gateway
                .exists(&key)
                .await
                .map_err(self.store_err(&key))?
        };
        let has_extra = self.extra.contains(id).await?;

        if !object_exists && !has_extra {
            tracing::debug!(id = %id, "nothing to remove");
            return Ok(false);
        }

        if object_exists {
            self.gateway
                .remove(&key)
                .await
                .map_err(self.store_err(&key))?;
        }
        self.extra.remove_properties(id).await?;
        if !is_content_id(id) && !key.is_empty() {
            // the content child goes with its file
            self.extra.remove_properties(&content_id(id)).await?;
        }

        tracing::info!(id = %id, key = %key, object = object_exists, "removed document");
        Ok(true)
    }
}
