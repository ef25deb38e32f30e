use chrono::{DateTime, Utc};
use object_store::ListEntry;

use super::binary::LazyBinary;
use super::connector_inner::Connector;
use super::document::{
    Document, PrimaryType, PropertyValue, ABSOLUTE_URI, JCR_CREATED, JCR_ENCODING,
    JCR_LAST_MODIFIED, JCR_MIME_TYPE, MIX_MIME_TYPE,
};
use super::id::{
    blob_key, child_name, content_id, id_for_key, is_content_id, is_root_id, parent_id,
    remote_name, JCR_CONTENT,
};
use super::paging::{page, PageKey, Window};
use super::ConnectorError;

impl Connector {
    /// Build the document at `id`, or `None` if nothing resolves there.
    ///
    /// Content ids always resolve to a resource whose payload is checked
    /// only when opened. Structural ids resolve to a folder when their key
    /// is a populated prefix (the root always is one) and to a file
    /// otherwise. Stored extra properties are merged over the result.
    pub async fn get_document(&self, id: &str) -> Result<Option<Document>, ConnectorError> {
        let key = blob_key(id)?;

        let mut document = if is_content_id(id) {
            if key.is_empty() {
                tracing::debug!(id = %id, "content id without a file");
                return Ok(None);
            }
            self.content_document(id, &key).await?
        } else if is_root_id(id) || self.is_folder_key(&key).await? {
            let mut folder = Document::new(id, PrimaryType::Folder);
            let size = self.options.page_size;
            let window = self.list_children(&key, 0, size).await?;
            fill_children(&mut folder, window, size);
            folder
        } else if !key.is_empty() {
            self.file_document(id, &key)
        } else {
            tracing::debug!(id = %id, "unresolvable id");
            return Ok(None);
        };

        if let Some(parent) = parent_id(id) {
            document.set_parent(parent);
        }

        let extra = self.extra.get_properties(id).await?;
        if !extra.is_empty() {
            tracing::debug!(id = %id, count = extra.len(), "merging extra properties");
            document.merge_properties(extra);
        }

        if self.options.add_mime_type_mixin {
            document.add_mixin(MIX_MIME_TYPE);
        }
        Ok(Some(document))
    }

    /// The window of a folder's children addressed by `page_key`, with the
    ///  descriptor of the window after it. `None` if the parent is not a
    ///  folder.
    pub async fn get_children(&self, page_key: &PageKey) -> Result<Option<Document>, ConnectorError> {
        if page_key.block_size == 0 {
            return Err(ConnectorError::InvalidPageKey(page_key.to_string()));
        }
        let parent = page_key.parent_id.as_str();
        if is_content_id(parent) {
            return Ok(None);
        }

        let key = blob_key(parent)?;
        if !is_root_id(parent) && !self.is_folder_key(&key).await? {
            return Ok(None);
        }

        let window = self
            .list_children(&key, page_key.offset, page_key.block_size)
            .await?;
        let mut document = Document::new(parent, PrimaryType::Folder);
        fill_children(&mut document, window, page_key.block_size);
        Ok(Some(document))
    }

    async fn is_folder_key(&self, key: &str) -> Result<bool, ConnectorError> {
        if key.is_empty() {
            return Ok(false);
        }
        self.gateway
            .is_prefix_populated(key)
            .await
            .map_err(self.store_err(key))
    }

    async fn list_children(
        &self,
        key: &str,
        offset: usize,
        size: usize,
    ) -> Result<Window<ListEntry>, ConnectorError> {
        let entries: Vec<ListEntry> = self
            .gateway
            .list(key, self.options.list_limit)
            .await
            .map_err(self.store_err(key))?
            .into_iter()
            // the directory marker is not a child of itself
            .filter(|entry| entry.name != key)
            .collect();
        Ok(page(entries, offset, size))
    }

    async fn content_document(&self, id: &str, key: &str) -> Result<Document, ConnectorError> {
        let metadata = self
            .gateway
            .metadata(key)
            .await
            .map_err(self.store_err(key))?;
        // the object may not exist yet, e.g. mid-write
        let last_modified = metadata.last_modified.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let binary = LazyBinary::new(
            self.gateway.clone(),
            self.detector.clone(),
            key,
            None,
            child_name(key),
            remote_name(&self.options.url_prefix, self.container(), key),
        );

        let mut document =
            Document::new(id, PrimaryType::Resource).with_property(JCR_LAST_MODIFIED, last_modified);

        if self.options.add_mime_type_mixin {
            // the store keeps no character encoding
            document.set_property(JCR_ENCODING, PropertyValue::Null);
            match binary.mime_type().await {
                Ok(Some(mime)) => document.set_property(JCR_MIME_TYPE, mime.to_string()),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(id = %id, key = %key, error = %e, "failed to detect MIME type")
                }
            }
        }

        document.set_binary(binary.into());
        document.set_not_queryable();
        Ok(document)
    }

    fn file_document(&self, id: &str, key: &str) -> Document {
        // the store does not track creation apart from the last write
        let now = Utc::now();
        let mut document = Document::new(id, PrimaryType::File)
            .with_property(JCR_CREATED, now)
            .with_property(JCR_LAST_MODIFIED, now)
            .with_property(
                ABSOLUTE_URI,
                remote_name(&self.options.url_prefix, self.container(), key),
            );
        document.add_child(content_id(id), JCR_CONTENT);
        document.set_not_queryable();
        document
    }
}

fn fill_children(folder: &mut Document, window: Window<ListEntry>, size: usize) {
    let next = window.next_page(size);
    for entry in window.emitted {
        folder.add_child(id_for_key(&entry.name), child_name(&entry.name));
    }
    if let Some(next) = next {
        folder.set_page(next);
    }
    folder.set_not_queryable();
}
