//! The connector: a blob container exposed as a tree of documents
//!
//! - **[`Connector`]**: the capability interface a host calls; one shared
//!   store handle, no caches, every call re-reads the store
//! - **[`Document`]**: the in-memory node handed back to the host
//! - **[`LazyBinary`]**: a handle to a payload that is opened only when read
//! - **[`PageKey`] / [`PageDescriptor`]**: offset paging over folder listings
//!
//! # Tree shape
//!
//! ```text
//! /                       folder   (the container)
//! ├── docs                folder   (populated key prefix "docs/")
//! │   ├── report.txt      file     (object "docs/report.txt")
//! │   │   └── jcr:content resource (payload of "docs/report.txt")
//! │   └── notes           folder
//! └── ...
//! ```
//!
//! Folders are implicit: a structural id is a folder when its key is a
//! populated prefix, and a file otherwise. Every file has exactly one
//! synthetic child, `jcr:content`, which carries the binary.
//!
//! Properties the store cannot represent are kept by an
//! [`ExtraPropertiesStore`](crate::extra::ExtraPropertiesStore) and merged
//! over the computed ones on every read.

mod binary;
mod connector_inner;
mod document;
mod id;
mod materialize;
mod paging;
mod write;

use object_store::BlobStoreError;

use crate::extra::ExtraPropertiesError;

pub use binary::{BinaryValue, LazyBinary};
pub use connector_inner::{Connector, ConnectorOptions};
pub use document::{
    ChildRef, Document, PrimaryType, Properties, PropertyValue, ABSOLUTE_URI, JCR_CREATED,
    JCR_DATA, JCR_ENCODING, JCR_LAST_MODIFIED, JCR_MIME_TYPE, JCR_MIXIN_TYPES, JCR_PRIMARY_TYPE,
    MIX_MIME_TYPE, NT_FILE, NT_FOLDER, NT_RESOURCE,
};
pub use id::{
    blob_key, blob_key_from_remote_name, child_name, content_id, id_for_key, is_content_id,
    is_root_id, join_child, parent_id, remote_name, CONTENT_SUFFIX, DELIMITER, JCR_CONTENT,
    ROOT_ID,
};
pub use paging::{page, PageDescriptor, PageKey, Window};

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("invalid identifier: '{0}'")]
    InvalidIdentifier(String),
    #[error("content missing: no object at {container}/{key}")]
    ContentMissing { container: String, key: String },
    #[error("store operation failed on {container}/{key}: {source}")]
    Store {
        container: String,
        key: String,
        #[source]
        source: BlobStoreError,
    },
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("no binary payload supplied for {0}")]
    MissingPayload(String),
    #[error("extra properties error: {0}")]
    ExtraProperties(#[from] ExtraPropertiesError),
    #[error("invalid page key: '{0}'")]
    InvalidPageKey(String),
    #[error("config error: {0}")]
    Config(String),
}

impl ConnectorError {
    /// Wrap a store failure with the container/key it happened on
    pub fn store(container: &str, key: &str, source: BlobStoreError) -> Self {
        ConnectorError::Store {
            container: container.to_string(),
            key: key.to_string(),
            source,
        }
    }

    /// Whether the caller may retry the same call
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::Store { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Whether the backing store refused or could not be reached
    pub fn is_unavailable(&self) -> bool {
        match self {
            ConnectorError::StoreUnavailable(_) => true,
            ConnectorError::Store { source, .. } => source.is_unavailable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_carries_location() {
        let err = ConnectorError::store(
            "bucket",
            "a/b",
            BlobStoreError::Unavailable {
                container: "bucket".into(),
                reason: "denied".into(),
            },
        );
        assert!(err.to_string().contains("bucket/a/b"));
        assert!(err.is_unavailable());
        assert!(!err.is_transient());
    }
}
