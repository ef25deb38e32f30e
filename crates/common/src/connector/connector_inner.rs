use std::sync::Arc;

use object_store::{BlobGateway, BlobStoreError, Storage};

use super::binary::LazyBinary;
use super::id::{blob_key, blob_key_from_remote_name, child_name, is_root_id, join_child};
use super::ConnectorError;
use crate::config::{ConnectorConfig, DEFAULT_LIST_LIMIT, DEFAULT_PAGE_SIZE, DEFAULT_URL_PREFIX};
use crate::extra::ExtraPropertiesStore;
use crate::mime_detector::{GuessingMimeDetector, MimeDetector};

/// Behavior switches fixed at startup
#[derive(Debug, Clone)]
pub struct ConnectorOptions {
    /// Children emitted per folder page
    pub page_size: usize,
    /// Hard cap on a single listing
    pub list_limit: usize,
    /// Attach `mix:mimeType` to every node and detect content MIME eagerly
    pub add_mime_type_mixin: bool,
    /// Prefix of the locators produced for file payloads
    pub url_prefix: String,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            list_limit: DEFAULT_LIST_LIMIT,
            add_mime_type_mixin: false,
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        }
    }
}

impl From<&ConnectorConfig> for ConnectorOptions {
    fn from(config: &ConnectorConfig) -> Self {
        Self {
            page_size: config.page_size,
            list_limit: config.list_limit,
            add_mime_type_mixin: config.add_mime_type_mixin,
            url_prefix: config.url_prefix.clone(),
        }
    }
}

/// Exposes one blob container as a tree of documents.
///
/// Cheap to clone; clones share the store handle, which is safe for
/// concurrent use. Holds no caches: every call reads the store afresh.
#[derive(Debug, Clone)]
pub struct Connector {
    pub(super) gateway: Arc<dyn BlobGateway>,
    pub(super) extra: Arc<dyn ExtraPropertiesStore>,
    pub(super) detector: Arc<dyn MimeDetector>,
    pub(super) options: ConnectorOptions,
}

impl Connector {
    pub fn new(
        gateway: Arc<dyn BlobGateway>,
        extra: Arc<dyn ExtraPropertiesStore>,
        options: ConnectorOptions,
    ) -> Self {
        Self {
            gateway,
            extra,
            detector: Arc::new(GuessingMimeDetector),
            options,
        }
    }

    /// Replace the MIME detector
    pub fn with_detector(mut self, detector: Arc<dyn MimeDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Open the store handle and extra-properties store described by `config`.
    ///
    /// Fails with `StoreUnavailable` when the provider rejects the
    /// configuration or credentials, or the container is unreachable.
    pub async fn open(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        config
            .validate()
            .map_err(|e| ConnectorError::Config(e.to_string()))?;

        let storage = Storage::new(config.store.clone(), &config.container)
            .await
            .map_err(|e| ConnectorError::StoreUnavailable(e.to_string()))?;
        let extra = config.extra_properties.build().await?;

        tracing::info!(
            provider = config.store.provider(),
            container = %config.container,
            mime_mixin = config.add_mime_type_mixin,
            "connector opened"
        );
        Ok(Self::new(Arc::new(storage), extra, config.into()))
    }

    /// Release the store handle. Outstanding clones keep it alive until
    ///  they are dropped too.
    pub fn shutdown(self) {
        tracing::info!(container = %self.container(), "connector shut down");
    }

    pub fn container(&self) -> &str {
        self.gateway.container()
    }

    pub fn options(&self) -> &ConnectorOptions {
        &self.options
    }

    pub(super) fn store_err(&self, key: &str) -> impl FnOnce(BlobStoreError) -> ConnectorError {
        let container = self.container().to_string();
        let key = key.to_string();
        move |e| ConnectorError::store(&container, &key, e)
    }

    /// Whether `key` exists as an object or a populated prefix
    pub(super) async fn key_exists(&self, key: &str) -> Result<bool, ConnectorError> {
        if self.gateway.exists(key).await.map_err(self.store_err(key))? {
            return Ok(true);
        }
        self.gateway
            .is_prefix_populated(key)
            .await
            .map_err(self.store_err(key))
    }

    /// Whether a node exists at `id`. The root always does.
    pub async fn has_document(&self, id: &str) -> Result<bool, ConnectorError> {
        if is_root_id(id) {
            return Ok(true);
        }
        let key = blob_key(id)?;
        if key.is_empty() {
            return Ok(false);
        }
        self.key_exists(&key).await
    }

    /// Resolve an external path to a node id. Ids are paths, so this only
    ///  checks that something lives there.
    pub async fn get_document_id(&self, path: &str) -> Result<Option<String>, ConnectorError> {
        if self.has_document(path).await? {
            Ok(Some(path.to_string()))
        } else {
            Ok(None)
        }
    }

    /// All paths a node is reachable under; ids are paths, so exactly one.
    pub fn get_document_paths_by_id(&self, id: &str) -> Vec<String> {
        vec![id.to_string()]
    }

    /// Resolve a locator produced by this connector back to a binary handle.
    ///
    /// # Panics
    ///
    /// If the locator was produced for another url prefix or container.
    pub fn get_binary_value(&self, locator: &str) -> LazyBinary {
        let key = blob_key_from_remote_name(locator, &self.options.url_prefix, self.container());
        LazyBinary::new(
            self.gateway.clone(),
            self.detector.clone(),
            key.clone(),
            None,
            child_name(&key),
            locator,
        )
    }

    /// The id of a new child `name` under `parent_id`.
    ///
    /// Namespace prefixes are dropped from the name (blob keys have
    /// none), except for the content child.
    pub fn new_document_id(&self, parent_id: &str, name: &str) -> String {
        let (id, namespace) = join_child(parent_id, name);
        if let Some(namespace) = namespace {
            tracing::warn!(
                parent = %parent_id,
                name = %name,
                namespace = %namespace,
                "namespace is ignored for blob keys"
            );
        }
        id
    }
}
