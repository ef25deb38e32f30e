//! Shared test utilities for connector integration tests
#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use ::common::connector::{Connector, ConnectorOptions, Document, PrimaryType};
use ::common::extra::MemoryExtraPropertiesStore;
use object_store::Storage;
use tracing_subscriber::EnvFilter;

pub const CONTAINER: &str = "bucket";

/// Set up a connector over an in-memory container and extra-properties store
pub fn setup_test_env() -> (Connector, Storage, Arc<MemoryExtraPropertiesStore>) {
    setup_with_options(ConnectorOptions::default())
}

pub fn setup_with_options(
    options: ConnectorOptions,
) -> (Connector, Storage, Arc<MemoryExtraPropertiesStore>) {
    init_tracing();
    let storage = Storage::memory(CONTAINER);
    let extra = Arc::new(MemoryExtraPropertiesStore::new());
    let connector = Connector::new(Arc::new(storage.clone()), extra.clone(), options);
    (connector, storage, extra)
}

/// Route connector logs to the test output; filter with RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write `data` as the content of the file at `file_id`
pub async fn put_file(connector: &Connector, file_id: &str, data: &'static [u8]) {
    let content_id = format!("{file_id}/jcr:content");
    let document = Document::new(content_id, PrimaryType::Resource).with_binary(Bytes::from_static(data));
    connector.store_document(document).await.unwrap();
}

/// Page through a folder until no descriptor is left, collecting child ids
pub async fn all_children(connector: &Connector, folder_id: &str) -> Vec<String> {
    use ::common::connector::PageKey;

    let document = connector.get_document(folder_id).await.unwrap().unwrap();
    let mut ids: Vec<String> = document.children().iter().map(|c| c.id.clone()).collect();
    let mut next = document.page().copied();
    while let Some(page) = next {
        let key = PageKey::from_descriptor(folder_id, &page);
        let window = connector.get_children(&key).await.unwrap().unwrap();
        ids.extend(window.children().iter().map(|c| c.id.clone()));
        next = window.page().copied();
    }
    ids
}
