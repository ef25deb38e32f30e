use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::provider::{ExtraPropertiesError, ExtraPropertiesStore};
use crate::connector::Properties;

/// In-memory extra properties store
#[derive(Debug, Clone, Default)]
pub struct MemoryExtraPropertiesStore {
    inner: Arc<RwLock<HashMap<String, Properties>>>,
}

impl MemoryExtraPropertiesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> ExtraPropertiesError {
    ExtraPropertiesError::Internal(format!("failed to acquire lock: {}", e))
}

#[async_trait]
impl ExtraPropertiesStore for MemoryExtraPropertiesStore {
    async fn get_properties(&self, id: &str) -> Result<Properties, ExtraPropertiesError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.get(id).cloned().unwrap_or_default())
    }

    async fn store_properties(
        &self,
        id: &str,
        properties: Properties,
    ) -> Result<(), ExtraPropertiesError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if properties.is_empty() {
            inner.remove(id);
        } else {
            inner.insert(id.to_string(), properties);
        }
        Ok(())
    }

    async fn remove_properties(&self, id: &str) -> Result<bool, ExtraPropertiesError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(inner.remove(id).is_some())
    }
}
