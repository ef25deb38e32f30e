use async_trait::async_trait;

use super::provider::{ExtraPropertiesError, ExtraPropertiesStore};
use crate::connector::Properties;

/// Persists nothing. Reads are always empty and writes are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtraPropertiesStore;

#[async_trait]
impl ExtraPropertiesStore for NoExtraPropertiesStore {
    async fn get_properties(&self, _id: &str) -> Result<Properties, ExtraPropertiesError> {
        Ok(Properties::new())
    }

    async fn store_properties(
        &self,
        id: &str,
        properties: Properties,
    ) -> Result<(), ExtraPropertiesError> {
        if !properties.is_empty() {
            tracing::debug!(id = %id, count = properties.len(), "dropping extra properties");
        }
        Ok(())
    }

    async fn remove_properties(&self, _id: &str) -> Result<bool, ExtraPropertiesError> {
        Ok(false)
    }
}
