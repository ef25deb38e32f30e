use std::fmt::Debug;

use async_trait::async_trait;

use crate::connector::Properties;

#[derive(Debug, thiserror::Error)]
pub enum ExtraPropertiesError {
    #[error("extra properties error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("extra properties i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("extra properties encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("extra properties provider error: {0}")]
    Internal(String),
}

/// Side store for node properties the blob store cannot hold natively.
///
/// Keyed by node id. A store holding an empty property set for an id is
/// indistinguishable from one holding nothing.
#[async_trait]
pub trait ExtraPropertiesStore: Send + Sync + Debug + 'static {
    /// Get the stored properties for a node; empty if none
    async fn get_properties(&self, id: &str) -> Result<Properties, ExtraPropertiesError>;

    /// Replace the stored properties for a node
    async fn store_properties(
        &self,
        id: &str,
        properties: Properties,
    ) -> Result<(), ExtraPropertiesError>;

    /// Remove all stored properties for a node
    ///
    /// # Returns
    /// * `Ok(true)` - Properties existed and were removed
    /// * `Ok(false)` - Nothing was stored for the node
    async fn remove_properties(&self, id: &str) -> Result<bool, ExtraPropertiesError>;

    /// Whether anything is stored for the node
    async fn contains(&self, id: &str) -> Result<bool, ExtraPropertiesError> {
        Ok(!self.get_properties(id).await?.is_empty())
    }
}
