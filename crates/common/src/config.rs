use std::path::{Path, PathBuf};
use std::sync::Arc;

use object_store::ObjectStoreConfig;
use serde::{Deserialize, Serialize};

use crate::extra::{
    ExtraPropertiesError, ExtraPropertiesStore, JsonExtraPropertiesStore,
    MemoryExtraPropertiesStore, NoExtraPropertiesStore,
};

/// The maximum number of children a folder exposes per page
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Hard cap on a single folder listing, bounding memory rather than paging
pub const DEFAULT_LIST_LIMIT: usize = 1000;
pub const DEFAULT_URL_PREFIX: &str = "memory://";
pub const DEFAULT_CONTAINER: &str = "blobtree";

/// Where extra properties are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtraPropertiesConfig {
    /// Process memory; lost on restart
    #[default]
    Memory,
    /// JSON sidecar files in a local directory
    Json { path: PathBuf },
    /// Not persisted at all
    None,
}

impl ExtraPropertiesConfig {
    pub async fn build(&self) -> Result<Arc<dyn ExtraPropertiesStore>, ExtraPropertiesError> {
        let store: Arc<dyn ExtraPropertiesStore> = match self {
            ExtraPropertiesConfig::Memory => Arc::new(MemoryExtraPropertiesStore::new()),
            ExtraPropertiesConfig::Json { path } => {
                Arc::new(JsonExtraPropertiesStore::open(path).await?)
            }
            ExtraPropertiesConfig::None => Arc::new(NoExtraPropertiesStore),
        };
        Ok(store)
    }
}

/// Static connector configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Provider and credentials of the backing store
    #[serde(default)]
    pub store: ObjectStoreConfig,
    /// Container (bucket) exposed by the connector
    #[serde(default = "default_container")]
    pub container: String,
    /// Prefix of externally resolvable binary locators,
    ///  e.g. "https://s3.amazonaws.com"
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// Add the 'mix:mimeType' mixin to every node and compute the MIME
    ///  type of content nodes eagerly. Reads a prefix of every payload,
    ///  which can be expensive.
    #[serde(default)]
    pub add_mime_type_mixin: bool,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
    #[serde(default)]
    pub extra_properties: ExtraPropertiesConfig,
}

fn default_container() -> String {
    DEFAULT_CONTAINER.to_string()
}

fn default_url_prefix() -> String {
    DEFAULT_URL_PREFIX.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            store: ObjectStoreConfig::default(),
            container: default_container(),
            url_prefix: default_url_prefix(),
            add_mime_type_mixin: false,
            page_size: default_page_size(),
            list_limit: default_list_limit(),
            extra_properties: ExtraPropertiesConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConnectorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ConnectorConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.container.is_empty() {
            return Err(ConfigError::Invalid("container must not be empty".into()));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be positive".into()));
        }
        if self.list_limit < self.page_size {
            return Err(ConfigError::Invalid(
                "list_limit must be at least page_size".into(),
            ));
        }
        Ok(())
    }
}
