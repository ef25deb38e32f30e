use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::provider::{ExtraPropertiesError, ExtraPropertiesStore};
use crate::connector::Properties;

/// Stores each node's extra properties as a JSON sidecar file in a local
///  directory. File names are the SHA-256 of the node id, so any id maps
///  to a safe, fixed-length name.
#[derive(Debug, Clone)]
pub struct JsonExtraPropertiesStore {
    dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct Sidecar {
    id: String,
    properties: Properties,
}

impl JsonExtraPropertiesStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: &Path) -> Result<Self, ExtraPropertiesError> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn sidecar_path(&self, id: &str) -> PathBuf {
        let digest = Sha256::digest(id.as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }
}

#[async_trait]
impl ExtraPropertiesStore for JsonExtraPropertiesStore {
    async fn get_properties(&self, id: &str) -> Result<Properties, ExtraPropertiesError> {
        let path = self.sidecar_path(id);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Properties::new()),
            Err(e) => return Err(e.into()),
        };
        let sidecar: Sidecar = serde_json::from_slice(&raw)?;
        if sidecar.id != id {
            // only possible with a hash collision or a hand-edited file
            tracing::warn!(
                id = %id,
                found = %sidecar.id,
                path = %path.display(),
                "extra properties sidecar belongs to another id"
            );
            return Ok(Properties::new());
        }
        Ok(sidecar.properties)
    }

    async fn store_properties(
        &self,
        id: &str,
        properties: Properties,
    ) -> Result<(), ExtraPropertiesError> {
        if properties.is_empty() {
            self.remove_properties(id).await?;
            return Ok(());
        }
        let sidecar = Sidecar {
            id: id.to_string(),
            properties,
        };
        let raw = serde_json::to_vec_pretty(&sidecar)?;
        tokio::fs::write(self.sidecar_path(id), raw).await?;
        Ok(())
    }

    async fn remove_properties(&self, id: &str) -> Result<bool, ExtraPropertiesError> {
        match tokio::fs::remove_file(self.sidecar_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::PropertyValue;

    #[tokio::test]
    async fn test_json_store_persists_across_instances() {
        let temp_dir = tempfile::tempdir().unwrap();

        let mut props = Properties::new();
        props.insert("ex:title".to_string(), PropertyValue::from("Report"));
        props.insert("ex:pages".to_string(), PropertyValue::from(12i64));

        {
            let store = JsonExtraPropertiesStore::open(temp_dir.path()).await.unwrap();
            store
                .store_properties("/docs/report.txt", props.clone())
                .await
                .unwrap();
        }

        let store = JsonExtraPropertiesStore::open(temp_dir.path()).await.unwrap();
        assert_eq!(
            store.get_properties("/docs/report.txt").await.unwrap(),
            props
        );
        assert!(store.get_properties("/docs").await.unwrap().is_empty());

        assert!(store.remove_properties("/docs/report.txt").await.unwrap());
        assert!(!store.remove_properties("/docs/report.txt").await.unwrap());
    }
}
