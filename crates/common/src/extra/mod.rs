//! Extra properties: node properties the blob store cannot represent
//! (custom types, mixins, arbitrary host properties), persisted in a
//! side store keyed by node id.

mod json;
mod memory;
mod none;
mod provider;

use std::sync::Arc;

pub use json::JsonExtraPropertiesStore;
pub use memory::MemoryExtraPropertiesStore;
pub use none::NoExtraPropertiesStore;
pub use provider::{ExtraPropertiesError, ExtraPropertiesStore};

use crate::connector::{Properties, PropertyValue};

/// Pending changes to one node's extra properties.
///
/// Created per write; nothing reaches the store until [`save`](Self::save).
/// With `update` the pending properties merge into what is stored (a
/// `Null` value removes a property); without it they replace it.
#[derive(Debug)]
pub struct ExtraProperties {
    store: Arc<dyn ExtraPropertiesStore>,
    id: String,
    update: bool,
    pending: Properties,
}

impl ExtraProperties {
    pub fn new(store: Arc<dyn ExtraPropertiesStore>, id: impl Into<String>, update: bool) -> Self {
        Self {
            store,
            id: id.into(),
            update,
            pending: Properties::new(),
        }
    }

    /// Stage a set of properties; finish with [`AddAll::except`].
    pub fn add_all(&mut self, properties: Properties) -> AddAll<'_> {
        AddAll {
            extra: self,
            properties,
        }
    }

    pub fn add(&mut self, name: impl Into<String>, value: PropertyValue) -> &mut Self {
        self.pending.insert(name.into(), value);
        self
    }

    pub fn pending(&self) -> &Properties {
        &self.pending
    }

    pub async fn save(self) -> Result<(), ExtraPropertiesError> {
        let properties = if self.update {
            let mut merged = self.store.get_properties(&self.id).await?;
            for (name, value) in self.pending {
                if value.is_null() {
                    merged.remove(&name);
                } else {
                    merged.insert(name, value);
                }
            }
            merged
        } else {
            self.pending
                .into_iter()
                .filter(|(_, value)| !value.is_null())
                .collect()
        };

        if properties.is_empty() {
            self.store.remove_properties(&self.id).await?;
        } else {
            tracing::debug!(id = %self.id, count = properties.len(), "saving extra properties");
            self.store.store_properties(&self.id, properties).await?;
        }
        Ok(())
    }
}

/// Properties staged by [`ExtraProperties::add_all`].
#[must_use = "nothing is staged until `except` or `all` is called"]
pub struct AddAll<'a> {
    extra: &'a mut ExtraProperties,
    properties: Properties,
}

impl AddAll<'_> {
    /// Stage every property except the named ones
    pub fn except(self, names: &[&str]) {
        for (name, value) in self.properties {
            if !names.contains(&name.as_str()) {
                self.extra.pending.insert(name, value);
            }
        }
    }

    pub fn all(self) {
        self.except(&[]);
    }
}
