use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::binary::BinaryValue;
use super::paging::PageDescriptor;

pub const JCR_PRIMARY_TYPE: &str = "jcr:primaryType";
pub const JCR_MIXIN_TYPES: &str = "jcr:mixinTypes";
pub const JCR_DATA: &str = "jcr:data";
pub const JCR_MIME_TYPE: &str = "jcr:mimeType";
pub const JCR_ENCODING: &str = "jcr:encoding";
pub const JCR_CREATED: &str = "jcr:created";
pub const JCR_LAST_MODIFIED: &str = "jcr:lastModified";
/// Externally resolvable locator of a file's payload
pub const ABSOLUTE_URI: &str = "blobtree:absoluteURI";

pub const NT_FOLDER: &str = "nt:folder";
pub const NT_FILE: &str = "nt:file";
pub const NT_RESOURCE: &str = "nt:resource";
pub const MIX_MIME_TYPE: &str = "mix:mimeType";

/// The node type tag of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrimaryType {
    Folder,
    File,
    /// The synthetic content child of a file
    Resource,
    /// Any other type, typically an override stored as an extra property
    Other(String),
}

impl PrimaryType {
    pub fn as_str(&self) -> &str {
        match self {
            PrimaryType::Folder => NT_FOLDER,
            PrimaryType::File => NT_FILE,
            PrimaryType::Resource => NT_RESOURCE,
            PrimaryType::Other(name) => name,
        }
    }
}

impl From<&str> for PrimaryType {
    fn from(name: &str) -> Self {
        match name {
            NT_FOLDER => PrimaryType::Folder,
            NT_FILE => PrimaryType::File,
            NT_RESOURCE => PrimaryType::Resource,
            other => PrimaryType::Other(other.to_string()),
        }
    }
}

impl From<String> for PrimaryType {
    fn from(name: String) -> Self {
        PrimaryType::from(name.as_str())
    }
}

impl From<PrimaryType> for String {
    fn from(value: PrimaryType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for PrimaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Explicitly no value; in a merge this removes the property
    Null,
    String(String),
    Boolean(bool),
    Long(i64),
    Double(f64),
    Date(DateTime<Utc>),
    Multiple(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Long(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::Date(value)
    }
}

/// Property name to value. Order carries no meaning.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A named reference from a folder or file to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: String,
    pub name: String,
}

/// In-memory tree node handed to the host.
///
/// Built fresh for every read and never cached; the host owns it once
/// returned. The same type carries incoming writes.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    id: String,
    primary_type: PrimaryType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    mixin_types: Vec<String>,
    properties: Properties,
    #[serde(skip_serializing_if = "Option::is_none")]
    binary: Option<BinaryValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ChildRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<PageDescriptor>,
    queryable: bool,
}

impl Document {
    pub fn new(id: impl Into<String>, primary_type: PrimaryType) -> Self {
        Self {
            id: id.into(),
            primary_type,
            mixin_types: Vec::new(),
            properties: Properties::new(),
            binary: None,
            parent: None,
            children: Vec::new(),
            page: None,
            queryable: true,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn with_binary(mut self, binary: impl Into<BinaryValue>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn set_primary_type(&mut self, primary_type: PrimaryType) {
        self.primary_type = primary_type;
    }

    pub fn set_binary(&mut self, binary: BinaryValue) {
        self.binary = Some(binary);
    }

    pub fn set_parent(&mut self, parent: impl Into<String>) {
        self.parent = Some(parent.into());
    }

    pub fn add_child(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.children.push(ChildRef {
            id: id.into(),
            name: name.into(),
        });
    }

    pub fn set_page(&mut self, page: PageDescriptor) {
        self.page = Some(page);
    }

    pub fn add_mixin(&mut self, mixin: impl Into<String>) {
        let mixin = mixin.into();
        if !self.mixin_types.contains(&mixin) {
            self.mixin_types.push(mixin);
        }
    }

    pub fn set_not_queryable(&mut self) {
        self.queryable = false;
    }

    /// Merge properties over the computed ones. Same-named properties are
    /// overwritten, including the primary type; mixins are appended.
    pub fn merge_properties(&mut self, properties: Properties) {
        for (name, value) in properties {
            match name.as_str() {
                JCR_PRIMARY_TYPE => {
                    if let Some(primary_type) = value.as_str() {
                        self.primary_type = PrimaryType::from(primary_type);
                    }
                }
                JCR_MIXIN_TYPES => match value {
                    PropertyValue::String(mixin) => self.add_mixin(mixin),
                    PropertyValue::Multiple(values) => {
                        for mixin in values {
                            if let PropertyValue::String(mixin) = mixin {
                                self.add_mixin(mixin);
                            }
                        }
                    }
                    _ => {}
                },
                _ => {
                    self.properties.insert(name, value);
                }
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn primary_type(&self) -> &PrimaryType {
        &self.primary_type
    }

    pub fn mixin_types(&self) -> &[String] {
        &self.mixin_types
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// The properties as a host would enumerate them: the stored ones plus
    /// the primary type and any mixins.
    pub fn all_properties(&self) -> Properties {
        let mut all = self.properties.clone();
        all.insert(
            JCR_PRIMARY_TYPE.to_string(),
            PropertyValue::String(self.primary_type.to_string()),
        );
        if !self.mixin_types.is_empty() {
            all.insert(
                JCR_MIXIN_TYPES.to_string(),
                PropertyValue::Multiple(
                    self.mixin_types
                        .iter()
                        .map(|m| PropertyValue::String(m.clone()))
                        .collect(),
                ),
            );
        }
        all
    }

    pub fn binary(&self) -> Option<&BinaryValue> {
        self.binary.as_ref()
    }

    pub fn take_binary(&mut self) -> Option<BinaryValue> {
        self.binary.take()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> &[ChildRef] {
        &self.children
    }

    pub fn page(&self) -> Option<&PageDescriptor> {
        self.page.as_ref()
    }

    pub fn is_queryable(&self) -> bool {
        self.queryable
    }
}
