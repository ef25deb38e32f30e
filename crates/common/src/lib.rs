/**
 * Static connector configuration, loaded
 *  once at startup from TOML.
 */
pub mod config;
/**
 * The connector itself: id translation,
 *  document materialization, paging
 *  and the write path.
 */
pub mod connector;
/**
 * Side stores for node properties the
 *  blob store cannot represent.
 */
pub mod extra;
/**
 * Content type detection for payloads.
 */
pub mod mime_detector;

pub mod prelude {
    pub use crate::config::{ConnectorConfig, ExtraPropertiesConfig};
    pub use crate::connector::{
        BinaryValue, Connector, ConnectorError, ConnectorOptions, Document, LazyBinary,
        PageDescriptor, PageKey, PrimaryType, Properties, PropertyValue,
    };
    pub use crate::extra::{ExtraPropertiesStore, MemoryExtraPropertiesStore};
    pub use crate::mime_detector::{GuessingMimeDetector, MimeDetector};
}
