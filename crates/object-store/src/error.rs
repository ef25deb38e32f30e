//! Error types for the blob gateway.

/// Errors that can occur when talking to the backing blob store.
#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    /// Network/timeout class failure. Never retried here; callers
    /// apply their own retry policy.
    #[error("transient store error on {container}/{key}: {source}")]
    Transient {
        container: String,
        key: String,
        #[source]
        source: object_store::Error,
    },

    /// Authentication, permission or provider configuration failure
    #[error("store unavailable for container '{container}': {reason}")]
    Unavailable { container: String, reason: String },

    /// The key does not resolve to an object
    #[error("blob not found: {container}/{key}")]
    NotFound { container: String, key: String },

    /// S3 bucket not found - must be created before use
    #[error("container '{0}' does not exist. Create it before starting the connector.")]
    ContainerNotFound(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlobStoreError {
    /// Classify a raw `object_store` error raised while operating on `key`.
    pub(crate) fn classify(container: &str, key: &str, err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { .. } => Self::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            },
            object_store::Error::PermissionDenied { .. }
            | object_store::Error::Unauthenticated { .. }
            | object_store::Error::UnknownConfigurationKey { .. } => Self::Unavailable {
                container: container.to_string(),
                reason: err.to_string(),
            },
            source => Self::Transient {
                container: container.to_string(),
                key: key.to_string(),
                source,
            },
        }
    }

    /// Whether the caller may reasonably retry the operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Io(_))
    }

    /// Whether the store rejected us outright (credentials, missing container).
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Unavailable { .. } | Self::ContainerNotFound(_) | Self::InvalidConfig(_)
        )
    }
}

/// Result type alias for blob store operations.
pub type Result<T> = std::result::Result<T, BlobStoreError>;
