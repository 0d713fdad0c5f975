//! Storage error types.

/// Boxed error used to carry backend-specific failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum StorageError {
    /// The endpoint could not be resolved into bucket, region and zone.
    ///
    /// This is a construction-time failure; applications are expected to
    /// abort startup when they see it.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as supplied.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A per-call configuration requirement is missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// An HTTP response carried a status code outside the accepted set.
    #[error("unexpected status code: {0}")]
    Status(u16),

    /// Object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend does not implement the requested operation.
    #[error("{0} is not supported")]
    Unsupported(&'static str),

    /// No constructor is registered under the requested scheme.
    #[error("unknown storage backend: {0}")]
    UnknownBackend(String),

    /// Reading or writing a byte stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(#[source] BoxedError),
}

impl StorageError {
    /// Creates a new invalid endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new not found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound(key.into())
    }

    /// Wraps a backend-specific error.
    pub fn backend(err: impl Into<BoxedError>) -> Self {
        Self::Backend(err.into())
    }

    /// Returns whether this error indicates a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns whether this error indicates a configuration issue.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidEndpoint { .. } | Self::Config(_))
    }

    /// Returns whether this error is the unsupported-operation sentinel.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
