//! Kodo protocol errors.

use objgate_core::StorageError;

use crate::bucket::ListItem;

/// Result type for Kodo bucket operations.
pub type BucketResult<T> = Result<T, BucketError>;

/// Kodo status code for "no such file or directory".
pub const STATUS_NO_SUCH_ENTRY: u16 = 612;

/// Errors returned by the Kodo REST protocol.
#[derive(Debug, thiserror::Error)]
pub enum BucketError {
    /// The listing has no further pages.
    ///
    /// The provider may raise this on the same call that returns the final
    /// page, so it carries whatever entries arrived with it.
    #[error("end of listing ({} entries returned)", .items.len())]
    EndOfListing {
        /// Entries delivered together with the signal.
        items: Vec<ListItem>,
    },

    /// The key does not exist.
    #[error("no such entry: {0}")]
    NotFound(String),

    /// The service answered with a non-success status.
    #[error("kodo request failed with status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<BucketError> for StorageError {
    fn from(err: BucketError) -> Self {
        match err {
            BucketError::NotFound(key) => StorageError::NotFound(key),
            other => StorageError::backend(other),
        }
    }
}
