//! Prelude module for convenient imports.

pub use crate::config::BackendConfig;
pub use crate::error::{StorageError, StorageResult};
pub use crate::object::{MultipartUpload, Object, ObjectReader, read_body};
pub use crate::registry::BackendRegistry;
pub use crate::storage::ObjectStorage;
