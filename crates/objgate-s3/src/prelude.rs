//! Prelude module for convenient imports.

pub use crate::config::S3Config;
pub use crate::storage::S3Storage;
