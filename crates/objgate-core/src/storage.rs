//! The uniform storage contract.

use std::fmt;

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::object::{MultipartUpload, Object, ObjectReader};

/// Uniform contract over object-storage backends.
///
/// The [`Display`](fmt::Display) form is a human-readable identifier such as
/// `qiniu://my-bucket`.
#[async_trait]
pub trait ObjectStorage: fmt::Display + Send + Sync {
    /// Opens `key` for reading starting at `offset`.
    ///
    /// At most `limit` bytes are returned; `limit <= 0` reads to the end of
    /// the object.
    async fn get(&self, key: &str, offset: u64, limit: i64) -> StorageResult<ObjectReader>;

    /// Stores the whole of `body` under `key`.
    async fn put(&self, key: &str, body: ObjectReader) -> StorageResult<()>;

    /// Copies `src` to `dst` inside the same bucket.
    async fn copy(&self, dst: &str, src: &str) -> StorageResult<()>;

    /// Succeeds when `key` exists; otherwise returns the backend's error.
    async fn exists(&self, key: &str) -> StorageResult<()>;

    /// Removes `key`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Returns at most `limit` objects under `prefix`, ordered by key.
    ///
    /// An empty `marker` starts from the beginning; otherwise the listing
    /// continues after the previous page.
    async fn list(&self, prefix: &str, marker: &str, limit: usize) -> StorageResult<Vec<Object>>;

    /// Starts a multipart upload.
    ///
    /// Backends without multipart support keep this default, which always
    /// fails with [`StorageError::Unsupported`].
    async fn create_multipart_upload(&self, _key: &str) -> StorageResult<MultipartUpload> {
        Err(StorageError::Unsupported("multipart upload"))
    }
}
