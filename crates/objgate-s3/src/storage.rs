//! Baseline S3-compatible storage backed by an OpenDAL operator.

use std::fmt;
use std::io;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};
use jiff::Timestamp;
use objgate_core::{
    BackendConfig, Object, ObjectReader, ObjectStorage, StorageError, StorageResult, read_body,
};
use opendal::{EntryMode, Operator, services};
use tokio_util::io::StreamReader;

use crate::TRACING_TARGET;
use crate::config::S3Config;
use crate::error::{from_io, from_opendal};

/// Generic S3-compatible backend.
///
/// Keys are resolved relative to the bucket root. Keys starting with `/` are
/// normalised by the underlying client and therefore cannot be addressed
/// verbatim through this backend.
#[derive(Clone)]
pub struct S3Storage {
    bucket: String,
    operator: Operator,
}

impl S3Storage {
    /// Creates a new S3 backend from configuration.
    pub fn new(config: S3Config) -> StorageResult<Self> {
        let mut builder = services::S3::default()
            .bucket(&config.bucket)
            .region(&config.region)
            .disable_config_load();

        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        if let Some(ref access_key_id) = config.access_key_id {
            builder = builder.access_key_id(access_key_id);
        }

        if let Some(ref secret_access_key) = config.secret_access_key {
            builder = builder.secret_access_key(secret_access_key);
        }

        if config.virtual_host_style {
            builder = builder.enable_virtual_host_style();
        }

        let operator = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(StorageError::backend)?;

        tracing::info!(
            target: TRACING_TARGET,
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint,
            "S3 backend initialized"
        );

        Ok(Self::from_operator(config.bucket, operator))
    }

    /// Wraps an already-built operator.
    pub fn from_operator(bucket: impl Into<String>, operator: Operator) -> Self {
        Self {
            bucket: bucket.into(),
            operator,
        }
    }

    /// Directory to list so that every key starting with `prefix` is visited.
    fn list_root(prefix: &str) -> &str {
        match prefix.rfind('/') {
            Some(idx) => &prefix[..=idx],
            None => "",
        }
    }
}

/// Byte range covering `limit` bytes from `offset`; open-ended when `limit`
/// is not positive or the end would overflow.
fn byte_range(offset: u64, limit: i64) -> (Bound<u64>, Bound<u64>) {
    let end = if limit > 0 {
        offset
            .checked_add(limit as u64)
            .map_or(Bound::Unbounded, Bound::Excluded)
    } else {
        Bound::Unbounded
    };
    (Bound::Included(offset), end)
}

/// Registry constructor for the `s3` scheme.
pub fn create(config: &BackendConfig) -> StorageResult<Arc<dyn ObjectStorage>> {
    let config = S3Config::from_backend_config(config)?;
    Ok(Arc::new(S3Storage::new(config)?))
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn get(&self, key: &str, offset: u64, limit: i64) -> StorageResult<ObjectReader> {
        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            offset,
            limit,
            "Reading object"
        );

        let reader = self
            .operator
            .reader_with(key)
            .await
            .map_err(|e| from_opendal(key, e))?;
        let mut chunks = Box::pin(
            reader
                .into_bytes_stream(byte_range(offset, limit))
                .await
                .map_err(|e| from_opendal(key, e))?,
        );

        // The first chunk is pulled eagerly so a missing key fails here
        // rather than on the caller's first read.
        let first = chunks.try_next().await.map_err(|e| from_io(key, e))?;
        let body = stream::iter(first.map(Ok::<_, io::Error>)).chain(chunks);

        Ok(Box::pin(StreamReader::new(body)))
    }

    async fn put(&self, key: &str, body: ObjectReader) -> StorageResult<()> {
        let data = read_body(body).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = data.len(),
            "Writing object"
        );

        self.operator
            .write(key, data)
            .await
            .map_err(|e| from_opendal(key, e))?;

        Ok(())
    }

    async fn copy(&self, dst: &str, src: &str) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            src = %src,
            dst = %dst,
            "Copying object"
        );

        self.operator
            .copy(src, dst)
            .await
            .map_err(|e| from_opendal(src, e))
    }

    async fn exists(&self, key: &str) -> StorageResult<()> {
        self.operator
            .stat(key)
            .await
            .map(|_| ())
            .map_err(|e| from_opendal(key, e))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            "Deleting object"
        );

        self.operator
            .delete(key)
            .await
            .map_err(|e| from_opendal(key, e))
    }

    async fn list(&self, prefix: &str, marker: &str, limit: usize) -> StorageResult<Vec<Object>> {
        let root = Self::list_root(prefix);
        let entries = self
            .operator
            .list_with(root)
            .recursive(true)
            .await
            .map_err(|e| from_opendal(prefix, e))?;

        let mut objects: Vec<Object> = entries
            .into_iter()
            .filter(|entry| entry.metadata().mode() == EntryMode::FILE)
            .filter(|entry| entry.path().starts_with(prefix) && entry.path() > marker)
            .map(|entry| {
                let meta = entry.metadata();
                let modified = meta
                    .last_modified()
                    .and_then(|dt| Timestamp::from_second(dt.timestamp()).ok())
                    .unwrap_or(Timestamp::UNIX_EPOCH);
                Object::uploaded_at(entry.path(), meta.content_length(), modified)
            })
            .collect();

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        objects.truncate(limit);

        tracing::debug!(
            target: TRACING_TARGET,
            prefix = %prefix,
            marker = %marker,
            count = objects.len(),
            "Listed objects"
        );

        Ok(objects)
    }
}

impl fmt::Display for S3Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}", self.bucket)
    }
}

impl fmt::Debug for S3Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Storage")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}
