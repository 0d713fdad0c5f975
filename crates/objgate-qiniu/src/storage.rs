//! The Qiniu backend adapter.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use objgate_core::{
    BackendConfig, Object, ObjectReader, ObjectStorage, StorageError, StorageResult, read_body,
};
use objgate_s3::{S3Config, S3Storage};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::TRACING_TARGET;
use crate::auth::Credentials;
use crate::bucket::{KodoBucket, KodoClient, ListItem};
use crate::config::QiniuConfig;
use crate::cursor::ListCursor;
use crate::download::SignedUrlDownloader;
use crate::endpoint::Endpoint;
use crate::error::BucketError;

/// Qiniu Kodo backend.
///
/// Combines three clients for one bucket:
///
/// - an S3-compatible baseline client for plain reads;
/// - a [`SignedUrlDownloader`] for keys starting with `/`, which the
///   S3-compatible API cannot address;
/// - a [`KodoBucket`] for writes, copies, deletes, metadata and listing.
///
/// Multipart uploads are not supported.
pub struct QiniuStorage {
    bucket: String,
    baseline: Arc<dyn ObjectStorage>,
    kodo: Arc<dyn KodoBucket>,
    downloader: SignedUrlDownloader,
    cursor: Mutex<ListCursor>,
}

impl QiniuStorage {
    /// Creates a backend from configuration.
    ///
    /// Fails with [`StorageError::InvalidEndpoint`] when the bucket and
    /// region cannot be derived from the endpoint.
    pub fn new(config: QiniuConfig) -> StorageResult<Self> {
        let endpoint = Endpoint::parse(&config.endpoint)?;

        let s3 = S3Config::new(&endpoint.bucket, &endpoint.region)
            .with_endpoint(&endpoint.service_url)
            .with_credentials(&config.access_key, &config.secret_key)
            .with_virtual_host_style(false);
        let baseline = S3Storage::new(s3)?;

        let http = Client::builder().build().map_err(StorageError::backend)?;
        let credentials = Credentials::new(&config.access_key, &config.secret_key);
        let kodo = KodoClient::new(
            http.clone(),
            &endpoint.bucket,
            credentials.clone(),
            endpoint.zone,
        );
        let downloader = SignedUrlDownloader::new(http, credentials, config.domain.clone())
            .with_expiry(config.download_expiry);

        tracing::info!(
            target: TRACING_TARGET,
            bucket = %endpoint.bucket,
            region = %endpoint.region,
            zone = endpoint.zone.code(),
            has_domain = downloader.domain().is_some(),
            "Qiniu backend initialized"
        );

        Ok(Self::with_clients(
            endpoint.bucket,
            Arc::new(baseline),
            Arc::new(kodo),
            downloader,
        ))
    }

    /// Assembles a backend from already-built clients.
    pub fn with_clients(
        bucket: impl Into<String>,
        baseline: Arc<dyn ObjectStorage>,
        kodo: Arc<dyn KodoBucket>,
        downloader: SignedUrlDownloader,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            baseline,
            kodo,
            downloader,
            cursor: Mutex::new(ListCursor::default()),
        }
    }

    /// Fetches the next page of a traversal tracked by `cursor`.
    ///
    /// Returns an empty page without contacting the service once the cursor
    /// is exhausted; call [`ListCursor::reset`] to start over. The provider's
    /// end-of-stream signal is not an error: entries delivered with it are
    /// returned and the cursor becomes exhausted. On any other failure the
    /// cursor is left at the last successful page so it can be retried.
    ///
    /// Kodo may answer with an empty page that still carries a marker.
    /// Such pages are followed until entries arrive or the listing ends, so
    /// an empty result always means the traversal is exhausted.
    pub async fn list_page(
        &self,
        prefix: &str,
        cursor: &mut ListCursor,
        limit: usize,
    ) -> StorageResult<Vec<Object>> {
        loop {
            if cursor.is_exhausted() {
                return Ok(Vec::new());
            }

            let (items, next) = match self.kodo.list(prefix, cursor.token(), limit).await {
                Ok(page) => (page.items, page.marker),
                // TODO: confirm whether the provider can raise end-of-listing
                // before the final page; entries are kept and the traversal ends.
                Err(BucketError::EndOfListing { items }) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        prefix = %prefix,
                        count = items.len(),
                        "Reached end of listing"
                    );
                    (items, String::new())
                }
                Err(err) => return Err(err.into()),
            };

            cursor.advance(next);
            if !items.is_empty() {
                return Ok(items.into_iter().map(ListItem::into_object).collect());
            }

            tracing::debug!(
                target: TRACING_TARGET,
                prefix = %prefix,
                marker = %cursor.token(),
                "Skipping empty page"
            );
        }
    }
}

/// Registry constructor for the `qiniu` scheme.
pub fn create(config: &BackendConfig) -> StorageResult<Arc<dyn ObjectStorage>> {
    let config = QiniuConfig::from_backend_config(config);
    Ok(Arc::new(QiniuStorage::new(config)?))
}

#[async_trait]
impl ObjectStorage for QiniuStorage {
    async fn get(&self, key: &str, offset: u64, limit: i64) -> StorageResult<ObjectReader> {
        if key.starts_with('/') {
            self.downloader.download(key, offset, limit).await
        } else {
            self.baseline.get(key, offset, limit).await
        }
    }

    async fn put(&self, key: &str, body: ObjectReader) -> StorageResult<()> {
        let data = read_body(body).await?;
        self.kodo.put(key, data).await?;
        Ok(())
    }

    async fn copy(&self, dst: &str, src: &str) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            src = %src,
            dst = %dst,
            "Copying object"
        );

        self.kodo.copy(src, dst).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<()> {
        self.kodo.stat(key).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.exists(key).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            "Deleting object"
        );

        self.kodo.delete(key).await?;
        Ok(())
    }

    /// Lists through the adapter's own cursor.
    ///
    /// An empty `marker` starts a new traversal. Any non-empty `marker`
    /// continues the current one; its value is not interpreted. Once the
    /// traversal is exhausted, or if none was started, a non-empty `marker`
    /// yields an empty page without a request. The cursor is shared by every
    /// caller of this instance: use [`QiniuStorage::list_page`] for
    /// independent traversals.
    async fn list(&self, prefix: &str, marker: &str, limit: usize) -> StorageResult<Vec<Object>> {
        let mut cursor = self.cursor.lock().await;

        if marker.is_empty() {
            cursor.reset();
        } else if !cursor.is_active() {
            return Ok(Vec::new());
        }

        self.list_page(prefix, &mut cursor, limit).await
    }
}

impl fmt::Display for QiniuStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "qiniu://{}", self.bucket)
    }
}

impl fmt::Debug for QiniuStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QiniuStorage")
            .field("bucket", &self.bucket)
            .field("downloader", &self.downloader)
            .finish_non_exhaustive()
    }
}
