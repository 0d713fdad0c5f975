//! Signed-URL downloads through a bucket's download domain.
//!
//! The S3-compatible API normalises away a leading `/` in keys, so objects
//! whose keys start with one are fetched over plain HTTP from the bucket's
//! bound domain using a time-limited private URL instead.

use std::fmt;
use std::io;
use std::time::Duration;

use futures::TryStreamExt;
use jiff::Timestamp;
use objgate_core::{ObjectReader, StorageError, StorageResult};
use reqwest::header::{DATE, RANGE};
use reqwest::{Client, StatusCode};
use tokio_util::io::StreamReader;

use crate::TRACING_TARGET;
use crate::auth::{Credentials, DEFAULT_TOKEN_TTL};

/// Fetches objects through signed, time-limited download URLs.
#[derive(Clone)]
pub struct SignedUrlDownloader {
    http: Client,
    credentials: Credentials,
    domain: Option<String>,
    expiry: Duration,
}

impl SignedUrlDownloader {
    /// Creates a downloader for `domain`.
    ///
    /// A missing domain is accepted here and only reported when a download
    /// is attempted.
    pub fn new(http: Client, credentials: Credentials, domain: Option<String>) -> Self {
        Self {
            http,
            credentials,
            domain: domain.filter(|d| !d.is_empty()),
            expiry: DEFAULT_TOKEN_TTL,
        }
    }

    /// Sets the lifetime of generated URLs.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Returns the configured download domain.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Builds the signed URL for `key`.
    pub fn signed_url(&self, key: &str) -> StorageResult<String> {
        let domain = self.domain.as_deref().ok_or_else(|| {
            StorageError::config(
                "a download domain is required to read keys starting with '/'",
            )
        })?;

        Ok(self.credentials.private_url(&base_url(domain, key), self.expiry))
    }

    /// Starts a download of `key`, optionally restricted to a byte range.
    ///
    /// Succeeds only on `200 OK` or `206 Partial Content`; the returned
    /// reader streams the response body.
    pub async fn download(&self, key: &str, offset: u64, limit: i64) -> StorageResult<ObjectReader> {
        let url = self.signed_url(key)?;
        let date = Timestamp::now()
            .strftime("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();

        let mut request = self.http.get(&url).header(DATE, date);
        if let Some(range) = range_header(offset, limit) {
            request = request.header(RANGE, range);
        }

        let response = request.send().await.map_err(StorageError::backend)?;
        let status = response.status();

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            offset,
            limit,
            status = status.as_u16(),
            "Signed-URL download"
        );

        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            return Err(StorageError::Status(status.as_u16()));
        }

        let stream = response.bytes_stream().map_err(io::Error::other);
        Ok(Box::pin(StreamReader::new(stream)))
    }
}

impl fmt::Debug for SignedUrlDownloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedUrlDownloader")
            .field("domain", &self.domain)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

/// Value of the `Range` header for a read of `limit` bytes at `offset`.
///
/// `None` when the whole object is requested; an open-ended range when
/// `limit` is not positive or the range would end past `u64::MAX`.
pub fn range_header(offset: u64, limit: i64) -> Option<String> {
    if limit > 0 {
        match offset.checked_add(limit as u64 - 1) {
            Some(last) => Some(format!("bytes={offset}-{last}")),
            None => Some(format!("bytes={offset}-")),
        }
    } else if offset > 0 {
        Some(format!("bytes={offset}-"))
    } else {
        None
    }
}

/// Unsigned download URL of `key` under `domain`.
fn base_url(domain: &str, key: &str) -> String {
    let path = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    if domain.starts_with("http://") || domain.starts_with("https://") {
        format!("{}/{path}", domain.trim_end_matches('/'))
    } else {
        format!("http://{domain}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode as AxumStatus, Uri};
    use axum::response::{IntoResponse, Response};
    use objgate_core::read_body;

    use super::*;

    const CONTENT: &[u8] = b"0123456789";

    fn credentials() -> Credentials {
        Credentials::new("test-ak", "test-sk")
    }

    async fn serve(headers: HeaderMap, uri: Uri) -> Response {
        if !headers.contains_key(DATE) {
            return AxumStatus::BAD_REQUEST.into_response();
        }

        let query = uri.query().unwrap_or_default();
        if !query.starts_with("e=") || !query.contains("&token=test-ak:") {
            return AxumStatus::FORBIDDEN.into_response();
        }

        if uri.path() != "//dir/file%20name.txt" {
            return AxumStatus::NOT_FOUND.into_response();
        }

        let Some(range) = headers.get(RANGE).and_then(|v| v.to_str().ok()) else {
            return (AxumStatus::OK, CONTENT.to_vec()).into_response();
        };

        let (start, end) = range
            .strip_prefix("bytes=")
            .and_then(|r| r.split_once('-'))
            .unwrap();
        let start: usize = start.parse().unwrap();
        let end: usize = if end.is_empty() {
            CONTENT.len() - 1
        } else {
            end.parse::<usize>().unwrap().min(CONTENT.len() - 1)
        };

        (AxumStatus::PARTIAL_CONTENT, CONTENT[start..=end].to_vec()).into_response()
    }

    async fn downloader() -> SignedUrlDownloader {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(serve);
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        SignedUrlDownloader::new(Client::new(), credentials(), Some(addr.to_string()))
    }

    #[test]
    fn range_header_values() {
        assert_eq!(range_header(0, 0), None);
        assert_eq!(range_header(0, -1), None);
        assert_eq!(range_header(0, 10).as_deref(), Some("bytes=0-9"));
        assert_eq!(range_header(5, 0).as_deref(), Some("bytes=5-"));
        assert_eq!(range_header(5, 3).as_deref(), Some("bytes=5-7"));
        assert_eq!(range_header(5, -1).as_deref(), Some("bytes=5-"));
    }

    #[test]
    fn range_header_near_u64_max() {
        let max = u64::MAX;
        assert_eq!(range_header(max, 1), Some(format!("bytes={max}-{max}")));
        assert_eq!(range_header(max, 2), Some(format!("bytes={max}-")));
        assert_eq!(range_header(max - 1, i64::MAX), Some(format!("bytes={}-", max - 1)));
    }

    #[test]
    fn base_url_encodes_segments() {
        assert_eq!(
            base_url("cdn.example.com", "/dir/file name.txt"),
            "http://cdn.example.com//dir/file%20name.txt"
        );
        assert_eq!(
            base_url("https://cdn.example.com/", "/a"),
            "https://cdn.example.com//a"
        );
    }

    #[tokio::test]
    async fn missing_domain_is_config_error() {
        let downloader = SignedUrlDownloader::new(Client::new(), credentials(), Some(String::new()));
        assert_eq!(downloader.domain(), None);

        let err = downloader.download("/a", 0, 0).await.err().unwrap();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn downloads_whole_and_ranged() {
        let downloader = downloader().await;

        let whole = downloader.download("/dir/file name.txt", 0, 0).await.unwrap();
        assert_eq!(read_body(whole).await.unwrap().as_ref(), CONTENT);

        let slice = downloader.download("/dir/file name.txt", 2, 3).await.unwrap();
        assert_eq!(read_body(slice).await.unwrap().as_ref(), b"234");

        let tail = downloader.download("/dir/file name.txt", 7, 0).await.unwrap();
        assert_eq!(read_body(tail).await.unwrap().as_ref(), b"789");
    }

    #[tokio::test]
    async fn unexpected_status_is_reported() {
        let downloader = downloader().await;
        let err = downloader.download("/missing", 0, 0).await.err().unwrap();
        assert!(matches!(err, StorageError::Status(404)));
    }

    #[test]
    fn debug_hides_credentials() {
        let downloader = SignedUrlDownloader::new(
            Client::new(),
            credentials(),
            Some("cdn.example.com".into()),
        );
        assert!(!format!("{downloader:?}").contains("test-sk"));
    }
}
