//! Reqwest-based client for the Kodo REST protocol.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;

use super::{EntryInfo, KodoBucket, ListItem, ListPage};
use crate::TRACING_TARGET;
use crate::auth::{Credentials, DEFAULT_TOKEN_TTL};
use crate::error::{BucketError, BucketResult, STATUS_NO_SUCH_ENTRY};
use crate::zone::{Zone, ZoneHosts};

/// Inner client that holds the HTTP client and bucket settings.
struct KodoClientInner {
    http: Client,
    bucket: String,
    credentials: Credentials,
    hosts: ZoneHosts,
    upload_ttl: Duration,
}

/// Kodo REST client bound to a single bucket.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct KodoClient {
    inner: Arc<KodoClientInner>,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    marker: String,
    #[serde(default)]
    items: Vec<ListItem>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl KodoClient {
    /// Creates a client for `bucket` using the default hosts of `zone`.
    pub fn new(
        http: Client,
        bucket: impl Into<String>,
        credentials: Credentials,
        zone: Zone,
    ) -> Self {
        Self::with_hosts(http, bucket, credentials, zone.hosts())
    }

    /// Creates a client for `bucket` talking to explicit service hosts.
    pub fn with_hosts(
        http: Client,
        bucket: impl Into<String>,
        credentials: Credentials,
        hosts: ZoneHosts,
    ) -> Self {
        let inner = KodoClientInner {
            http,
            bucket: bucket.into(),
            credentials,
            hosts,
            upload_ttl: DEFAULT_TOKEN_TTL,
        };

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %inner.bucket,
            rs = %inner.hosts.rs,
            up = %inner.hosts.up,
            "Kodo client created"
        );

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the service hosts.
    pub fn hosts(&self) -> &ZoneHosts {
        &self.inner.hosts
    }

    /// Encodes `key` as a Kodo entry: `b64("<bucket>:<key>")`.
    fn entry(&self, key: &str) -> String {
        URL_SAFE.encode(format!("{}:{key}", self.inner.bucket))
    }

    /// Sends a signed management request and checks its status.
    async fn manage(&self, host: &str, path_and_query: &str, key: &str) -> BucketResult<Response> {
        let token = self.inner.credentials.management_token(path_and_query);
        let response = self
            .inner
            .http
            .post(format!("{host}{path_and_query}"))
            .header(AUTHORIZATION, token)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .send()
            .await?;

        check_status(response, key).await
    }
}

/// Maps non-success responses onto [`BucketError`].
async fn check_status(response: Response, key: &str) -> BucketResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == STATUS_NO_SUCH_ENTRY {
        return Err(BucketError::NotFound(key.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) => body,
    };

    tracing::warn!(
        target: TRACING_TARGET,
        key = %key,
        status = status.as_u16(),
        message = %message,
        "Kodo request failed"
    );

    Err(BucketError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl KodoBucket for KodoClient {
    async fn stat(&self, key: &str) -> BucketResult<EntryInfo> {
        let path = format!("/stat/{}", self.entry(key));
        let response = self.manage(&self.inner.hosts.rs, &path, key).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn put(&self, key: &str, data: Bytes) -> BucketResult<()> {
        let inner = &self.inner;
        let token = inner
            .credentials
            .upload_token(&inner.bucket, key, inner.upload_ttl);
        let length = data.len() as u64;

        let file = Part::stream_with_length(data, length).file_name(key.to_string());
        let form = Form::new()
            .text("token", token)
            .text("key", key.to_string())
            .part("file", file);

        tracing::debug!(
            target: TRACING_TARGET,
            key = %key,
            size = length,
            "Uploading object"
        );

        let response = inner
            .http
            .post(format!("{}/", inner.hosts.up))
            .multipart(form)
            .send()
            .await?;
        check_status(response, key).await?;
        Ok(())
    }

    async fn copy(&self, src: &str, dst: &str) -> BucketResult<()> {
        let path = format!("/copy/{}/{}", self.entry(src), self.entry(dst));
        self.manage(&self.inner.hosts.rs, &path, src).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> BucketResult<()> {
        let path = format!("/delete/{}", self.entry(key));
        self.manage(&self.inner.hosts.rs, &path, key).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str, marker: &str, limit: usize) -> BucketResult<ListPage> {
        // The serializer is not `Send` and must be dropped before the request.
        let query = {
            let mut query = url::form_urlencoded::Serializer::new(String::new());
            query.append_pair("bucket", &self.inner.bucket);
            if !prefix.is_empty() {
                query.append_pair("prefix", prefix);
            }
            if !marker.is_empty() {
                query.append_pair("marker", marker);
            }
            if limit > 0 {
                query.append_pair("limit", &limit.to_string());
            }
            query.finish()
        };

        let path = format!("/list?{query}");
        let response = self.manage(&self.inner.hosts.rsf, &path, prefix).await?;
        let body = response.bytes().await?;
        let page: ListResponse = serde_json::from_slice(&body)?;

        tracing::debug!(
            target: TRACING_TARGET,
            prefix = %prefix,
            count = page.items.len(),
            has_more = !page.marker.is_empty(),
            "Listed page"
        );

        if page.marker.is_empty() {
            return Err(BucketError::EndOfListing { items: page.items });
        }

        Ok(ListPage {
            items: page.items,
            marker: page.marker,
        })
    }
}

impl fmt::Debug for KodoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KodoClient")
            .field("bucket", &self.inner.bucket)
            .field("credentials", &self.inner.credentials)
            .field("hosts", &self.inner.hosts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{Json, Router};
    use axum::extract::{Multipart, Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use serde_json::json;

    use super::*;

    const BUCKET: &str = "photos";

    fn decode_entry(entry: &str) -> String {
        String::from_utf8(URL_SAFE.decode(entry).unwrap()).unwrap()
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("QBox test-ak:"))
    }

    async fn stat(headers: HeaderMap, Path(entry): Path<String>) -> impl IntoResponse {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad token"})));
        }
        match decode_entry(&entry).as_str() {
            "photos:a.jpg" => (
                StatusCode::OK,
                Json(json!({"fsize": 3, "hash": "h", "mimeType": "image/jpeg", "putTime": 16000000000000000_i64})),
            ),
            "photos:locked" => (
                StatusCode::FORBIDDEN,
                Json(json!({"error": "permission denied"})),
            ),
            _ => (
                StatusCode::from_u16(STATUS_NO_SUCH_ENTRY).unwrap(),
                Json(json!({"error": "no such file or directory"})),
            ),
        }
    }

    async fn list(Query(query): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
        assert_eq!(query.get("bucket").map(String::as_str), Some(BUCKET));
        let item = |key: &str| json!({"key": key, "fsize": 1, "putTime": 10000000_i64});
        match query.get("marker").map(String::as_str) {
            None => Json(json!({"marker": "page2", "items": [item("a"), item("b")]})),
            Some("page2") => Json(json!({"items": [item("c")]})),
            Some(_) => Json(json!({"items": []})),
        }
    }

    async fn copy(Path((src, dst)): Path<(String, String)>) -> StatusCode {
        assert_eq!(decode_entry(&src), "photos:a.jpg");
        assert_eq!(decode_entry(&dst), "photos:b.jpg");
        StatusCode::OK
    }

    async fn delete(Path(entry): Path<String>) -> StatusCode {
        assert_eq!(decode_entry(&entry), "photos:a.jpg");
        StatusCode::OK
    }

    async fn upload(mut multipart: Multipart) -> impl IntoResponse {
        let mut fields = HashMap::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap().to_string();
            let value = field.bytes().await.unwrap();
            fields.insert(name, value);
        }

        let ok = fields.get("key").is_some_and(|k| k.as_ref() == b"dir/new.txt")
            && fields.get("file").is_some_and(|f| f.as_ref() == b"payload")
            && fields.get("token").is_some_and(|t| t.starts_with(b"test-ak:"));

        if ok {
            (StatusCode::OK, Json(json!({"key": "dir/new.txt"})))
        } else {
            (StatusCode::BAD_REQUEST, Json(json!({"error": "bad form"})))
        }
    }

    async fn client() -> KodoClient {
        let app = Router::new()
            .route("/stat/{entry}", post(stat))
            .route("/list", post(list))
            .route("/copy/{src}/{dst}", post(copy))
            .route("/delete/{entry}", post(delete))
            .route("/", post(upload));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        KodoClient::with_hosts(
            Client::new(),
            BUCKET,
            Credentials::new("test-ak", "test-sk"),
            ZoneHosts::single(format!("http://{addr}")),
        )
    }

    #[test]
    fn entry_encoding() {
        let client = KodoClient::new(
            Client::new(),
            BUCKET,
            Credentials::new("test-ak", "test-sk"),
            Zone::East,
        );
        assert_eq!(decode_entry(&client.entry("/a/b")), "photos:/a/b");
        assert_eq!(client.hosts().rs, "https://rs.qiniu.com");
    }

    #[tokio::test]
    async fn stat_existing_and_missing() {
        let client = client().await;

        let info = client.stat("a.jpg").await.unwrap();
        assert_eq!(info.fsize, 3);
        assert_eq!(info.mime_type, "image/jpeg");

        let err = client.stat("missing").await.unwrap_err();
        assert!(matches!(err, BucketError::NotFound(key) if key == "missing"));
    }

    #[tokio::test]
    async fn api_error_carries_message() {
        let client = client().await;
        let err = client.stat("locked").await.unwrap_err();
        match err {
            BucketError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "permission denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_reports_end_of_listing_with_items() {
        let client = client().await;

        let page = client.list("", "", 2).await.unwrap();
        assert_eq!(page.marker, "page2");
        assert_eq!(page.items.len(), 2);

        match client.list("", "page2", 2).await.unwrap_err() {
            BucketError::EndOfListing { items } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].key, "c");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn list_runs_on_spawned_task() {
        let client = client().await;
        let handle = tokio::spawn(async move { client.list("dir/", "page2", 10).await });

        match handle.await.unwrap().unwrap_err() {
            BucketError::EndOfListing { items } => assert_eq!(items.len(), 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn copy_delete_and_put() {
        let client = client().await;
        client.copy("a.jpg", "b.jpg").await.unwrap();
        client.delete("a.jpg").await.unwrap();
        client
            .put("dir/new.txt", Bytes::from_static(b"payload"))
            .await
            .unwrap();
    }

    #[test]
    fn debug_hides_secret() {
        let client = KodoClient::new(
            Client::new(),
            BUCKET,
            Credentials::new("test-ak", "test-sk"),
            Zone::East,
        );
        assert!(!format!("{client:?}").contains("test-sk"));
    }
}
