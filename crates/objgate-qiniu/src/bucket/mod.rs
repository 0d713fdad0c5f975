//! The Kodo bucket protocol: stat, upload, copy, delete and listing.

mod client;
mod types;

use async_trait::async_trait;
use bytes::Bytes;
pub use client::KodoClient;
pub use types::{EntryInfo, ListItem, ListPage, PUT_TIME_UNITS_PER_SECOND};

use crate::error::BucketResult;

/// Operations of the proprietary Kodo protocol for one bucket.
///
/// [`KodoClient`] talks to the real service; the adapter only depends on this
/// trait so other transports can be substituted.
#[async_trait]
pub trait KodoBucket: Send + Sync {
    /// Fetches metadata for `key`.
    async fn stat(&self, key: &str) -> BucketResult<EntryInfo>;

    /// Uploads `data` under `key` in a single request with a declared length.
    async fn put(&self, key: &str, data: Bytes) -> BucketResult<()>;

    /// Server-side copy of `src` to `dst`.
    async fn copy(&self, src: &str, dst: &str) -> BucketResult<()>;

    /// Removes `key`.
    async fn delete(&self, key: &str) -> BucketResult<()>;

    /// Fetches one page of at most `limit` entries under `prefix`, starting
    /// at the continuation token `marker` (empty for the first page).
    ///
    /// The last page is reported as [`BucketError::EndOfListing`](crate::BucketError::EndOfListing).
    async fn list(&self, prefix: &str, marker: &str, limit: usize) -> BucketResult<ListPage>;
}
