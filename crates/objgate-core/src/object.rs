//! Object records and byte streams.

use std::io::Cursor;
use std::pin::Pin;

use bytes::Bytes;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};

/// A live, caller-owned readable stream.
///
/// Dropping the reader releases the underlying connection or buffer.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// A single entry returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// Object key. May contain `/` and may start with it.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: Timestamp,
    /// Creation time.
    ///
    /// Providers that only track one upload timestamp report the same value
    /// here and in [`modified`](Self::modified).
    pub created: Timestamp,
}

impl Object {
    /// Creates an object record whose modification and creation times are
    /// both `uploaded`.
    pub fn uploaded_at(key: impl Into<String>, size: u64, uploaded: Timestamp) -> Self {
        Self {
            key: key.into(),
            size,
            modified: uploaded,
            created: uploaded,
        }
    }
}

/// Handle for an in-progress multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartUpload {
    /// Provider-assigned upload identifier.
    pub upload_id: String,
    /// Smallest accepted part, in bytes.
    pub min_part_size: u64,
    /// Largest number of parts accepted.
    pub max_count: u32,
}

/// Buffers a source of unknown length so its exact size can be declared
/// up front.
pub async fn read_body(mut body: ObjectReader) -> std::io::Result<Bytes> {
    let mut buf = Vec::new();
    body.read_to_end(&mut buf).await?;
    Ok(Bytes::from(buf))
}

/// Wraps an in-memory buffer as an [`ObjectReader`].
pub fn reader_from_bytes(data: impl Into<Bytes>) -> ObjectReader {
    Box::pin(Cursor::new(data.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_body_drains_the_source() {
        let reader = reader_from_bytes("hello world");
        let data = read_body(reader).await.unwrap();
        assert_eq!(data, Bytes::from("hello world"));
        assert_eq!(data.len(), 11);
    }

    #[tokio::test]
    async fn read_body_of_empty_source() {
        let data = read_body(reader_from_bytes(Bytes::new())).await.unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn uploaded_at_sets_both_timestamps() {
        let ts = Timestamp::from_second(1_700_000_000).unwrap();
        let object = Object::uploaded_at("a/b.txt", 3, ts);
        assert_eq!(object.modified, object.created);
        assert_eq!(object.size, 3);
    }
}
