use jiff::Timestamp;
use objgate_core::Object;
use serde::{Deserialize, Serialize};

/// Upload timestamps are expressed in 100-nanosecond units.
pub const PUT_TIME_UNITS_PER_SECOND: i64 = 10_000_000;

/// Metadata returned by `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    /// Size in bytes.
    pub fsize: u64,
    /// Content hash.
    #[serde(default)]
    pub hash: String,
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// Upload time in 100ns units since the Unix epoch.
    pub put_time: i64,
}

/// One entry of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    pub fsize: u64,
    /// Upload time in 100ns units since the Unix epoch.
    pub put_time: i64,
    /// Content hash.
    #[serde(default)]
    pub hash: String,
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
}

impl ListItem {
    /// Upload time truncated to whole seconds.
    pub fn uploaded(&self) -> Timestamp {
        Timestamp::from_second(self.put_time / PUT_TIME_UNITS_PER_SECOND)
            .unwrap_or(Timestamp::UNIX_EPOCH)
    }

    /// Converts into an [`Object`].
    ///
    /// Kodo tracks a single upload timestamp, so it populates both the
    /// modification and creation time.
    pub fn into_object(self) -> Object {
        let uploaded = self.uploaded();
        Object::uploaded_at(self.key, self.fsize, uploaded)
    }
}

/// A page of listing results plus the token for the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Entries, ordered by key.
    pub items: Vec<ListItem>,
    /// Continuation token; empty when there are no further pages.
    pub marker: String,
}
