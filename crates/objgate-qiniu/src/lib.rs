#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod auth;
mod bucket;
mod config;
mod cursor;
mod download;
mod endpoint;
mod error;
mod storage;
mod zone;

#[doc(hidden)]
pub mod prelude;

pub use auth::{Credentials, DEFAULT_TOKEN_TTL};
pub use bucket::{
    EntryInfo, KodoBucket, KodoClient, ListItem, ListPage, PUT_TIME_UNITS_PER_SECOND,
};
pub use config::QiniuConfig;
pub use cursor::ListCursor;
pub use download::{SignedUrlDownloader, range_header};
pub use endpoint::Endpoint;
pub use error::{BucketError, BucketResult, STATUS_NO_SUCH_ENTRY};
pub use storage::{QiniuStorage, create};
pub use zone::{Zone, ZoneHosts};

/// Tracing target for Qiniu storage operations.
pub const TRACING_TARGET: &str = "objgate_qiniu";
