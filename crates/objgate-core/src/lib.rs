#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod object;
mod registry;
mod storage;

#[doc(hidden)]
pub mod prelude;

pub use config::BackendConfig;
pub use error::{BoxedError, StorageError, StorageResult};
pub use object::{MultipartUpload, Object, ObjectReader, read_body, reader_from_bytes};
pub use registry::{BackendFactory, BackendRegistry};
pub use storage::ObjectStorage;

/// Tracing target for storage contract operations.
pub const TRACING_TARGET: &str = "objgate_core";
