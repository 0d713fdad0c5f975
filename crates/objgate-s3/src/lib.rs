#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod storage;

#[doc(hidden)]
pub mod prelude;

pub use config::S3Config;
pub use storage::{S3Storage, create};

/// Tracing target for S3 storage operations.
pub const TRACING_TARGET: &str = "objgate_s3";
