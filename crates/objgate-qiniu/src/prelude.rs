//! Prelude module for convenient imports.

pub use crate::auth::Credentials;
pub use crate::bucket::{KodoBucket, KodoClient};
pub use crate::config::QiniuConfig;
pub use crate::cursor::ListCursor;
pub use crate::error::{BucketError, BucketResult};
pub use crate::storage::QiniuStorage;
pub use crate::zone::Zone;
