//! Conversion of OpenDAL errors into the storage taxonomy.

use std::io;

use objgate_core::StorageError;
use opendal::ErrorKind;

/// Converts an [`opendal::Error`] raised while operating on `key`.
pub(crate) fn from_opendal(key: &str, err: opendal::Error) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::not_found(key),
        ErrorKind::Unsupported => StorageError::Unsupported("operation"),
        _ => StorageError::backend(err),
    }
}

/// Converts an I/O error raised while streaming `key`.
pub(crate) fn from_io(key: &str, err: io::Error) -> StorageError {
    match err.kind() {
        io::ErrorKind::NotFound => StorageError::not_found(key),
        _ => StorageError::Io(err),
    }
}
