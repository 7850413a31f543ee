//! Error types
//!
//! `StorageError` covers the item store and the on-disk format; `ApiError` is what the
//! data provider surfaces to its host.

use std::path::PathBuf;
use thiserror::Error;

/// Item store errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The serialization root does not exist
    #[error("Path not found {path} (base {base})")]
    RootNotFound { path: PathBuf, base: PathBuf },

    /// A file already occupies the target path of a new item
    #[error("Item file already exists: {0}")]
    AlreadyExists(PathBuf),

    /// An indexed item already has the id of a new item
    #[error("Item id already in use: {0}")]
    DuplicateId(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialized item text could not be decoded
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Item cannot be written in the serialized format
    #[error("Cannot encode item {id}: {message}")]
    Encode { id: String, message: String },

    /// Descendant walk exceeded the depth limit (usually a parent cycle)
    #[error("Item hierarchy below {key} exceeds depth {limit}")]
    HierarchyTooDeep { key: String, limit: usize },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        StorageError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Data provider errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// A referenced item (parent, template) is missing
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),

    /// A stored identifier is not a valid GUID
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    StorageError(#[from] StorageError),
}
