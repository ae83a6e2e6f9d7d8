//! Error types for the upload directory.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when accessing the upload directory.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The client-supplied filename has no usable base name.
    #[error("invalid filename: {name:?}")]
    InvalidFilename { name: String },

    /// The requested path would resolve outside the upload directory.
    #[error("path escapes upload directory: {name:?}")]
    PathEscape { name: String },

    /// The requested file does not exist or is not a regular file.
    #[error("file not found: {name}")]
    NotFound { name: String },
}

impl StorageError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid filename error.
    pub fn invalid_filename(name: impl Into<String>) -> Self {
        Self::InvalidFilename { name: name.into() }
    }

    /// Create a path escape error.
    pub fn path_escape(name: impl Into<String>) -> Self {
        Self::PathEscape { name: name.into() }
    }

    /// Create a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
