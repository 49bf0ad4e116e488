//! Persistence error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing the backing file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The file exists but could not be read.
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file (or its temp sibling) could not be written.
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not a list of well-formed book records.
    #[error("{} is not a valid library file", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory collection could not be encoded.
    #[error("failed to encode library")]
    Serialize(#[source] serde_json::Error),
}

impl StorageError {
    /// Returns `true` when the backing file holds data we refused to parse.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Convenience alias for storage results.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
