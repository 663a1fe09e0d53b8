//! Error types for the botones-storage crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Directory creation or file write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, StorageError>;
