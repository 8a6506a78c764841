//! Unified error handling for the jotter library
//!
//! All fallible operations in the library return [`Result`], built on a
//! single typed error enum. Caller mistakes (for example releasing a
//! visibility column twice) are treated as preconditions and panic
//! instead of producing an error value.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the jotter library
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JotterError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A note directory path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The visibility column pool is exhausted
    #[error("Too many open views")]
    TooManyViews,

    /// A save was requested before any note directory was established
    #[error("Note directory name not set")]
    DirectoryNotSet,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, JotterError>;
