//! Fatal batch errors
//!
//! Only configuration and sink problems stop a batch; per-file failures are
//! reported through `FileOutcome` instead.

use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum BatchError {
    /// A configured source directory does not exist or is not a directory
    MissingDirectory(PathBuf),
    /// Listing a directory or reading a configuration file failed
    Io { path: PathBuf, source: io::Error },
    /// The configuration is malformed or incomplete
    Config(String),
    /// The result sink rejected a record
    Sink(io::Error),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::MissingDirectory(path) => write!(f, "Source directory not found: {}", path.display()),
            BatchError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            BatchError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            BatchError::Sink(e) => write!(f, "Failed to write result: {}", e),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Io { source, .. } => Some(source),
            BatchError::Sink(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;
