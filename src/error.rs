//! Centralized error types for bouncescan.
//!
//! The classification core never fails; these errors only come from
//! message sources that touch the filesystem. A bad configuration file
//! falls back to defaults instead.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bouncescan library.
#[derive(Error, Debug)]
pub enum BounceError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified message file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// The input could not be treated as a message at all (e.g. empty file).
    #[error("Not a message: {0}")]
    InvalidMessage(String),
}

/// Convenience alias for `Result<T, BounceError>`.
pub type Result<T> = std::result::Result<T, BounceError>;

impl BounceError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `BounceError::io`).
impl From<std::io::Error> for BounceError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
