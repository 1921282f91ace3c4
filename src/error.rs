//! Switchfix error types.
//!
//! All errors are typed and provide root cause information.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for Switchfix operations.
#[derive(Error, Debug)]
pub enum SwitchfixError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A target file listed in the configuration does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Writing a patched document back to disk failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// The file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid byte span.
    #[error("Invalid span ({start}, {end}) in {file}")]
    InvalidSpan {
        /// The file containing the invalid span.
        file: PathBuf,
        /// Start byte offset.
        start: usize,
        /// End byte offset.
        end: usize,
    },

    /// A clause was about to be inserted into a region that already handles the sentinel.
    #[error("Switch region at bytes {start}..{end} already handles the sentinel variant")]
    RegionAlreadyComplete {
        /// Start byte offset of the region.
        start: usize,
        /// End byte offset of the region.
        end: usize,
    },

    /// Two insertions target the same offset.
    #[error("Overlapping insertions at byte {offset}")]
    OverlappingInsertions {
        /// The shared insertion offset.
        offset: usize,
    },

    /// Configuration file failed to parse or validate.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// The validation error message.
        message: String,
    },

    /// Backup creation or restore failed.
    #[error("Backup error: {message}")]
    Backup {
        /// Description of the failure.
        message: String,
    },

    /// UTF-8 validation error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl SwitchfixError {
    /// Stable identifier for the error kind, used in JSON payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SwitchfixError::Io { .. } => "Io",
            SwitchfixError::FileNotFound(_) => "FileNotFound",
            SwitchfixError::Write { .. } => "WriteFailure",
            SwitchfixError::InvalidSpan { .. } => "InvalidSpan",
            SwitchfixError::RegionAlreadyComplete { .. } => "RegionAlreadyComplete",
            SwitchfixError::OverlappingInsertions { .. } => "OverlappingInsertions",
            SwitchfixError::InvalidConfig { .. } => "InvalidConfig",
            SwitchfixError::Backup { .. } => "Backup",
            SwitchfixError::Utf8(_) => "Utf8",
            SwitchfixError::Other(_) => "Other",
        }
    }

    /// File associated with the error, when there is one.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            SwitchfixError::Io { path, .. } | SwitchfixError::Write { path, .. } => {
                Some(path.as_path())
            }
            SwitchfixError::FileNotFound(path) => Some(path.as_path()),
            SwitchfixError::InvalidSpan { file, .. } => Some(file.as_path()),
            _ => None,
        }
    }

    /// Attach a path to an error produced without one.
    pub(crate) fn with_path(self, path: &Path) -> Self {
        match self {
            SwitchfixError::Io { source, .. } => SwitchfixError::Io {
                path: path.to_path_buf(),
                source,
            },
            SwitchfixError::InvalidSpan { start, end, .. } => SwitchfixError::InvalidSpan {
                file: path.to_path_buf(),
                start,
                end,
            },
            other => other,
        }
    }
}

impl From<std::io::Error> for SwitchfixError {
    fn from(err: std::io::Error) -> Self {
        SwitchfixError::Io {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Result type alias for Switchfix operations.
pub type Result<T> = std::result::Result<T, SwitchfixError>;
