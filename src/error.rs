/*!
 * Error types for dossplit
 */

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SplitError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Error, Debug)]
pub enum SplitError {
    /// Input DOSCAR missing or unreadable
    #[error("Input file not found or unreadable: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// Preamble too short, or the row-count token is missing (`line` is 1-based)
    #[error("Malformed header at line {line}: {reason}")]
    MalformedHeader { line: usize, reason: String },

    /// Row-count token is not a positive integer
    #[error("Invalid row count '{token}': expected a positive integer")]
    InvalidRowCount { token: String },

    /// Input ended inside a block
    #[error("Incomplete block {index}: expected {expected} lines, found {found}")]
    IncompleteBlock {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SplitError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SplitError::MissingInputFile(_)
            | SplitError::MalformedHeader { .. }
            | SplitError::InvalidRowCount { .. }
            | SplitError::Config(_) => EXIT_FATAL,
            SplitError::IncompleteBlock { .. } | SplitError::Io(_) => EXIT_PARTIAL,
        }
    }

    /// Errors raised before any output file could have been written
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            SplitError::MissingInputFile(_)
                | SplitError::MalformedHeader { .. }
                | SplitError::InvalidRowCount { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            SplitError::MissingInputFile(_)
            | SplitError::MalformedHeader { .. }
            | SplitError::InvalidRowCount { .. } => ErrorCategory::Validation,
            SplitError::IncompleteBlock { .. } => ErrorCategory::Integrity,
            SplitError::Io(_) => ErrorCategory::IoError,
            SplitError::Config(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input layout errors
    Validation,
    /// I/O operation errors
    IoError,
    /// Configuration errors
    Configuration,
    /// Truncated data
    Integrity,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::IoError => write!(f, "io"),
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Integrity => write!(f, "integrity"),
        }
    }
}

impl From<toml::de::Error> for SplitError {
    fn from(err: toml::de::Error) -> Self {
        SplitError::Config(format!("TOML parse error: {}", err))
    }
}
