//! # Message File Error Types

use thiserror::Error;

/// Errors that fail a whole message file load or save.
///
/// Individual malformed records are skipped, not reported here.
#[derive(Error, Debug)]
pub enum MessageFileError {
    /// The file could not be opened, read or written.
    #[error("message file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The input was non-empty but held no complete record.
    #[error("no complete message record in {len} bytes")]
    Unreadable {
        /// Size of the rejected input.
        len: usize,
    },
}

/// Result type for message file operations.
pub type MessageFileResult<T> = Result<T, MessageFileError>;
