//! Archive Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Every per-file failure carries the offending path.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// There was nothing to archive.
    #[display("no input files")]
    NoInputs,
    /// Passthrough mode was asked to copy anything other than one file.
    #[display("can only have 1 input file when not using tar/zip, found {_0}")]
    WrongInputCount(#[error(not(source))] usize),
    /// An input could not be opened or inspected.
    #[display("unable to read file {}", _0.display())]
    Open(#[error(not(source))] PathBuf),
    /// The entry header for an input could not be built or written.
    #[display("failed to write archive header for {}", _0.display())]
    Header(#[error(not(source))] PathBuf),
    /// Streaming an input's body into the archive failed.
    #[display("failed to copy {} data to archive", _0.display())]
    Copy(#[error(not(source))] PathBuf),
    /// Writing the archive trailer (or central directory) failed.
    #[display("failed to finalize archive")]
    Finish,
    /// The caller cancelled the operation.
    #[display("cancelled")]
    Cancelled,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Open(_) | Self::Copy(_) | Self::Finish | Self::Cancelled)
    }
}
