//! Compression Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use crate::Compression;
use derive_more::{Display, Error};

/// A compression error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for compression operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The compression level was rejected by the codec. Fix the configuration.
    #[display("invalid compression level {_0}; expected an integer from -1 to 9")]
    InvalidCompressionLevel(#[error(not(source))] i32),
    /// Failed to initialize an encoder for the requested compression format.
    #[display("error creating {_0} writer")]
    Encoder(#[error(not(source))] Compression),
    /// An I/O operation failed while encoding or flushing.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }
}
