//! Pipeline Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Failures from the codec and archive crates are raised
//! into these kinds, keeping the original error as a child.

use derive_more::{Display, Error};
use parcel_compress::Compression;
use std::path::PathBuf;

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// The first group is detected before any I/O happens and is never worth
/// retrying without changing the configuration.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Settings could not be loaded.
    #[display("invalid configuration")]
    Config,
    /// No output path was configured.
    #[display("no output path configured")]
    MissingOutput,
    /// The compression level is out of range for the chosen codec.
    #[display("invalid compression level {_0}; expected an integer from -1 to 9")]
    InvalidCompressionLevel(#[error(not(source))] i32),
    /// Passthrough mode needs exactly one input.
    #[display("can only have 1 input file when not using tar/zip, found {_0}")]
    WrongInputCount(#[error(not(source))] usize),
    /// The output directory or file could not be created.
    #[display("unable to create archive {}", _0.display())]
    Output(#[error(not(source))] PathBuf),
    /// The compressor could not be created or finished.
    #[display("{_0} compression failed")]
    Compression(#[error(not(source))] Compression),
    /// Writing the archive (or copying the single input) failed.
    #[display("error creating archive")]
    Archive,
    /// The caller cancelled the run.
    #[display("cancelled")]
    Cancelled,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Output(_) | Self::Compression(_) | Self::Archive | Self::Cancelled)
    }
}
