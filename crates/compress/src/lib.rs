//! Streaming compressors behind a unified [`Compression`] enum.
//!
//! This crate wraps several compression libraries, providing:
//!
//! - **Extension lookup** for output filenames ([`Compression::from_extension`])
//! - **Level rules** per codec ([`level`]): clamping, defaults and rejection
//! - **Streaming** via [`Compression::encoder`], which wraps any writer in an
//!   [`Encoder`] that must be [finished](Encoder::finish) to flush trailing
//!   blocks and footers
//!
//! Parallel gzip (`pgzip`) and blocked gzip (`bgzf`) spread block compression
//! over a configurable number of worker threads; the remaining codecs are
//! single-threaded. Output ordering never depends on the worker count.

mod construct;
mod encoder;
pub mod error;
pub mod level;
mod util;

pub use crate::encoder::{Encoder, EncoderOptions, Parallel};

/// A supported compression format.
///
/// Defaults to [`None`](Self::None) (uncompressed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Uncompressed
    #[default]
    None,
    /// Parallel gzip (.gz)
    Pgzip,
    /// Blocked gzip, as used by bioinformatics tooling (.bgzf)
    Bgzf,
    /// Bzip2 compression (.bzip2)
    Bzip2,
    /// LZ4 frame compression (.lz4)
    Lz4,
    /// XZ/LZMA2 compression (.xz)
    Xz,
}
