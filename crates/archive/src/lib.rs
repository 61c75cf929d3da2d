//! Archive containers written over an arbitrary byte sink.
//!
//! - [`tar`] streams each input as a header followed by its body, in order
//! - [`zip`] writes local file headers as it goes and the central directory
//!   when the archive is finished; the sink must be seekable
//! - [`passthrough`] copies a single input verbatim, with no framing at all
//!
//! Every writer reads its inputs through [`Interruptible`], so a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) handed in by the
//! caller stops the copy at the next read.

mod entry;
pub mod error;
mod inputs;
mod interrupt;
pub mod passthrough;
pub mod tar;
pub mod zip;

pub use crate::inputs::Inputs;
pub use crate::interrupt::Interruptible;

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A supported archive container.
///
/// Defaults to [`None`](Self::None): a single input passed straight through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Archive {
    /// No container; exactly one input is copied as-is.
    #[default]
    None,
    /// POSIX tar (.tar)
    Tar,
    /// Zip (.zip)
    Zip,
}

impl Display for Archive {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl Archive {
    /// Look up the archive implied by a filename suffix token.
    #[must_use]
    pub fn from_extension(token: &str) -> Option<Self> {
        match token {
            "tar" => Some(Archive::Tar),
            "zip" => Some(Archive::Zip),
            _ => None,
        }
    }

    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Archive::None => "none",
            Archive::Tar => "tar",
            Archive::Zip => "zip",
        }
    }
}
