use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Compression {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl Compression {
    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Pgzip => "pgzip",
            Compression::Bgzf => "bgzf",
            Compression::Bzip2 => "bzip2",
            Compression::Lz4 => "lz4",
            Compression::Xz => "xz",
        }
    }

    /// Whether the encoder spreads work over more than one thread.
    #[inline]
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        matches!(self, Compression::Pgzip | Compression::Bgzf)
    }

    /// Number of threads the encoder actually uses for a given worker budget.
    #[inline]
    #[must_use]
    pub fn threads(&self, workers: usize) -> usize {
        if self.is_parallel() { workers } else { 1 }
    }
}
