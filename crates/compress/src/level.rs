//! Compression level rules.
//!
//! Levels are plain integers on the way in, following the gzip convention of
//! `-1..=9` where `-1` means "library default". Each codec interprets them
//! differently:
//!
//! | Format        | `<= 0`                  | `1..=9`  | `> 9`                         |
//! |---------------|-------------------------|----------|-------------------------------|
//! | pgzip, bgzf   | default (`< -1` errors) | verbatim | clamped to 9                  |
//! | bzip2         | 9                       | verbatim | rejected by the codec         |
//! | lz4           | library default         | verbatim | verbatim (codec saturates)    |
//! | xz            | ignored                 | ignored  | ignored                       |
//!
//! A level of `0` never means "store uncompressed": it can't be told apart
//! from an unset level, so it is promoted to the default.

use crate::Compression;
use crate::error::{ErrorKind, Result};
use bzip2::Compression as BzCompression;
use flate2::Compression as GzCompression;

/// Sentinel for "use the library default".
pub const DEFAULT: i32 = -1;
/// Highest level accepted by the gzip-style codecs.
pub const BEST: i32 = 9;
/// Preset used for every xz stream.
pub const XZ_PRESET: u32 = 6;

/// Normalise a user-supplied level before it reaches any codec.
///
/// Values above [`BEST`] are clamped, and both `0` and `-1` collapse to
/// [`DEFAULT`]. Anything else passes through untouched, including values
/// below `-1` (which the gzip-style codecs then reject).
#[must_use]
pub fn normalize(level: i32) -> i32 {
    match level {
        l if l > BEST => BEST,
        0 | DEFAULT => DEFAULT,
        l => l,
    }
}

/// Level for the gzip-style encoders (pgzip, bgzf).
pub fn gzip(level: i32) -> Result<GzCompression> {
    match level {
        0 | DEFAULT => Ok(GzCompression::default()),
        l @ 1..=BEST => Ok(GzCompression::new(l.unsigned_abs())),
        l if l > BEST => {
            tracing::debug!(requested = l, clamped = BEST, "clamping gzip compression level");
            Ok(GzCompression::best())
        },
        l => exn::bail!(ErrorKind::InvalidCompressionLevel(l)),
    }
}

/// Level for the bzip2 encoder.
///
/// There's no upper clamp here: libbz2 only knows block sizes `1..=9`, and
/// anything larger is rejected rather than silently reduced.
pub fn bzip2(level: i32) -> Result<BzCompression> {
    match level {
        l if l <= 0 => Ok(BzCompression::best()),
        l @ 1..=BEST => Ok(BzCompression::new(l.unsigned_abs())),
        l => exn::bail!(ErrorKind::InvalidCompressionLevel(l)),
    }
}

/// Level override for the lz4 encoder, if any.
#[must_use]
pub fn lz4(level: i32) -> Option<u32> {
    u32::try_from(level).ok().filter(|l| *l > 0)
}

impl Compression {
    /// Check that `level` would be accepted by this format's encoder,
    /// without constructing one.
    pub fn validate_level(&self, level: i32) -> Result<()> {
        match self {
            Compression::Pgzip | Compression::Bgzf => gzip(level).map(|_| ()),
            Compression::Bzip2 => bzip2(level).map(|_| ()),
            Compression::None | Compression::Lz4 | Compression::Xz => Ok(()),
        }
    }
}
