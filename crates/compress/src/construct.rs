use crate::Compression;

impl Compression {
    /// Look up the compression implied by a filename suffix token.
    ///
    /// Only the exact, lowercase suffixes recognised for output filenames are
    /// matched (`gz`, `lz4`, `bgzf`, `xz`, `bzip2`). Note that `bz2` is *not*
    /// one of them; names ending in `.bz2` fall through to the caller's
    /// default.
    #[must_use]
    pub fn from_extension(token: &str) -> Option<Self> {
        match token {
            "gz" => Some(Compression::Pgzip),
            "lz4" => Some(Compression::Lz4),
            "bgzf" => Some(Compression::Bgzf),
            "xz" => Some(Compression::Xz),
            "bzip2" => Some(Compression::Bzip2),
            _ => None,
        }
    }
}
