//! Output format detection from filenames.
//!
//! The output path (plus any explicitly configured format, appended as extra
//! suffixes) is scanned for `.suffix` tokens; only the last two matter:
//!
//! | Name                     | Archive | Compression |
//! |--------------------------|---------|-------------|
//! | `out` (no suffix)        | tar     | pgzip       |
//! | `out.tar`                | tar     | none        |
//! | `out.zip`                | zip     | none        |
//! | `out.tar.gz`             | tar     | pgzip       |
//! | `out.tar.zip`            | zip     | none        |
//! | `out.lz4`                | none    | lz4         |
//! | `out.unknown`            | tar     | pgzip       |
//!
//! Anything unrecognised falls back to a pgzip-compressed tarball, never to
//! "no archive, no compression".

use parcel_archive::Archive;
use parcel_compress::Compression;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.([a-z0-9]+)").expect("suffix pattern is valid"));

/// The archive container and compression codec for one run.
///
/// Fixed once classified; downstream code matches on the enums and never
/// re-parses names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Format {
    archive: Archive,
    compression: Compression,
}

impl Default for Format {
    /// The fallback for names without a recognisable suffix.
    fn default() -> Self {
        Self { archive: Archive::Tar, compression: Compression::Pgzip }
    }
}

impl Format {
    /// Infer the format from an output path and an optional explicit format.
    ///
    /// An explicit format such as `"tar.xz"` is treated as if it had been
    /// appended to the output name. Pure; no filesystem access.
    #[must_use]
    pub fn classify(output: impl AsRef<Path>, explicit: Option<&str>) -> Self {
        let name = output.as_ref().to_string_lossy();
        let name = match explicit.filter(|format| !format.is_empty()) {
            Some(format) => format!("{name}.{format}"),
            None => name.into_owned(),
        };
        let tokens: Vec<&str> = SUFFIX.captures_iter(&name).filter_map(|c| c.get(1)).map(|m| m.as_str()).collect();

        let Some((last, rest)) = tokens.split_last() else {
            return Self::default();
        };
        // A `.tar.` right before the final suffix means "compressed tarball"
        // if the final suffix turns out to be a codec.
        let archive = match rest.last() {
            Some(&"tar") => Archive::Tar,
            _ => Archive::None,
        };
        // A trailing archive suffix is authoritative.
        if let Some(archive) = Archive::from_extension(last) {
            return Self { archive, compression: Compression::None };
        }
        match Compression::from_extension(last) {
            Some(compression) => Self { archive, compression },
            None => Self::default(),
        }
    }

    #[must_use]
    pub fn archive(&self) -> Archive {
        self.archive
    }

    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }
}
