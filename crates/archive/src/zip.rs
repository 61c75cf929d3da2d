//! Zip writer.
//!
//! Local headers are patched in place once each body has been written, and
//! the central directory goes out when the archive is finished, so the sink
//! must be seekable.

use crate::entry;
use crate::error::{ErrorKind, Result};
use crate::interrupt::{copy_failed, ensure_active};
use crate::{Inputs, Interruptible};
use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};
use exn::ResultExt;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Entries at least this large need zip64 headers.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Write every input into a zip archive on `sink`, returning the sink once
/// the central directory has been written.
pub fn write<W: Write + Seek>(inputs: &Inputs, sink: W, token: &CancellationToken) -> Result<W> {
    let mut archive = ZipWriter::new(sink);
    for path in inputs.iter() {
        append(&mut archive, path, token)?;
    }
    archive.finish().or_raise(|| ErrorKind::Finish)
}

#[instrument(skip_all, fields(path = %path.display(), size))]
fn append<W: Write + Seek>(archive: &mut ZipWriter<W>, path: &Path, token: &CancellationToken) -> Result<()> {
    ensure_active(token)?;
    let name = entry_name(path)?;
    let file = File::open(path).or_raise(|| ErrorKind::Open(path.to_path_buf()))?;
    let size = file.metadata().or_raise(|| ErrorKind::Open(path.to_path_buf()))?.len();
    tracing::Span::current().record("size", size);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(size >= ZIP64_THRESHOLD);
    archive.start_file(name, options).or_raise(|| ErrorKind::Header(path.to_path_buf()))?;
    std::io::copy(&mut Interruptible::new(file, token), archive).or_raise(|| copy_failed(token, path))?;
    Ok(())
}

/// The input path as stored in the archive, relative and `/`-separated.
fn entry_name(path: &Path) -> Result<String> {
    let parts: Vec<_> = entry::components(path)?.into_iter().map(|part| part.to_string_lossy()).collect();
    Ok(parts.join("/"))
}
