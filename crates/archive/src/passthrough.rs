//! Single-file passthrough: no archive framing, just the bytes.

use crate::error::{ErrorKind, Result};
use crate::interrupt::{copy_failed, ensure_active};
use crate::{Inputs, Interruptible};
use exn::ResultExt;
use std::fs::File;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Copy the one and only input into `sink`, returning the sink.
///
/// # Errors
///
/// [`WrongInputCount`](ErrorKind::WrongInputCount) if `inputs` holds more
/// than one path; checked before any file is opened.
#[instrument(skip_all, fields(path, bytes))]
pub fn write<W: Write>(inputs: &Inputs, mut sink: W, token: &CancellationToken) -> Result<W> {
    let path = inputs.single()?;
    tracing::Span::current().record("path", tracing::field::display(path.display()));
    ensure_active(token)?;

    let file = File::open(path).or_raise(|| ErrorKind::Open(path.to_path_buf()))?;
    let bytes =
        std::io::copy(&mut Interruptible::new(file, token), &mut sink).or_raise(|| copy_failed(token, path))?;
    tracing::Span::current().record("bytes", bytes);
    Ok(sink)
}
