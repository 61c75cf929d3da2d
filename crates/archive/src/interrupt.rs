use crate::error::ErrorKind;
use std::io::{Error as IoError, Read, Result as IoResult};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// A reader that fails as soon as its [`CancellationToken`] is cancelled.
///
/// Cancellation surfaces as an ordinary I/O error (never
/// [`Interrupted`](std::io::ErrorKind::Interrupted), which `io::copy` would
/// retry), so callers check [`CancellationToken::is_cancelled`] when mapping
/// the failure.
pub struct Interruptible<'a, R> {
    inner: R,
    token: &'a CancellationToken,
}

impl<'a, R: Read> Interruptible<'a, R> {
    pub fn new(inner: R, token: &'a CancellationToken) -> Self {
        Self { inner, token }
    }
}

impl<R: Read> Read for Interruptible<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        if self.token.is_cancelled() {
            return Err(IoError::other("operation cancelled"));
        }
        self.inner.read(buf)
    }
}

/// Classify a failed read of `path`: cancellation wins over the I/O error
/// it was reported as.
pub(crate) fn copy_failed(token: &CancellationToken, path: &Path) -> ErrorKind {
    if token.is_cancelled() { ErrorKind::Cancelled } else { ErrorKind::Copy(path.to_path_buf()) }
}

/// Bail out before touching the next input if the caller has given up.
pub(crate) fn ensure_active(token: &CancellationToken) -> crate::error::Result<()> {
    if token.is_cancelled() {
        exn::bail!(ErrorKind::Cancelled);
    }
    Ok(())
}
