use crate::error::{ErrorKind, Result};
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// An ordered, non-empty list of input file paths.
///
/// Order is preserved all the way into the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inputs(Vec<PathBuf>);

impl Inputs {
    /// # Errors
    ///
    /// [`NoInputs`](ErrorKind::NoInputs) if `paths` is empty.
    pub fn new<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            exn::bail!(ErrorKind::NoInputs);
        }
        Ok(Self(paths))
    }

    /// The only input, for modes that can't bundle several files.
    ///
    /// # Errors
    ///
    /// [`WrongInputCount`](ErrorKind::WrongInputCount) unless there is
    /// exactly one input.
    pub fn single(&self) -> Result<&Path> {
        match self.0.as_slice() {
            [only] => Ok(only),
            paths => exn::bail!(ErrorKind::WrongInputCount(paths.len())),
        }
    }
}

impl Deref for Inputs {
    type Target = [PathBuf];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
