//! Streaming tar writer.
//!
//! Each input is written as a header immediately followed by its body, in
//! input order; there is no index to patch, so any [`Write`] sink works.

use crate::entry;
use crate::error::{ErrorKind, Result};
use crate::interrupt::{copy_failed, ensure_active};
use crate::{Inputs, Interruptible};
use ::tar::{Builder, Header, HeaderMode};
use exn::ResultExt;
use std::fs::{File, Metadata};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Write every input into a tar stream on `sink`, returning the sink once the
/// end-of-archive trailer has been written.
///
/// Stops at the first failure; entries already written stay in the sink.
pub fn write<W: Write>(inputs: &Inputs, sink: W, token: &CancellationToken) -> Result<W> {
    let mut builder = Builder::new(sink);
    for path in inputs.iter() {
        append(&mut builder, path, token)?;
    }
    builder.into_inner().or_raise(|| ErrorKind::Finish)
}

#[instrument(skip_all, fields(path = %path.display(), size))]
fn append<W: Write>(builder: &mut Builder<W>, path: &Path, token: &CancellationToken) -> Result<()> {
    ensure_active(token)?;
    let name = entry_name(path)?;
    let file = File::open(path).or_raise(|| ErrorKind::Open(path.to_path_buf()))?;
    let metadata = file.metadata().or_raise(|| ErrorKind::Open(path.to_path_buf()))?;
    tracing::Span::current().record("size", metadata.len());

    let mut header = header(&metadata);
    builder
        .append_data(&mut header, &name, Interruptible::new(file, token))
        .or_raise(|| copy_failed(token, path))
}

/// Header for a regular file, built from its metadata.
///
/// Always the GNU layout: it's what `tar` implementations everywhere agree
/// on, and it carries long names and large sizes without PAX records that
/// older readers (libarchive included) misreport.
fn header(metadata: &Metadata) -> Header {
    let mut header = Header::new_gnu();
    header.set_metadata_in_mode(metadata, HeaderMode::Complete);
    header
}

/// The input path as stored in the archive.
fn entry_name(path: &Path) -> Result<PathBuf> {
    Ok(entry::components(path)?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Read;
    use tempfile::TempDir;

    fn fixture(files: &[(&str, &[u8])]) -> (TempDir, Vec<PathBuf>) {
        let dir = tempfile::tempdir().unwrap();
        let paths = files
            .iter()
            .map(|(name, contents)| {
                let path = dir.path().join(name);
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(&path, contents).unwrap();
                path
            })
            .collect();
        (dir, paths)
    }

    fn read_entries(bytes: &[u8]) -> Vec<(PathBuf, Vec<u8>)> {
        let mut archive = ::tar::Archive::new(bytes);
        archive
            .entries()
            .unwrap()
            .map(|entry| {
                let mut entry = entry.unwrap();
                assert!(entry.header().as_gnu().is_some());
                let path = entry.path().unwrap().into_owned();
                let mut contents = Vec::new();
                entry.read_to_end(&mut contents).unwrap();
                (path, contents)
            })
            .collect()
    }

    fn stored(path: &Path) -> PathBuf {
        path.strip_prefix("/").unwrap_or(path).to_path_buf()
    }

    #[test]
    fn test_roundtrip() {
        let big: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
        let (_dir, paths) = fixture(&[("a.txt", b"alpha"), ("nested/b.bin", &big), ("empty", b"")]);
        let inputs = Inputs::new(paths.clone()).unwrap();

        let bytes = write(&inputs, Vec::new(), &CancellationToken::new()).unwrap();
        let entries = read_entries(&bytes);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], (stored(&paths[0]), b"alpha".to_vec()));
        assert_eq!(entries[1], (stored(&paths[1]), big));
        assert_eq!(entries[2], (stored(&paths[2]), Vec::new()));
    }

    #[test]
    fn test_missing_input_aborts() {
        let (_dir, mut paths) = fixture(&[("one", b"1"), ("three", b"3")]);
        let missing = paths[0].with_file_name("two");
        paths.insert(1, missing.clone());
        let inputs = Inputs::new(paths.clone()).unwrap();

        let mut bytes = Vec::new();
        let Err(err) = write(&inputs, &mut bytes, &CancellationToken::new()) else {
            panic!("archiving a missing file should fail");
        };
        assert_eq!(*err, ErrorKind::Open(missing.clone()));
        assert!(err.to_string().contains(&missing.display().to_string()));

        let names: Vec<PathBuf> = read_entries(&bytes).into_iter().map(|(path, _)| path).collect();
        assert_eq!(names, vec![stored(&paths[0])]);
    }

    #[test]
    fn test_cancelled_before_start() {
        let (_dir, paths) = fixture(&[("one", b"1")]);
        let token = CancellationToken::new();
        token.cancel();
        let Err(err) = write(&Inputs::new(paths).unwrap(), Vec::new(), &token) else {
            panic!("cancelled write should fail");
        };
        assert_eq!(*err, ErrorKind::Cancelled);
    }

    #[test]
    fn test_parent_references_are_resolved() {
        let (dir, _) = fixture(&[("a/sub/other", b""), ("a/f", b"contents")]);
        let input = dir.path().join("a").join("sub").join("..").join("f");
        let inputs = Inputs::new([&input]).unwrap();

        let bytes = write(&inputs, Vec::new(), &CancellationToken::new()).unwrap();
        assert_eq!(read_entries(&bytes), vec![(stored(&dir.path().join("a").join("f")), b"contents".to_vec())]);
    }

    /// Sink that cancels `token` once `limit` bytes have been written to it.
    struct CancelAfter<'a> {
        written: Vec<u8>,
        limit: usize,
        token: &'a CancellationToken,
    }

    impl Write for CancelAfter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            if self.written.len() >= self.limit {
                self.token.cancel();
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cancelled_between_entries() {
        let (_dir, paths) = fixture(&[("one", b"1"), ("two", b"2")]);
        let token = CancellationToken::new();
        // One header block plus one padded body block.
        let mut sink = CancelAfter { written: Vec::new(), limit: 1024, token: &token };

        let Err(err) = write(&Inputs::new(paths.clone()).unwrap(), &mut sink, &token) else {
            panic!("write cancelled after the first entry should fail");
        };
        assert_eq!(*err, ErrorKind::Cancelled);
        let names: Vec<PathBuf> = read_entries(&sink.written).into_iter().map(|(path, _)| path).collect();
        assert_eq!(names, vec![stored(&paths[0])]);
    }

    #[test]
    fn test_cancelled_mid_entry() {
        let big = vec![1u8; 1 << 20];
        let (_dir, paths) = fixture(&[("big", &big), ("small", b"2")]);
        let token = CancellationToken::new();
        let mut sink = CancelAfter { written: Vec::new(), limit: 4096, token: &token };

        let Err(err) = write(&Inputs::new(paths).unwrap(), &mut sink, &token) else {
            panic!("write cancelled while copying should fail");
        };
        assert_eq!(*err, ErrorKind::Cancelled);
        assert!(sink.written.len() < 1 << 20);
    }

    #[rstest]
    #[case("/abs/path/file", Some("abs/path/file"))]
    #[case("./rel/file", Some("rel/file"))]
    #[case("file", Some("file"))]
    #[case("../x/f", Some("x/f"))]
    #[case("a/../f", Some("f"))]
    #[case("/", None)]
    fn test_entry_name(#[case] path: &str, #[case] expected: Option<&str>) {
        let result = entry_name(Path::new(path)).ok();
        assert_eq!(result, expected.map(PathBuf::from));
    }
}
