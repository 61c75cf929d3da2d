//! Compressor factory.

use crate::Compression;
use crate::error::{ErrorKind, Result};
use crate::level;
use bzip2::write::BzEncoder;
use exn::ResultExt;
use gzp::deflate::{Bgzf, Gzip};
use gzp::{FormatSpec, ZWriter};
use gzp::par::compress::{ParCompress, ParCompressBuilder};
use lz4::{Encoder as Lz4Encoder, EncoderBuilder as Lz4EncoderBuilder};
use std::io::{Error as IoError, Result as IoResult, Write};
use std::num::NonZeroUsize;
use tracing::instrument;
use xz2::write::XzEncoder;

/// Bytes accumulated per pgzip block before it is handed to a worker.
const PGZIP_BLOCK_SIZE: usize = 500_000;

/// Tuning knobs shared by every encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Requested level; see [`level`](crate::level) for how each codec reads it.
    pub level: i32,
    /// Worker threads available to the parallel gzip encoders.
    pub workers: NonZeroUsize,
}
impl Default for EncoderOptions {
    fn default() -> Self {
        Self { level: level::DEFAULT, workers: NonZeroUsize::MIN }
    }
}

/// A streaming compressor wrapping the downstream writer `W`.
///
/// Dropping an encoder flushes what it can but swallows any error, so callers
/// that care about the output call [`finish`](Self::finish) instead.
pub enum Encoder<W: Write + Send + 'static> {
    None(W),
    // The parallel encoders move `W` onto their writer thread.
    Pgzip(Parallel<Gzip>),
    Bgzf(Parallel<Bgzf>),
    Bzip2(BzEncoder<W>),
    Lz4(Lz4Encoder<W>),
    Xz(XzEncoder<W>),
}

impl Compression {
    /// Wrap a writer with this format's compression layer.
    ///
    /// # Errors
    ///
    /// [`InvalidCompressionLevel`](ErrorKind::InvalidCompressionLevel) when the
    /// codec won't accept `options.level`, or [`Encoder`](ErrorKind::Encoder)
    /// when the codec fails to initialise for any other reason.
    ///
    /// # Examples
    ///
    /// ```
    /// use parcel_compress::{Compression, EncoderOptions};
    /// use std::io::Write;
    ///
    /// let mut encoder = Compression::Bzip2.encoder(Vec::new(), &EncoderOptions::default()).unwrap();
    /// encoder.write_all(b"Hello, world!").unwrap();
    /// encoder.finish().unwrap();
    /// ```
    #[instrument(skip(writer), fields(format = %self))]
    pub fn encoder<W: Write + Send + 'static>(&self, writer: W, options: &EncoderOptions) -> Result<Encoder<W>> {
        let workers = options.workers.get();
        Ok(match self {
            Compression::None => Encoder::None(writer),
            Compression::Pgzip => {
                let level = level::gzip(options.level)?;
                let encoder = ParCompressBuilder::<Gzip>::new()
                    .compression_level(level)
                    .num_threads(workers)
                    .or_raise(|| ErrorKind::Encoder(*self))?
                    .buffer_size(PGZIP_BLOCK_SIZE)
                    .or_raise(|| ErrorKind::Encoder(*self))?
                    .from_writer(writer);
                Encoder::Pgzip(Parallel::new(encoder))
            },
            Compression::Bgzf => {
                let level = level::gzip(options.level)?;
                let encoder = ParCompressBuilder::<Bgzf>::new()
                    .compression_level(level)
                    .num_threads(workers)
                    .or_raise(|| ErrorKind::Encoder(*self))?
                    .from_writer(writer);
                Encoder::Bgzf(Parallel::new(encoder))
            },
            Compression::Bzip2 => Encoder::Bzip2(BzEncoder::new(writer, level::bzip2(options.level)?)),
            Compression::Lz4 => {
                let mut builder = Lz4EncoderBuilder::new();
                if let Some(level) = level::lz4(options.level) {
                    builder.level(level);
                }
                Encoder::Lz4(builder.build(writer).or_raise(|| ErrorKind::Encoder(*self))?)
            },
            // xz has no user-facing level; the requested one is ignored.
            Compression::Xz => Encoder::Xz(XzEncoder::new(writer, level::XZ_PRESET)),
        })
    }
}

impl<W: Write + Send + 'static> Encoder<W> {
    /// The format this encoder produces.
    #[must_use]
    pub fn compression(&self) -> Compression {
        match self {
            Encoder::None(_) => Compression::None,
            Encoder::Pgzip(_) => Compression::Pgzip,
            Encoder::Bgzf(_) => Compression::Bgzf,
            Encoder::Bzip2(_) => Compression::Bzip2,
            Encoder::Lz4(_) => Compression::Lz4,
            Encoder::Xz(_) => Compression::Xz,
        }
    }

    /// Flush trailing blocks and footers, then release the downstream writer.
    ///
    /// The downstream writer is flushed and dropped before this returns, so a
    /// file handle passed to [`Compression::encoder`] is closed once `finish`
    /// succeeds.
    #[instrument(skip(self), fields(format = %self.compression()))]
    pub fn finish(self) -> Result<()> {
        let mut inner = match self {
            Encoder::None(inner) => inner,
            Encoder::Pgzip(mut encoder) => return encoder.finish(),
            Encoder::Bgzf(mut encoder) => return encoder.finish(),
            Encoder::Bzip2(encoder) => encoder.finish().or_raise(|| ErrorKind::Io)?,
            Encoder::Lz4(encoder) => {
                let (inner, result) = encoder.finish();
                result.or_raise(|| ErrorKind::Io)?;
                inner
            },
            Encoder::Xz(encoder) => encoder.finish().or_raise(|| ErrorKind::Io)?,
        };
        inner.flush().or_raise(|| ErrorKind::Io)
    }
}

/// A gzp parallel encoder that is safe to drop after its writer thread fails.
///
/// gzp finishes the stream again when its encoder is dropped and panics if
/// that fails. Once a finish has failed the writer thread is gone, so the
/// encoder is forgotten rather than dropped.
pub struct Parallel<F: FormatSpec>(Option<ParCompress<F>>);

impl<F: FormatSpec> Parallel<F> {
    fn new(encoder: ParCompress<F>) -> Self {
        Self(Some(encoder))
    }

    fn finish(&mut self) -> Result<()> {
        let Some(mut encoder) = self.0.take() else {
            return Ok(());
        };
        match encoder.finish() {
            Ok(()) => Ok(()),
            Err(err) => {
                std::mem::forget(encoder);
                Err(err).or_raise(|| ErrorKind::Io)
            },
        }
    }

    fn active(&mut self) -> IoResult<&mut ParCompress<F>> {
        self.0.as_mut().ok_or_else(|| IoError::other("encoder already finished"))
    }
}

impl<F: FormatSpec> Write for Parallel<F> {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.active()?.write(buf)
    }

    fn flush(&mut self) -> IoResult<()> {
        self.active()?.flush()
    }
}

impl<F: FormatSpec> Drop for Parallel<F> {
    fn drop(&mut self) {
        if let Err(err) = self.finish() {
            tracing::debug!("discarding parallel encoder after failed finish: {err:?}");
        }
    }
}

impl<W: Write + Send + 'static> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        match self {
            Encoder::None(w) => w.write(buf),
            Encoder::Pgzip(w) => w.write(buf),
            Encoder::Bgzf(w) => w.write(buf),
            Encoder::Bzip2(w) => w.write(buf),
            Encoder::Lz4(w) => w.write(buf),
            Encoder::Xz(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> IoResult<()> {
        match self {
            Encoder::None(w) => w.flush(),
            Encoder::Pgzip(w) => w.flush(),
            Encoder::Bgzf(w) => w.flush(),
            Encoder::Bzip2(w) => w.flush(),
            Encoder::Lz4(w) => w.flush(),
            Encoder::Xz(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Read;
    use std::sync::{Arc, Mutex};

    /// Writer that can be moved onto another thread while the test keeps a
    /// handle on the bytes.
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);
    impl SharedBuffer {
        fn take(&self) -> Vec<u8> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }
    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> IoResult<()> {
            Ok(())
        }
    }

    fn encode(format: Compression, options: &EncoderOptions, input: &[u8]) -> Vec<u8> {
        let sink = SharedBuffer::default();
        let mut encoder = format.encoder(sink.clone(), options).expect("encoder to initialize");
        // Chunked writes so the parallel encoders see several blocks.
        for chunk in input.chunks(64 * 1024) {
            encoder.write_all(chunk).unwrap();
        }
        encoder.finish().unwrap();
        sink.take()
    }

    fn decode(format: Compression, input: &[u8]) -> Vec<u8> {
        let mut output = Vec::new();
        match format {
            Compression::None => output.extend_from_slice(input),
            Compression::Pgzip | Compression::Bgzf => {
                flate2::read::MultiGzDecoder::new(input).read_to_end(&mut output).unwrap();
            },
            Compression::Bzip2 => {
                bzip2::read::BzDecoder::new(input).read_to_end(&mut output).unwrap();
            },
            Compression::Lz4 => {
                lz4::Decoder::new(input).unwrap().read_to_end(&mut output).unwrap();
            },
            Compression::Xz => {
                xz2::read::XzDecoder::new(input).read_to_end(&mut output).unwrap();
            },
        };
        output
    }

    fn sample(len: usize) -> Vec<u8> {
        // Compressible but not trivially so.
        (0..len).map(|i| ((i * 31) % 251) as u8 ^ (i / 4096) as u8).collect()
    }

    #[rstest]
    fn test_roundtrip(
        #[values(
            Compression::None,
            Compression::Pgzip,
            Compression::Bgzf,
            Compression::Bzip2,
            Compression::Lz4,
            Compression::Xz
        )]
        format: Compression,
        #[values(0, 1, 3 * 1024 * 1024 + 17)] len: usize,
    ) {
        let options = EncoderOptions { level: level::DEFAULT, workers: NonZeroUsize::new(4).unwrap() };
        let original = sample(len);
        let compressed = encode(format, &options, &original);
        assert_eq!(decode(format, &compressed), original);
    }

    #[rstest]
    #[case(Compression::Pgzip, &[0x1F, 0x8B])]
    #[case(Compression::Bgzf, &[0x1F, 0x8B])]
    #[case(Compression::Bzip2, b"BZh")]
    #[case(Compression::Lz4, &[0x04, 0x22, 0x4D, 0x18])]
    #[case(Compression::Xz, &[0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00])]
    fn test_container_magic(#[case] format: Compression, #[case] magic: &[u8]) {
        let compressed = encode(format, &EncoderOptions::default(), b"Hello, world!");
        assert!(compressed.starts_with(magic));
    }

    #[test]
    fn test_bgzf_eof_marker() {
        let compressed = encode(Compression::Bgzf, &EncoderOptions::default(), b"Hello, world!");
        // Every BGZF stream ends with the fixed 28-byte empty block.
        assert!(compressed.ends_with(&[0x1B, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]));
    }

    #[test]
    fn test_output_independent_of_workers() {
        let original = sample(2 * 1024 * 1024);
        let single = EncoderOptions { level: 6, workers: NonZeroUsize::MIN };
        let many = EncoderOptions { level: 6, workers: NonZeroUsize::new(8).unwrap() };
        assert_eq!(encode(Compression::Pgzip, &single, &original), encode(Compression::Pgzip, &many, &original));
    }

    #[rstest]
    #[case(Compression::Pgzip)]
    #[case(Compression::Bgzf)]
    fn test_level_clamped_to_best(#[case] format: Compression) {
        let original = sample(256 * 1024);
        let clamped = EncoderOptions { level: 15, ..EncoderOptions::default() };
        let best = EncoderOptions { level: level::BEST, ..EncoderOptions::default() };
        assert_eq!(encode(format, &clamped, &original), encode(format, &best, &original));
    }

    #[rstest]
    #[case(Compression::Pgzip, 0)]
    #[case(Compression::Pgzip, -1)]
    #[case(Compression::Bgzf, 0)]
    #[case(Compression::Bgzf, -1)]
    fn test_unset_level_is_library_default(#[case] format: Compression, #[case] requested: i32) {
        let original = sample(256 * 1024);
        let unset = EncoderOptions { level: requested, ..EncoderOptions::default() };
        let explicit = EncoderOptions { level: 6, ..EncoderOptions::default() };
        assert_eq!(encode(format, &unset, &original), encode(format, &explicit, &original));
    }

    #[rstest]
    #[case(Compression::Pgzip, -2)]
    #[case(Compression::Bgzf, -9)]
    #[case(Compression::Bzip2, 10)]
    fn test_invalid_level(#[case] format: Compression, #[case] requested: i32) {
        let options = EncoderOptions { level: requested, ..EncoderOptions::default() };
        let Err(err) = format.encoder(Vec::new(), &options) else {
            panic!("expected {format} to reject level {requested}");
        };
        assert_eq!(*err, ErrorKind::InvalidCompressionLevel(requested));
    }

    #[test]
    fn test_xz_ignores_level() {
        let original = sample(64 * 1024);
        let low = EncoderOptions { level: 1, ..EncoderOptions::default() };
        let high = EncoderOptions { level: 9, ..EncoderOptions::default() };
        assert_eq!(encode(Compression::Xz, &low, &original), encode(Compression::Xz, &high, &original));
    }

    /// Writer that accepts `budget` bytes and then reports a full disk.
    struct FullDisk {
        budget: usize,
    }
    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
            if self.budget == 0 {
                return Err(IoError::new(std::io::ErrorKind::StorageFull, "no space left on device"));
            }
            let accepted = buf.len().min(self.budget);
            self.budget -= accepted;
            Ok(accepted)
        }
        fn flush(&mut self) -> IoResult<()> {
            Ok(())
        }
    }

    #[rstest]
    fn test_finish_reports_downstream_failure(
        #[values(Compression::Pgzip, Compression::Bgzf, Compression::Bzip2, Compression::Lz4, Compression::Xz)]
        format: Compression,
        #[values(1, 2 * PGZIP_BLOCK_SIZE + 3)] len: usize,
    ) {
        let options = EncoderOptions { level: level::DEFAULT, workers: NonZeroUsize::new(4).unwrap() };
        let mut encoder = format.encoder(FullDisk { budget: 8 }, &options).unwrap();
        // Buffering decides whether a write sees the failure first; finish always does.
        let _ = sample(len).chunks(64 * 1024).try_for_each(|chunk| encoder.write_all(chunk));
        let Err(err) = encoder.finish() else {
            panic!("{format} finished on a full disk");
        };
        assert_eq!(*err, ErrorKind::Io);
    }

    #[rstest]
    #[case(Compression::Pgzip)]
    #[case(Compression::Bgzf)]
    fn test_drop_after_downstream_failure(#[case] format: Compression) {
        let options = EncoderOptions { level: level::DEFAULT, workers: NonZeroUsize::new(2).unwrap() };
        let mut encoder = format.encoder(FullDisk { budget: 8 }, &options).unwrap();
        let _ = encoder.write_all(&sample(2 * PGZIP_BLOCK_SIZE + 3));
        drop(encoder);
    }

    #[test]
    fn test_finish_closes_downstream() {
        let sink = SharedBuffer::default();
        let encoder = Compression::Xz.encoder(sink.clone(), &EncoderOptions::default()).unwrap();
        assert_eq!(encoder.compression(), Compression::Xz);
        encoder.finish().unwrap();
        // Nothing else holds the buffer once the encoder has released it.
        assert_eq!(Arc::strong_count(&sink.0), 1);
    }
}
