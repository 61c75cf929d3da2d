//! Pipeline orchestration: output file, compressor, archive writer.
//!
//! Sinks are built outward from the output file (file, then compressor, then
//! archive writer) and released in the opposite order. Each layer owns the
//! one beneath it, so on every exit path, error or not, the archive writer
//! is dropped before the compressor, and the compressor before the file.
//! On success the layers are finished explicitly so that trailer and footer
//! errors surface instead of being swallowed by a drop.

use crate::error::{ErrorKind, Result};
use crate::format::Format;
use crate::ui::Ui;
use exn::{OptionExt, ResultExt};
use parcel_archive::{Archive, Inputs, passthrough, tar, zip};
use parcel_compress::{Compression, Encoder, EncoderOptions, level};
use parcel_config::Settings;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs::{DirBuilder, File};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Validated, classified configuration for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    output: PathBuf,
    format: Format,
    level: i32,
    workers: NonZeroUsize,
}

impl PipelineConfig {
    /// Classify `output` and validate the level against the detected codec.
    ///
    /// The level is normalised first: values above 9 become 9, and `0` and
    /// `-1` both mean "library default".
    ///
    /// # Errors
    ///
    /// [`InvalidCompressionLevel`](ErrorKind::InvalidCompressionLevel) when
    /// the detected codec would reject the level.
    pub fn new(
        output: impl Into<PathBuf>,
        explicit_format: Option<&str>,
        level: i32,
        workers: NonZeroUsize,
    ) -> Result<Self> {
        let output = output.into();
        let format = Format::classify(&output, explicit_format);
        let level = level::normalize(level);
        format.compression().validate_level(level).or_raise(|| ErrorKind::InvalidCompressionLevel(level))?;
        tracing::debug!(
            output = %output.display(),
            archive = %format.archive(),
            compression = %format.compression(),
            level,
            "classified output"
        );
        Ok(Self { output, format, level, workers })
    }

    /// # Errors
    ///
    /// [`MissingOutput`](ErrorKind::MissingOutput) when no output path is
    /// configured, otherwise as [`new`](Self::new).
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let output = settings.output.clone().ok_or_raise(|| ErrorKind::MissingOutput)?;
        Self::new(output, settings.format.as_deref(), settings.compression_level, settings.workers())
    }

    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }

    #[must_use]
    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }
}

/// The finished output of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Display for Artifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "compressed artifacts in: {}", self.path.display())
    }
}

/// Runs one configuration against a set of inputs.
pub struct Pipeline {
    config: PipelineConfig,
    token: CancellationToken,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config, token: CancellationToken::new() }
    }

    /// Abort the run (at the next read of input data) once `token` is
    /// cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stream `inputs` into the configured output.
    ///
    /// A failure part-way through leaves whatever was written on disk; there
    /// is no rollback.
    #[instrument(skip_all, fields(
        output = %self.config.output.display(),
        archive = %self.config.format.archive(),
        compression = %self.config.format.compression(),
        inputs = inputs.len(),
    ))]
    pub fn run(&self, inputs: &Inputs, ui: &dyn Ui) -> Result<Artifact> {
        let target = &self.config.output;
        let compression = self.config.format.compression();
        let archive = self.config.format.archive();
        if archive == Archive::None && inputs.len() != 1 {
            exn::bail!(ErrorKind::WrongInputCount(inputs.len()));
        }
        if self.token.is_cancelled() {
            exn::bail!(ErrorKind::Cancelled);
        }

        let file = create_output(target)?;
        let described = match compression {
            Compression::None => "no compression",
            other => other.as_str(),
        };
        match archive {
            Archive::Zip => {
                ui.say(&format!("Zipping {}", target.display()));
                let mut file = zip::write(inputs, file, &self.token).or_raise(|| self.archive_failed())?;
                file.flush().or_raise(|| ErrorKind::Output(target.clone()))?;
            },
            Archive::Tar => {
                let encoder = self.encoder(file, ui)?;
                ui.say(&format!("Tarring {} with {described}", target.display()));
                let encoder = tar::write(inputs, encoder, &self.token).or_raise(|| self.archive_failed())?;
                encoder.finish().or_raise(|| ErrorKind::Compression(compression))?;
            },
            Archive::None => {
                let encoder = self.encoder(file, ui)?;
                ui.say(&format!("Archiving {} with {described}", inputs[0].display()));
                let encoder =
                    passthrough::write(inputs, encoder, &self.token).or_raise(|| self.archive_failed())?;
                encoder.finish().or_raise(|| ErrorKind::Compression(compression))?;
            },
        }

        ui.say(&format!("Archive {} completed", target.display()));
        Ok(Artifact { path: target.clone() })
    }

    fn encoder(&self, file: File, ui: &dyn Ui) -> Result<Encoder<File>> {
        let compression = self.config.format.compression();
        let target = self.config.output.display();
        let workers = self.config.workers;
        match compression {
            Compression::None => {},
            c if c.is_parallel() => {
                ui.say(&format!("Using {c} compression with {} cores for {target}", c.threads(workers.get())))
            },
            c => ui.say(&format!("Using {c} compression with 1 core for {target} (library does not support MT)")),
        }
        let options = EncoderOptions { level: self.config.level, workers };
        compression.encoder(file, &options).or_raise(|| ErrorKind::Compression(compression))
    }

    fn archive_failed(&self) -> ErrorKind {
        if self.token.is_cancelled() { ErrorKind::Cancelled } else { ErrorKind::Archive }
    }
}

fn create_output(target: &Path) -> Result<File> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        std::os::unix::fs::DirBuilderExt::mode(&mut builder, 0o755);
        builder.create(parent).or_raise(|| ErrorKind::Output(target.to_path_buf()))?;
    }
    File::create(target).or_raise(|| ErrorKind::Output(target.to_path_buf()))
}
