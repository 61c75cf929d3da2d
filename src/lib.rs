//! Bundle files into a single archive and/or compressed artifact.
//!
//! A run goes through three stages:
//!
//! 1. [`Format::classify`] picks an [`Archive`] and a [`Compression`] from the
//!    output name (`bundle.tar.xz`, `disk.img.lz4`, `site.zip`, ...), falling
//!    back to a pgzip-compressed tarball.
//! 2. [`PipelineConfig`] fixes that format together with a normalised
//!    compression level and a worker count, rejecting bad levels before any
//!    I/O.
//! 3. [`Pipeline::run`] opens the output, wraps it in the compressor, wraps
//!    that in the archive writer, streams the [`Inputs`] through, and releases
//!    the layers innermost-first.
//!
//! ```no_run
//! use parcel::{Inputs, Pipeline, PipelineConfig, TracingUi};
//! use std::num::NonZeroUsize;
//!
//! let config = PipelineConfig::new("dist/site.tar.gz", None, 9, NonZeroUsize::new(4).unwrap()).unwrap();
//! let inputs = Inputs::new(["index.html", "style.css"]).unwrap();
//! let artifact = Pipeline::new(config).run(&inputs, &TracingUi).unwrap();
//! println!("{artifact}");
//! ```

pub mod error;
mod format;
mod pipeline;
mod ui;

pub use crate::format::Format;
pub use crate::pipeline::{Artifact, Pipeline, PipelineConfig};
pub use crate::ui::{TracingUi, Ui};
pub use parcel_archive::{Archive, Inputs};
pub use parcel_compress::Compression;
pub use tokio_util::sync::CancellationToken;
