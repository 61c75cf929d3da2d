//! Layered settings for parcel.
//!
//! Values are merged in increasing order of precedence:
//!
//! 1. built-in defaults ([`Settings::default`]),
//! 2. a config file (TOML, YAML or JSON, picked by extension); without an
//!    explicit file, `config.toml` in the per-user config directory is used
//!    when it exists,
//! 3. environment variables prefixed with `PARCEL_`, such as
//!    `PARCEL_COMPRESSION_LEVEL=9`.
//!
//! Command-line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "PARCEL_";
const CONFIG_FILE: &str = "config.toml";

/// User-facing settings, before classification or validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the artifact is written. Its suffixes pick the format unless
    /// [`format`](Self::format) is set.
    pub output: Option<PathBuf>,
    /// Extra suffixes (e.g. `tar.xz`) appended to the output name for
    /// format detection only.
    pub format: Option<String>,
    /// Codec level; `0` and `-1` both mean "library default".
    pub compression_level: i32,
    /// Threads for the parallel gzip encoders; detected when unset.
    pub workers: Option<NonZeroUsize>,
}

impl Settings {
    /// Load settings from defaults, a config file and the environment.
    ///
    /// # Errors
    ///
    /// [`UnsupportedFile`](ErrorKind::UnsupportedFile) when `path` has an
    /// unknown extension, [`Load`](ErrorKind::Load) when any provider yields
    /// values that don't deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        match path {
            Some(path) => figment = figment.merge(file_provider(path)?),
            None => {
                if let Some(default) = default_path().filter(|p| p.is_file()) {
                    tracing::debug!(path = %default.display(), "loading user configuration");
                    figment = figment.merge(Toml::file(default));
                }
            },
        }
        figment.merge(Env::prefixed(ENV_PREFIX)).extract().or_raise(|| ErrorKind::Load)
    }

    /// Worker count for this process: the configured value, otherwise the
    /// detected available parallelism, otherwise one.
    #[must_use]
    pub fn workers(&self) -> NonZeroUsize {
        self.workers
            .or_else(|| std::thread::available_parallelism().ok())
            .unwrap_or(NonZeroUsize::MIN)
    }
}

/// Per-user config file location, if the platform has one.
#[must_use]
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "parcel").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

fn file_provider(path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => Figment::from(Toml::file(path)),
        Some("yaml" | "yml") => Figment::from(Yaml::file(path)),
        Some("json") => Figment::from(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFile(path.to_path_buf())),
    })
}
