use clap::Parser;
use exn::ResultExt;
use parcel::error::{ErrorKind, Result};
use parcel::{Inputs, Pipeline, PipelineConfig, TracingUi};
use parcel_config::Settings;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Stream files into a single tar/zip archive and/or compressed file.
///
/// The format is taken from the output name: `out.tar.gz`, `out.tar.xz`,
/// `out.zip`, `disk.img.lz4`, ... Names without a recognised suffix produce a
/// pgzip-compressed tarball.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Format suffixes to use instead of the output name's (e.g. "tar.xz")
    #[arg(short, long)]
    format: Option<String>,
    /// Compression level; 0 and -1 both mean the library default
    #[arg(short, long, allow_hyphen_values = true)]
    level: Option<i32>,
    /// Worker threads for parallel gzip (defaults to available cores)
    #[arg(short = 'j', long)]
    workers: Option<NonZeroUsize>,
    /// Files to bundle, in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        if let Some(output) = &self.output {
            settings.output = Some(output.clone());
        }
        if let Some(format) = &self.format {
            settings.format = Some(format.clone());
        }
        if let Some(level) = self.level {
            settings.compression_level = level;
        }
        if self.workers.is_some() {
            settings.workers = self.workers;
        }
        Ok(settings)
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = PipelineConfig::from_settings(&cli.settings()?)?;
    let inputs = Inputs::new(&cli.inputs).or_raise(|| ErrorKind::Archive)?;
    let artifact = Pipeline::new(config).run(&inputs, &TracingUi)?;
    println!("{}", artifact.path().display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}
