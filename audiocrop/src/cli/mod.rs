use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use audiocrop::AppConfig;

mod crop;
mod envelope;
mod probe;

pub use crop::CropCommand;
pub use envelope::EnvelopeCommand;
pub use probe::ProbeCommand;

#[derive(Parser, Debug)]
#[command(name = "audiocrop")]
#[command(about = "Draw audio waveforms and crop audio without re-encoding")]
pub struct Args {
    /// JSON config file; flags override its values
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = audiocrop::logging::DEFAULT_FILTER)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the amplitude envelope of an audio file
    Envelope(EnvelopeCommand),
    /// Copy a time range of an audio file into a new container
    Crop(CropCommand),
    /// Print duration and audio stream details
    Probe(ProbeCommand),
}

impl Args {
    pub fn run(self) -> Result<()> {
        audiocrop::logging::init(&self.log);

        let config = load_config(self.config.as_deref())?;

        match self.command {
            Command::Envelope(cmd) => cmd.run(config.envelope),
            Command::Crop(cmd) => cmd.run(config.crop),
            Command::Probe(cmd) => cmd.run(),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}
