use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use audiocrop::{CancelToken, ContainerFormat, CropConfig, CropWindow, crop_to_file_with};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    Mp4,
    Mov,
}

impl From<Format> for ContainerFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Mp4 => ContainerFormat::Mp4,
            Format::Mov => ContainerFormat::Mov,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CropCommand {
    /// Audio file to crop
    pub input: PathBuf,

    /// Output file
    pub output: PathBuf,

    /// Start of the range in milliseconds
    #[arg(short, long, default_value = "0")]
    pub start_ms: u64,

    /// End of the range in milliseconds; clamped to the duration
    #[arg(short, long)]
    pub end_ms: u64,

    /// Output container (guessed from the output extension if omitted)
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Put the sample index at the front of the file
    #[arg(long)]
    pub fast_start: bool,

    /// Make output timestamps start at zero
    #[arg(long)]
    pub rebase: bool,
}

impl CropCommand {
    pub fn run(self, mut config: CropConfig) -> Result<()> {
        if let Some(format) = self
            .format
            .map(ContainerFormat::from)
            .or_else(|| ContainerFormat::from_path(&self.output))
        {
            config.format = format;
        }
        config.fast_start |= self.fast_start;
        config.rebase_timestamps |= self.rebase;

        let window = CropWindow::new(self.start_ms, self.end_ms);
        let report = crop_to_file_with(
            &self.input,
            &self.output,
            window,
            &config,
            &CancelToken::new(),
        )
        .with_context(|| {
            format!(
                "cropping {} to {}",
                self.input.display(),
                self.output.display()
            )
        })?;

        println!(
            "Wrote {} samples ({} bytes) to {}",
            report.samples_written,
            report.bytes_written,
            self.output.display()
        );
        if let (Some(first), Some(last)) = (report.first_sample_us, report.last_sample_us) {
            println!("  Source range: {} us .. {} us", first, last);
        }
        Ok(())
    }
}
