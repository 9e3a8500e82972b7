use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use audiocrop::{CancelToken, EnvelopeConfig, try_extract_envelope};

#[derive(Parser, Debug)]
pub struct EnvelopeCommand {
    /// Audio file to summarize
    pub input: PathBuf,

    /// Maximum number of PCM samples to summarize
    #[arg(short, long)]
    pub budget: Option<usize>,

    /// Reduce the envelope to this many (min, max) pairs
    #[arg(long)]
    pub bins: Option<usize>,
}

impl EnvelopeCommand {
    pub fn run(self, mut config: EnvelopeConfig) -> Result<()> {
        if let Some(budget) = self.budget {
            config.sample_budget = budget;
        }

        let result = try_extract_envelope(&self.input, &config, &CancelToken::new())
            .with_context(|| format!("extracting envelope of {}", self.input.display()))?;

        let output = match self.bins {
            Some(bins) => serde_json::json!({
                "duration_ms": result.duration_ms,
                "samples": result.envelope.len(),
                "peaks": result.envelope.peaks(bins),
            }),
            None => serde_json::json!({
                "duration_ms": result.duration_ms,
                "samples": result.envelope.len(),
                "envelope": result.envelope.values(),
            }),
        };
        println!("{}", serde_json::to_string(&output)?);
        Ok(())
    }
}
