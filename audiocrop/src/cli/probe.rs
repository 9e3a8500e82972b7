use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ProbeCommand {
    /// Media file to inspect
    pub input: PathBuf,
}

impl ProbeCommand {
    pub fn run(self) -> Result<()> {
        let info = audiocrop::probe(&self.input)
            .with_context(|| format!("probing {}", self.input.display()))?;

        println!("File: {}", self.input.display());
        match info.duration {
            Some(_) => println!("Duration: {} ms", info.duration_ms()),
            None => println!("Duration: unknown"),
        }
        println!("Tracks: {}", info.track_count);

        match &info.audio {
            Some(audio) => {
                println!("Audio track: {}", audio.index);
                println!("  Codec: {}", audio.codec_name);
                println!("  Sample rate: {} Hz", audio.sample_rate);
                println!("  Channels: {}", audio.channel_count());
                if let Some(format) = audio.sample_format {
                    println!("  Sample format: {:?}", format);
                }
                if let Some(bitrate) = audio.bitrate {
                    println!("  Bitrate: {} bit/s", bitrate);
                }
            }
            None => println!("Audio track: none"),
        }
        Ok(())
    }
}
