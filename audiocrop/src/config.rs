/*!
    Operation settings and the optional JSON config file.
*/

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ffmpeg_decode::AudioDecoderConfig;
use ffmpeg_sink::{ContainerFormat, SinkConfig};

/// Default cap on raw PCM samples fed to the summarizer.
pub const DEFAULT_SAMPLE_BUDGET: usize = 100_000;

/**
    Settings for envelope extraction.
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Maximum number of raw PCM samples summarized.
    pub sample_budget: usize,
    /// Bounded wait for a decoder slot, in milliseconds.
    pub dequeue_timeout_ms: u64,
    /// Capacity of each decoder input slot, in bytes.
    pub input_buffer_size: usize,
    pub input_slots: usize,
    pub output_slots: usize,
    /// How long to keep draining output after the end of input was queued,
    /// in milliseconds.
    pub tail_drain_ms: u64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        let decoder = AudioDecoderConfig::default();
        Self {
            sample_budget: DEFAULT_SAMPLE_BUDGET,
            dequeue_timeout_ms: 10,
            input_buffer_size: decoder.input_buffer_size,
            input_slots: decoder.input_slots,
            output_slots: decoder.output_slots,
            tail_drain_ms: 1000,
        }
    }
}

impl EnvelopeConfig {
    pub fn dequeue_timeout(&self) -> Duration {
        Duration::from_millis(self.dequeue_timeout_ms)
    }

    pub fn tail_drain(&self) -> Duration {
        Duration::from_millis(self.tail_drain_ms)
    }

    pub fn decoder_config(&self) -> AudioDecoderConfig {
        AudioDecoderConfig::default()
            .with_input_slots(self.input_slots)
            .with_output_slots(self.output_slots)
            .with_input_buffer_size(self.input_buffer_size)
    }
}

#[allow(dead_code)]
#[derive(Serialize, Deserialize)]
#[serde(remote = "ContainerFormat", rename_all = "lowercase")]
enum ContainerFormatDef {
    Mp4,
    Mov,
}

/**
    Settings for cropping.
*/
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    #[serde(with = "ContainerFormatDef")]
    pub format: ContainerFormat,
    /// Move the sample index to the front of the output.
    pub fast_start: bool,
    /// Shift output timestamps so the first written sample starts at zero.
    pub rebase_timestamps: bool,
    /// Initial capacity of the sample read buffer, in bytes.
    pub read_buffer_size: usize,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            format: ContainerFormat::Mp4,
            fast_start: false,
            rebase_timestamps: false,
            read_buffer_size: 64 * 1024,
        }
    }
}

impl CropConfig {
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig::new(self.format).with_fast_start(self.fast_start)
    }
}

/**
    Errors loading an [`AppConfig`] file.
*/
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/**
    Everything configurable, as stored in a JSON config file.

    Missing sections and fields fall back to their defaults.

    ```json
    {
        "envelope": { "sample_budget": 50000 },
        "crop": { "format": "mov", "rebase_timestamps": true }
    }
    ```
*/
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub envelope: EnvelopeConfig,
    pub crop: CropConfig,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
