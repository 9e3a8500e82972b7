/*!
    Waveform envelopes and lossless, sync-aligned cropping of compressed
    audio.

    Two operations sit on top of the `ffmpeg-*` crates:

    - [`extract_envelope`] decodes the first audio track of a file and
      summarizes up to a fixed number of PCM samples into a normalized
      amplitude [`Envelope`] for drawing a waveform;
    - [`crop_to_file`] copies the compressed samples between two positions
      into a new MPEG-4 container without re-encoding, starting at the sync
      point at or before the requested start.

    Both also run on a background thread through [`spawn_envelope`] and
    [`spawn_crop`].
*/

mod cancel;
mod config;
mod crop;
mod envelope;
mod error;
mod job;
pub mod logging;
mod media;
mod waveform;

#[cfg(test)]
mod fakes;

pub use cancel::CancelToken;
pub use config::{AppConfig, ConfigError, CropConfig, DEFAULT_SAMPLE_BUDGET, EnvelopeConfig};
pub use crop::{CropReport, CropWindow, crop_to_file, crop_to_file_with};
pub use envelope::{EnvelopeResult, extract_envelope, probe_duration_ms, try_extract_envelope};
pub use error::{CropError, EnvelopeError};
pub use job::{Job, spawn_crop, spawn_envelope};
pub use media::{PcmDecoder, SampleSink, SampleSource};
pub use waveform::{ENVELOPE_SCALE, Envelope, WaveformSummarizer};

pub use ffmpeg_sink::ContainerFormat;
pub use ffmpeg_source::probe;
pub use ffmpeg_types::MediaInfo;
