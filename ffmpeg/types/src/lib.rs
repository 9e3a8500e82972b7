/*!
    Shared types for the audiocrop media crates.

    This crate defines the vocabulary that crosses crate boundaries: errors,
    timestamps, sample and buffer flags, PCM buffers and track selection.
    It has no dependency on FFmpeg, so the pipeline logic built on top of it
    can be exercised without FFmpeg installed.
*/

mod buffer;
mod error;
mod flags;
mod format;
mod stream;
mod time;
mod track;

pub use buffer::{InputBuffer, OutputBuffer};
pub use error::{Error, Result};
pub use flags::{BufferFlags, SampleFlags};
pub use format::{ChannelLayout, CodecId, MediaType, SampleFormat};
pub use stream::{AudioStreamInfo, MediaInfo};
pub use time::{MICROSECONDS, Rational, SeekMode, millis_to_micros};
pub use track::{AUDIO_MIME_PREFIX, mime_for, select_audio_track};
