/*!
    Stream information types.
*/

use std::time::Duration;

use crate::{ChannelLayout, CodecId, Rational, SampleFormat};

/**
    Information about an audio stream.
*/
#[derive(Clone, Debug)]
pub struct AudioStreamInfo {
    /// Container-assigned track index.
    pub index: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel layout.
    pub channels: ChannelLayout,
    /// Decoded sample format, when a decoder for the codec is available.
    pub sample_format: Option<SampleFormat>,
    /// Time base for timestamps.
    pub time_base: Rational,
    /// Total duration (may be unavailable for some streams).
    pub duration: Option<Duration>,
    /// Codec used, if it is one we know by name.
    pub codec_id: Option<CodecId>,
    /// FFmpeg's name for the codec.
    pub codec_name: String,
    /// Bitrate in bits per second (if known).
    pub bitrate: Option<u64>,
}

impl AudioStreamInfo {
    /**
        Returns the number of channels.
    */
    pub fn channel_count(&self) -> u16 {
        self.channels.channels()
    }
}

/**
    Combined information about a media file.
*/
#[derive(Clone, Debug, Default)]
pub struct MediaInfo {
    /// Total duration of the media (may be unavailable).
    pub duration: Option<Duration>,
    /// Number of tracks in the container.
    pub track_count: usize,
    /// First audio stream, if any.
    pub audio: Option<AudioStreamInfo>,
}

impl MediaInfo {
    /**
        Returns true if this media has audio.
    */
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /**
        Total duration in whole milliseconds, 0 when unknown.
    */
    pub fn duration_ms(&self) -> u64 {
        self.duration.map_or(0, |d| d.as_millis() as u64)
    }
}
