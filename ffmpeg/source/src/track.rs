/*!
    Track descriptors.
*/

use ffmpeg_next::format::stream::Stream;

use ffmpeg_types::{CodecId, MICROSECONDS, MediaType, Rational, mime_for};

use crate::codec_config::CodecConfig;
use crate::convert::{codec_id_from_ffmpeg, media_type_from_ffmpeg, rational_from_ffmpeg};

/**
    Description of one track in a container.

    Read once when the container is opened and never changed afterwards.
*/
#[derive(Clone, Debug)]
pub struct TrackFormat {
    /// Container-assigned track index.
    pub index: usize,
    /// MIME-style media type, e.g. `audio/mp4a-latm`.
    pub mime: String,
    /// Kind of media carried by the track.
    pub media_type: MediaType,
    /// Codec, if it is one we know by name.
    pub codec_id: Option<CodecId>,
    /// FFmpeg's name for the codec.
    pub codec_name: String,
    /// Time base of the track's native timestamps.
    pub time_base: Rational,
    /// Total duration in microseconds, if the container declares one.
    pub duration_us: Option<i64>,
    /// Sample rate in Hz (audio only).
    pub sample_rate: Option<u32>,
    /// Channel count (audio only).
    pub channels: Option<u16>,
    /// Bitrate in bits per second (if known).
    pub bitrate: Option<u64>,
    /// Decoder/muxer configuration.
    pub codec_config: CodecConfig,
}

impl TrackFormat {
    /**
        Build a track descriptor from a demuxer stream.

        `container_duration_us` is used when the stream itself does not
        declare a duration (common for raw ADTS streams).
    */
    pub(crate) fn from_stream(stream: &Stream, container_duration_us: Option<i64>) -> Self {
        let parameters = stream.parameters();
        let media_type = media_type_from_ffmpeg(parameters.medium());
        let ffmpeg_id = parameters.id();
        let codec_id = codec_id_from_ffmpeg(ffmpeg_id);
        let codec_name = ffmpeg_id.name().to_string();
        let time_base = rational_from_ffmpeg(stream.time_base());

        let duration_us = if stream.duration() > 0 && time_base.den != 0 {
            Some(time_base.rescale(stream.duration(), MICROSECONDS))
        } else {
            container_duration_us
        };

        // SAFETY: We're reading from a valid AVCodecParameters pointer that FFmpeg owns
        let (sample_rate, channels, bitrate) = unsafe {
            let ptr = parameters.as_ptr();

            let sample_rate = if media_type == MediaType::Audio && (*ptr).sample_rate > 0 {
                Some((*ptr).sample_rate as u32)
            } else {
                None
            };

            let channels = if media_type == MediaType::Audio && (*ptr).ch_layout.nb_channels > 0 {
                Some((*ptr).ch_layout.nb_channels as u16)
            } else {
                None
            };

            let bitrate = if (*ptr).bit_rate > 0 {
                Some((*ptr).bit_rate as u64)
            } else {
                None
            };

            (sample_rate, channels, bitrate)
        };

        Self {
            index: stream.index(),
            mime: mime_for(media_type, codec_id, &codec_name),
            media_type,
            codec_id,
            codec_name,
            time_base,
            duration_us,
            sample_rate,
            channels,
            bitrate,
            codec_config: CodecConfig::new(&parameters),
        }
    }

    pub fn is_audio(&self) -> bool {
        self.media_type == MediaType::Audio
    }
}
