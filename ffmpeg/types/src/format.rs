/*!
    Media kinds, codec identifiers and PCM sample formats.
*/

/**
    Kind of media carried by a track.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    Audio,
    Video,
    Subtitle,
    Data,
    Unknown,
}

impl MediaType {
    /**
        Returns the top-level MIME type for this kind of media.
    */
    pub const fn mime_prefix(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Subtitle => "text",
            Self::Data | Self::Unknown => "application",
        }
    }
}

/**
    Codecs the media crates know by name.

    Anything else is still demuxed and copied; it just has no dedicated
    identifier and is described by FFmpeg's codec name instead.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    // Audio
    Aac,
    Mp3,
    Opus,
    Vorbis,
    Flac,
    Ac3,
    PcmS16Le,
    PcmS16Be,
    PcmF32Le,
    // Video
    H264,
    H265,
    Vp8,
    Vp9,
    Av1,
}

impl CodecId {
    /**
        Returns the MIME type conventionally used for this codec.
    */
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Aac => "audio/mp4a-latm",
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Vorbis => "audio/vorbis",
            Self::Flac => "audio/flac",
            Self::Ac3 => "audio/ac3",
            Self::PcmS16Le | Self::PcmS16Be | Self::PcmF32Le => "audio/raw",
            Self::H264 => "video/avc",
            Self::H265 => "video/hevc",
            Self::Vp8 => "video/x-vnd.on2.vp8",
            Self::Vp9 => "video/x-vnd.on2.vp9",
            Self::Av1 => "video/av01",
        }
    }

    pub const fn is_audio(self) -> bool {
        !matches!(
            self,
            Self::H264 | Self::H265 | Self::Vp8 | Self::Vp9 | Self::Av1
        )
    }
}

/**
    Audio sample formats.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// 32-bit floating point, range [-1.0, 1.0]
    F32,
    /// 64-bit floating point
    F64,
    /// Signed 16-bit integer
    S16,
    /// Signed 32-bit integer
    S32,
    /// Unsigned 8-bit integer
    U8,
}

impl SampleFormat {
    /**
        Returns the number of bytes per sample.
    */
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::S16 => 2,
            Self::S32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    /**
        Returns true if this is a floating-point format.
    */
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

/**
    Audio channel layout.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ChannelLayout {
    Mono,
    Stereo,
    /// 5.1 surround (FL, FR, FC, LFE, BL, BR)
    Surround5_1,
    /// 7.1 surround (FL, FR, FC, LFE, BL, BR, SL, SR)
    Surround7_1,
    /// Any other channel count.
    Other(u16),
}

impl ChannelLayout {
    /**
        Returns the number of channels.
    */
    pub const fn channels(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::Surround5_1 => 6,
            Self::Surround7_1 => 8,
            Self::Other(count) => count,
        }
    }

    pub const fn from_count(count: u16) -> Self {
        match count {
            1 => Self::Mono,
            2 => Self::Stereo,
            6 => Self::Surround5_1,
            8 => Self::Surround7_1,
            _ => Self::Other(count),
        }
    }
}
