/*!
    Conversion utilities between ffmpeg-next types and ffmpeg-types.
*/

use ffmpeg_next::codec::packet::side_data::Type as SideDataType;

use ffmpeg_types::{CodecId, MediaType, Rational, SampleFlags, SampleFormat};

/**
    Convert ffmpeg_next::Rational to our Rational.
*/
pub(crate) fn rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Rational {
    Rational::new(r.numerator(), r.denominator())
}

/**
    Convert ffmpeg_next sample format to our SampleFormat.
*/
pub fn sample_format_from_ffmpeg(format: ffmpeg_next::format::Sample) -> Option<SampleFormat> {
    use ffmpeg_next::format::Sample;

    match format {
        Sample::F32(_) => Some(SampleFormat::F32),
        Sample::F64(_) => Some(SampleFormat::F64),
        Sample::I16(_) => Some(SampleFormat::S16),
        Sample::I32(_) => Some(SampleFormat::S32),
        Sample::U8(_) => Some(SampleFormat::U8),
        _ => None,
    }
}

/**
    Convert ffmpeg_next codec ID to our CodecId.
*/
pub fn codec_id_from_ffmpeg(id: ffmpeg_next::codec::Id) -> Option<CodecId> {
    use ffmpeg_next::codec::Id;

    match id {
        // Audio
        Id::AAC => Some(CodecId::Aac),
        Id::MP3 => Some(CodecId::Mp3),
        Id::OPUS => Some(CodecId::Opus),
        Id::VORBIS => Some(CodecId::Vorbis),
        Id::FLAC => Some(CodecId::Flac),
        Id::AC3 => Some(CodecId::Ac3),
        Id::PCM_S16LE => Some(CodecId::PcmS16Le),
        Id::PCM_S16BE => Some(CodecId::PcmS16Be),
        Id::PCM_F32LE => Some(CodecId::PcmF32Le),
        // Video
        Id::H264 => Some(CodecId::H264),
        Id::HEVC => Some(CodecId::H265),
        Id::VP8 => Some(CodecId::Vp8),
        Id::VP9 => Some(CodecId::Vp9),
        Id::AV1 => Some(CodecId::Av1),
        _ => None,
    }
}

/**
    Convert an FFmpeg media type to our MediaType.
*/
pub(crate) fn media_type_from_ffmpeg(medium: ffmpeg_next::media::Type) -> MediaType {
    use ffmpeg_next::media::Type;

    match medium {
        Type::Audio => MediaType::Audio,
        Type::Video => MediaType::Video,
        Type::Subtitle => MediaType::Subtitle,
        Type::Data | Type::Attachment => MediaType::Data,
        Type::Unknown => MediaType::Unknown,
    }
}

/**
    Derive sample flags from a demuxed packet.

    FFmpeg has no notion of partial frames at the demux level, so
    `SampleFlags::PARTIAL` is never set here.
*/
pub(crate) fn sample_flags_from_packet(packet: &ffmpeg_next::Packet) -> SampleFlags {
    let mut flags = SampleFlags::empty();

    if packet.is_key() {
        flags |= SampleFlags::SYNC;
    }

    if packet
        .side_data()
        .any(|side| side.kind() == SideDataType::EncryptionInfo)
    {
        flags |= SampleFlags::ENCRYPTED;
    }

    flags
}
