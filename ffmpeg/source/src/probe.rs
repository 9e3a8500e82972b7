/*!
    Probing functionality for extracting media metadata.
*/

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{codec, format::context::Input as InputContext};
use tracing::warn;

use ffmpeg_types::{AudioStreamInfo, ChannelLayout, MediaInfo, Result, select_audio_track};

use crate::convert::sample_format_from_ffmpeg;
use crate::source::open_input;
use crate::track::TrackFormat;

/**
    Probe a media file for its duration and audio stream details.

    Uses its own short-lived handle, independent of any open [`Source`](crate::Source),
    and releases it before returning.

    # Example

    ```ignore
    let info = probe("input.aac")?;
    if let Some(audio) = &info.audio {
        println!("{} Hz, {} channels", audio.sample_rate, audio.channel_count());
    }
    ```
*/
pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaInfo> {
    let input_ctx = open_input(path.as_ref())?;
    Ok(extract_media_info(&input_ctx))
}

/**
    Total duration of a media file, or zero if it cannot be determined.

    Never fails: the duration is advisory, so an unreadable file simply
    reports zero.
*/
pub fn probe_duration<P: AsRef<Path>>(path: P) -> Duration {
    let path = path.as_ref();
    match probe(path) {
        Ok(info) => info.duration.unwrap_or_default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "duration probe failed");
            Duration::ZERO
        }
    }
}

/**
    Extract MediaInfo from an already-opened input context.
*/
fn extract_media_info(input_ctx: &InputContext) -> MediaInfo {
    let container_duration_us = (input_ctx.duration() > 0).then(|| input_ctx.duration());
    let tracks: Vec<TrackFormat> = input_ctx
        .streams()
        .map(|stream| TrackFormat::from_stream(&stream, container_duration_us))
        .collect();

    let audio = select_audio_track(tracks.iter().map(|t| t.mime.as_str()))
        .map(|index| audio_stream_info(&tracks[index]));

    // Container duration first, then the audio track's own
    let duration = container_duration_us
        .or_else(|| tracks.iter().find_map(|t| t.duration_us))
        .map(|us| Duration::from_micros(us.max(0) as u64));

    MediaInfo {
        duration,
        track_count: tracks.len(),
        audio,
    }
}

/**
    Describe an audio track, opening a decoder context only to learn the
    decoded sample format.
*/
fn audio_stream_info(track: &TrackFormat) -> AudioStreamInfo {
    let sample_format = codec::context::Context::from_parameters(
        track.codec_config.parameters().clone(),
    )
    .ok()
    .and_then(|ctx| ctx.decoder().audio().ok())
    .and_then(|decoder| sample_format_from_ffmpeg(decoder.format()));

    AudioStreamInfo {
        index: track.index,
        sample_rate: track.sample_rate.unwrap_or(0),
        channels: ChannelLayout::from_count(track.channels.unwrap_or(0)),
        sample_format,
        time_base: track.time_base,
        duration: track
            .duration_us
            .map(|us| Duration::from_micros(us.max(0) as u64)),
        codec_id: track.codec_id,
        codec_name: track.codec_name.clone(),
        bitrate: track.bitrate,
    }
}
