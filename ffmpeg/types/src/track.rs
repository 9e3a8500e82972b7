/*!
    Track selection.
*/

use crate::{CodecId, MediaType};

/**
    MIME prefix shared by every audio track.
*/
pub const AUDIO_MIME_PREFIX: &str = "audio/";

/**
    Return the index of the first track whose MIME type is audio.

    Tracks are identified by position, matching the container's own
    numbering. `None` means the container carries no audio at all, which
    callers treat as an ordinary outcome.
*/
pub fn select_audio_track<I, S>(mimes: I) -> Option<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    mimes
        .into_iter()
        .position(|mime| mime.as_ref().starts_with(AUDIO_MIME_PREFIX))
}

/**
    Build the MIME type describing a track.

    Known codecs use their conventional MIME type; anything else is named
    after the codec under the media kind's prefix.
*/
pub fn mime_for(media_type: MediaType, codec: Option<CodecId>, codec_name: &str) -> String {
    match codec {
        Some(id) if id.is_audio() == (media_type == MediaType::Audio) => id.mime().to_string(),
        _ => format!("{}/{}", media_type.mime_prefix(), codec_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_lowest_audio_index() {
        let mimes = ["video/avc", "audio/mp4a-latm", "audio/opus"];
        assert_eq!(select_audio_track(mimes), Some(1));
    }

    #[test]
    fn first_track_audio() {
        assert_eq!(select_audio_track(["audio/mpeg"]), Some(0));
    }

    #[test]
    fn none_for_video_only_or_empty() {
        assert_eq!(select_audio_track(["video/avc", "video/hevc"]), None);
        assert_eq!(select_audio_track(Vec::<String>::new()), None);
    }

    #[test]
    fn prefix_must_lead() {
        assert_eq!(select_audio_track(["application/audio/x", "text/vtt"]), None);
    }

    #[test]
    fn mime_for_known_and_unknown_codecs() {
        assert_eq!(
            mime_for(MediaType::Audio, Some(CodecId::Aac), "aac"),
            "audio/mp4a-latm"
        );
        assert_eq!(mime_for(MediaType::Audio, None, "alac"), "audio/alac");
        assert_eq!(mime_for(MediaType::Data, None, "bin_data"), "application/bin_data");
    }
}
