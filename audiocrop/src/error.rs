use thiserror::Error;

/**
    Errors returned by [`crop_to_file`](crate::crop_to_file).
*/
#[derive(Debug, Error)]
pub enum CropError {
    #[error("input has no audio track")]
    NoAudioTrack,
    #[error("crop window is empty: start {start_us} us is not before end {end_us} us")]
    EmptyWindow { start_us: i64, end_us: i64 },
    /// The input could not be opened or inspected. No output was created.
    #[error("failed to read input: {0}")]
    Source(#[source] ffmpeg_types::Error),
    /// Anything that went wrong once the output existed.
    #[error("failed to write output: {0}")]
    Mux(#[source] ffmpeg_types::Error),
    #[error("crop cancelled")]
    Cancelled,
}

/**
    Errors returned by [`try_extract_envelope`](crate::try_extract_envelope).
*/
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("input has no audio track")]
    NoAudioTrack,
    #[error("failed to read input: {0}")]
    Source(#[source] ffmpeg_types::Error),
    #[error("failed to decode audio: {0}")]
    Decode(#[source] ffmpeg_types::Error),
    #[error("envelope extraction cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = CropError::EmptyWindow {
            start_us: 5_000_000,
            end_us: 4_000_000,
        };
        assert_eq!(
            err.to_string(),
            "crop window is empty: start 5000000 us is not before end 4000000 us"
        );

        let err = EnvelopeError::Decode(ffmpeg_types::Error::codec("bad frame"));
        assert!(err.to_string().starts_with("failed to decode audio"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
