/*!
    Error type shared by the media crates.
*/

use thiserror::Error;

/**
    Result alias used throughout the media crates.
*/
pub type Result<T, E = Error> = std::result::Result<T, E>;

/**
    Errors produced while reading, decoding or writing media.

    Reaching the end of a stream is not an error; readers and decoders
    report it as `Ok(None)` or through an end-of-stream flag.
*/
#[derive(Debug, Error)]
pub enum Error {
    #[error("unreadable container: {0}")]
    UnreadableContainer(String),

    #[error("track index {index} out of range ({count} tracks)")]
    InvalidTrackIndex { index: usize, count: usize },

    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("handle already released")]
    Released,

    #[error("codec error: {0}")]
    Codec(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("mux error: {0}")]
    Mux(String),
}

impl Error {
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Self::UnreadableContainer(msg.into())
    }

    pub fn unsupported_codec(msg: impl Into<String>) -> Self {
        Self::UnsupportedCodec(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }
}
