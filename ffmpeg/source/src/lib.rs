/*!
    Container reading and demuxing for the audiocrop media crates.

    This crate handles the input side of the pipeline. It opens a media file,
    describes its tracks, and hands out compressed samples of one selected
    track with their timestamps and flags. It also provides a lightweight
    probe for the total duration of a file.
*/

mod codec_config;
mod convert;
mod probe;
mod source;
mod track;

pub use codec_config::CodecConfig;
pub use convert::{codec_id_from_ffmpeg, sample_format_from_ffmpeg};
pub use probe::{probe, probe_duration};
pub use source::Source;
pub use track::TrackFormat;
