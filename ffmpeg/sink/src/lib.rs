/*!
    Media output and muxing for the audiocrop media crates.

    This crate handles the output side of the pipeline. It takes compressed
    samples exactly as the [`Source`](ffmpeg_source::Source) produced them and
    writes them into an MPEG-4 family container without touching the codec
    data.
*/

mod config;
mod sink;

pub use config::{ContainerFormat, SinkConfig};
pub use sink::{Sink, SinkState};
