/*!
    Audio decoding for the audiocrop media crates.

    This crate turns compressed audio samples into interleaved 16-bit PCM.
    The decoder is driven through input and output buffer slots that are
    acquired with a bounded wait, so a caller can pump it from a single
    loop without ever blocking indefinitely on codec latency.
*/

mod audio;
mod config;
mod pcm;
mod worker;

pub use audio::{AudioDecoder, DecoderState};
pub use config::AudioDecoderConfig;
pub use pcm::samples_to_i16;
