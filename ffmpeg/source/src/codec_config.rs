/*!
    Opaque codec configuration for passing to decoders and muxers.
*/

use ffmpeg_next::codec;

/**
    Opaque codec configuration extracted from a source track.

    This holds the codec parameters (including extradata such as the AAC
    AudioSpecificConfig) needed to create a decoder for the track or to
    declare an identical track in an output container.
*/
pub struct CodecConfig {
    parameters: codec::Parameters,
}

impl CodecConfig {
    /**
        Create a codec config holding an independent copy of `parameters`.
    */
    pub(crate) fn new(parameters: &codec::Parameters) -> Self {
        Self {
            parameters: parameters.clone(),
        }
    }

    /**
        Borrow the raw codec parameters.
    */
    pub fn parameters(&self) -> &codec::Parameters {
        &self.parameters
    }
}

impl Clone for CodecConfig {
    fn clone(&self) -> Self {
        Self::new(&self.parameters)
    }
}

impl std::fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecConfig")
            .field("codec_id", &self.parameters.id())
            .finish_non_exhaustive()
    }
}
