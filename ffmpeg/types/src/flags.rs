/*!
    Per-sample flags on the demux side and per-buffer flags on the
    decode/mux side.
*/

use bitflags::bitflags;

bitflags! {
    /**
        Flags attached to a compressed sample read from a container.
    */
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SampleFlags: u32 {
        /// The sample can be decoded without any earlier sample.
        const SYNC = 1 << 0;
        /// The sample payload is encrypted.
        const ENCRYPTED = 1 << 1;
        /// The sample holds only part of a frame.
        const PARTIAL = 1 << 2;
    }
}

bitflags! {
    /**
        Flags attached to a buffer handed to a decoder or written to a muxer.
    */
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BufferFlags: u32 {
        /// The buffer starts a key frame.
        const KEY_FRAME = 1 << 0;
        /// The buffer carries codec configuration rather than media data.
        const CODEC_CONFIG = 1 << 1;
        /// The buffer holds only part of a frame.
        const PARTIAL_FRAME = 1 << 2;
        /// No further buffers follow.
        const END_OF_STREAM = 1 << 3;
    }
}

impl BufferFlags {
    /**
        Map demux-side sample flags onto mux-side buffer flags.

        Exactly one flag is carried over. Sync wins over encrypted, which
        wins over partial; encrypted samples are tagged as codec config.
    */
    pub fn from_sample_flags(flags: SampleFlags) -> Self {
        if flags.contains(SampleFlags::SYNC) {
            Self::KEY_FRAME
        } else if flags.contains(SampleFlags::ENCRYPTED) {
            Self::CODEC_CONFIG
        } else if flags.contains(SampleFlags::PARTIAL) {
            Self::PARTIAL_FRAME
        } else {
            Self::empty()
        }
    }
}

impl From<SampleFlags> for BufferFlags {
    fn from(flags: SampleFlags) -> Self {
        Self::from_sample_flags(flags)
    }
}
