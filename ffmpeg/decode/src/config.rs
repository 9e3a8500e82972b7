/*!
    Decoder configuration.
*/

/**
    Configuration for an [`AudioDecoder`](crate::AudioDecoder).
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioDecoderConfig {
    /// Number of input slots that can be in flight at once.
    pub input_slots: usize,
    /// Number of decoded chunks the worker may queue before it waits.
    pub output_slots: usize,
    /// Capacity in bytes of each input slot.
    pub input_buffer_size: usize,
}

impl Default for AudioDecoderConfig {
    fn default() -> Self {
        Self {
            input_slots: 4,
            output_slots: 8,
            input_buffer_size: 64 * 1024,
        }
    }
}

impl AudioDecoderConfig {
    pub fn with_input_slots(mut self, slots: usize) -> Self {
        self.input_slots = slots.max(1);
        self
    }

    pub fn with_output_slots(mut self, slots: usize) -> Self {
        self.output_slots = slots.max(1);
        self
    }

    pub fn with_input_buffer_size(mut self, bytes: usize) -> Self {
        self.input_buffer_size = bytes;
        self
    }
}
