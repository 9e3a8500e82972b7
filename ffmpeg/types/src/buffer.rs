/*!
    Decoder buffer slots.

    Slots are owned values: a caller holds an [`InputBuffer`] between
    dequeuing and queuing it, and an [`OutputBuffer`] between dequeuing and
    releasing it. Once handed back, the slot cannot be touched again.
*/

use crate::{BufferFlags, Error, Result};

/**
    A decoder input slot that receives one compressed sample.
*/
#[derive(Debug)]
pub struct InputBuffer {
    index: usize,
    data: Vec<u8>,
    capacity: usize,
}

impl InputBuffer {
    pub fn new(index: usize, capacity: usize) -> Self {
        Self {
            index,
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /**
        Reuse existing storage for a slot.
    */
    pub fn from_storage(index: usize, mut data: Vec<u8>, capacity: usize) -> Self {
        data.clear();
        Self {
            index,
            data,
            capacity,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /**
        Replace the slot contents with `bytes`.

        Fails if the sample does not fit in the slot.
    */
    pub fn fill(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.capacity {
            return Err(Error::invalid_data(format!(
                "sample of {} bytes exceeds input slot capacity {}",
                bytes.len(),
                self.capacity
            )));
        }
        self.data.clear();
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /**
        Take the slot's storage, leaving the slot consumed.
    */
    pub fn into_storage(self) -> Vec<u8> {
        self.data
    }
}

/**
    A decoder output slot holding one chunk of interleaved PCM.
*/
#[derive(Debug)]
pub struct OutputBuffer {
    index: usize,
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
    pts_us: Option<i64>,
    flags: BufferFlags,
}

impl OutputBuffer {
    pub fn new(
        index: usize,
        samples: Vec<i16>,
        channels: u16,
        sample_rate: u32,
        pts_us: Option<i64>,
    ) -> Self {
        Self {
            index,
            samples,
            channels,
            sample_rate,
            pts_us,
            flags: BufferFlags::empty(),
        }
    }

    /**
        An empty slot marking that the decoder has emitted all its output.
    */
    pub fn end_of_stream(index: usize) -> Self {
        Self {
            index,
            samples: Vec::new(),
            channels: 0,
            sample_rate: 0,
            pts_us: None,
            flags: BufferFlags::END_OF_STREAM,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Interleaved samples, `channels` values per frame.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn pts_us(&self) -> Option<i64> {
        self.pts_us
    }

    pub fn flags(&self) -> BufferFlags {
        self.flags
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.flags.contains(BufferFlags::END_OF_STREAM)
    }

    /**
        Number of sample frames (one sample per channel) in this chunk.
    */
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            channels => self.samples.len() / channels as usize,
        }
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}
