/*!
    Seams between the pipelines and the media crates.

    The envelope and crop pipelines are written against these traits; the
    FFmpeg-backed [`Source`], [`AudioDecoder`] and [`Sink`] implement them.
*/

use std::time::Duration;

use ffmpeg_decode::AudioDecoder;
use ffmpeg_sink::Sink;
use ffmpeg_source::{Source, TrackFormat};
use ffmpeg_types::{BufferFlags, InputBuffer, OutputBuffer, Result, SampleFlags, SeekMode};

/**
    Sequential reader of compressed samples.
*/
pub trait SampleSource {
    /// Track description handed to decoders and sinks.
    type Track;

    /// Media-type string of every track, in container order.
    fn track_mimes(&self) -> Vec<String>;
    fn track_format(&self, index: usize) -> Result<&Self::Track>;
    /// Declared duration of a track in microseconds, if known.
    fn track_duration_us(&self, index: usize) -> Option<i64>;
    fn select_track(&mut self, index: usize) -> Result<()>;
    fn read_sample(&mut self, buf: &mut Vec<u8>) -> Result<Option<usize>>;
    fn sample_time(&self) -> Option<i64>;
    fn sample_flags(&self) -> SampleFlags;
    fn advance(&mut self) -> Result<bool>;
    fn seek_to(&mut self, time_us: i64, mode: SeekMode) -> Result<()>;
    fn release(&mut self);
}

/**
    Decoder fed through bounded input and output slots.
*/
pub trait PcmDecoder<T> {
    fn configure(&mut self, track: &T) -> Result<()>;
    fn start(&mut self) -> Result<()>;
    fn dequeue_input_buffer(&mut self, timeout: Duration) -> Result<Option<InputBuffer>>;
    fn queue_input_buffer(&mut self, slot: InputBuffer, pts_us: i64, flags: BufferFlags)
    -> Result<()>;
    fn dequeue_output_buffer(&mut self, timeout: Duration) -> Result<Option<OutputBuffer>>;
    fn release_output_buffer(&mut self, chunk: OutputBuffer);
    fn stop(&mut self) -> Result<()>;
    fn release(&mut self);
}

/**
    Writer of compressed samples into an output container.
*/
pub trait SampleSink<T> {
    fn add_track(&mut self, track: &T) -> Result<usize>;
    fn start(&mut self) -> Result<()>;
    /// Returns false when the sample was accepted but not stored, as for
    /// codec configuration samples.
    fn write_sample(
        &mut self,
        track: usize,
        data: &[u8],
        pts_us: i64,
        flags: BufferFlags,
    ) -> Result<bool>;
    /// Seal the container. Only called once every sample is in.
    fn stop(&mut self) -> Result<()>;
    /// Close without sealing unless `stop` already ran.
    fn release(&mut self);
}

impl SampleSource for Source {
    type Track = TrackFormat;

    fn track_mimes(&self) -> Vec<String> {
        self.tracks().iter().map(|t| t.mime.clone()).collect()
    }

    fn track_format(&self, index: usize) -> Result<&TrackFormat> {
        Source::track_format(self, index)
    }

    fn track_duration_us(&self, index: usize) -> Option<i64> {
        self.tracks().get(index).and_then(|t| t.duration_us)
    }

    fn select_track(&mut self, index: usize) -> Result<()> {
        Source::select_track(self, index)
    }

    fn read_sample(&mut self, buf: &mut Vec<u8>) -> Result<Option<usize>> {
        Source::read_sample(self, buf)
    }

    fn sample_time(&self) -> Option<i64> {
        Source::sample_time(self)
    }

    fn sample_flags(&self) -> SampleFlags {
        Source::sample_flags(self)
    }

    fn advance(&mut self) -> Result<bool> {
        Source::advance(self)
    }

    fn seek_to(&mut self, time_us: i64, mode: SeekMode) -> Result<()> {
        Source::seek_to(self, time_us, mode)
    }

    fn release(&mut self) {
        Source::release(self)
    }
}

impl PcmDecoder<TrackFormat> for AudioDecoder {
    fn configure(&mut self, track: &TrackFormat) -> Result<()> {
        AudioDecoder::configure(self, track)
    }

    fn start(&mut self) -> Result<()> {
        AudioDecoder::start(self)
    }

    fn dequeue_input_buffer(&mut self, timeout: Duration) -> Result<Option<InputBuffer>> {
        AudioDecoder::dequeue_input_buffer(self, timeout)
    }

    fn queue_input_buffer(
        &mut self,
        slot: InputBuffer,
        pts_us: i64,
        flags: BufferFlags,
    ) -> Result<()> {
        AudioDecoder::queue_input_buffer(self, slot, pts_us, flags)
    }

    fn dequeue_output_buffer(&mut self, timeout: Duration) -> Result<Option<OutputBuffer>> {
        AudioDecoder::dequeue_output_buffer(self, timeout)
    }

    fn release_output_buffer(&mut self, chunk: OutputBuffer) {
        AudioDecoder::release_output_buffer(self, chunk)
    }

    fn stop(&mut self) -> Result<()> {
        AudioDecoder::stop(self)
    }

    fn release(&mut self) {
        AudioDecoder::release(self)
    }
}

impl SampleSink<TrackFormat> for Sink {
    fn add_track(&mut self, track: &TrackFormat) -> Result<usize> {
        Sink::add_track(self, track)
    }

    fn start(&mut self) -> Result<()> {
        Sink::start(self)
    }

    fn write_sample(
        &mut self,
        track: usize,
        data: &[u8],
        pts_us: i64,
        flags: BufferFlags,
    ) -> Result<bool> {
        Sink::write_sample(self, track, data, pts_us, flags)
    }

    fn stop(&mut self) -> Result<()> {
        Sink::stop(self)
    }

    fn release(&mut self) {
        Sink::release(self)
    }
}
