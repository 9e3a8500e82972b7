/*!
    In-memory media used by the pipeline tests.
*/

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use ffmpeg_types::{
    BufferFlags, Error, InputBuffer, OutputBuffer, Result, SampleFlags, SeekMode,
};

use crate::media::{PcmDecoder, SampleSink, SampleSource};

#[derive(Clone, Debug, PartialEq)]
pub struct FakeTrack {
    pub mime: String,
    pub duration_us: Option<i64>,
}

impl FakeTrack {
    pub fn new(mime: &str, duration_us: Option<i64>) -> Self {
        Self {
            mime: mime.to_string(),
            duration_us,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FakeSample {
    pub time_us: i64,
    pub flags: SampleFlags,
    pub data: Vec<u8>,
}

/**
    Samples of the first audio track; other tracks have none.
*/
#[derive(Debug)]
pub struct FakeSource {
    pub tracks: Vec<FakeTrack>,
    pub samples: Vec<FakeSample>,
    pub selected: Option<usize>,
    pub cursor: usize,
    pub current: Option<usize>,
    pub seeks: Vec<i64>,
    pub released: bool,
}

impl FakeSource {
    pub fn new(tracks: Vec<FakeTrack>, samples: Vec<FakeSample>) -> Self {
        Self {
            tracks,
            samples,
            selected: None,
            cursor: 0,
            current: None,
            seeks: Vec::new(),
            released: false,
        }
    }

    /**
        One audio track of `count` samples spaced `interval_us` apart, with a
        sync point every `sync_every` samples. Each payload is the sample
        index as two little-endian PCM values.
    */
    pub fn audio(count: usize, interval_us: i64, sync_every: usize) -> Self {
        let samples = (0..count)
            .map(|i| {
                let value = i as i16;
                let mut data = Vec::new();
                data.extend_from_slice(&value.to_le_bytes());
                data.extend_from_slice(&(-value).to_le_bytes());
                FakeSample {
                    time_us: i as i64 * interval_us,
                    flags: if i % sync_every == 0 {
                        SampleFlags::SYNC
                    } else {
                        SampleFlags::empty()
                    },
                    data,
                }
            })
            .collect();
        let duration = Some(count as i64 * interval_us);
        Self::new(vec![FakeTrack::new("audio/raw", duration)], samples)
    }

    fn check(&self) -> Result<()> {
        if self.released {
            Err(Error::Released)
        } else {
            Ok(())
        }
    }
}

impl SampleSource for FakeSource {
    type Track = FakeTrack;

    fn track_mimes(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.mime.clone()).collect()
    }

    fn track_format(&self, index: usize) -> Result<&FakeTrack> {
        self.tracks.get(index).ok_or(Error::InvalidTrackIndex {
            index,
            count: self.tracks.len(),
        })
    }

    fn track_duration_us(&self, index: usize) -> Option<i64> {
        self.tracks.get(index).and_then(|t| t.duration_us)
    }

    fn select_track(&mut self, index: usize) -> Result<()> {
        self.check()?;
        self.track_format(index)?;
        self.selected = Some(index);
        Ok(())
    }

    fn read_sample(&mut self, buf: &mut Vec<u8>) -> Result<Option<usize>> {
        self.check()?;
        if self.selected.is_none() {
            return Ok(None);
        }
        match self.samples.get(self.cursor) {
            Some(sample) => {
                buf.clear();
                buf.extend_from_slice(&sample.data);
                self.current = Some(self.cursor);
                Ok(Some(sample.data.len()))
            }
            None => {
                self.current = None;
                Ok(None)
            }
        }
    }

    fn sample_time(&self) -> Option<i64> {
        self.current.map(|i| self.samples[i].time_us)
    }

    fn sample_flags(&self) -> SampleFlags {
        self.current
            .map(|i| self.samples[i].flags)
            .unwrap_or_default()
    }

    fn advance(&mut self) -> Result<bool> {
        self.check()?;
        self.cursor += 1;
        self.current = None;
        Ok(self.cursor < self.samples.len())
    }

    fn seek_to(&mut self, time_us: i64, mode: SeekMode) -> Result<()> {
        self.check()?;
        assert_eq!(mode, SeekMode::PreviousSync);
        self.seeks.push(time_us);

        let syncs = || {
            self.samples
                .iter()
                .enumerate()
                .filter(|(_, s)| s.flags.contains(SampleFlags::SYNC))
        };
        self.cursor = syncs()
            .filter(|(_, s)| s.time_us <= time_us)
            .map(|(i, _)| i)
            .last()
            .or_else(|| syncs().map(|(i, _)| i).next())
            .unwrap_or(0);
        self.current = None;
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[derive(Debug, Default)]
pub struct SinkLog {
    pub tracks: Vec<FakeTrack>,
    pub started: bool,
    pub written: Vec<(usize, Vec<u8>, i64, BufferFlags)>,
    pub stops: usize,
    pub released: bool,
    /// Released after `start` without a `stop` in between.
    pub released_unsealed: bool,
}

/**
    Records everything written; optionally fails on the nth write.

    Like the real sink, codec configuration samples are reported as not
    stored, and only `stop` seals the output.
*/
#[derive(Debug, Default)]
pub struct FakeSink {
    pub log: Rc<RefCell<SinkLog>>,
    pub fail_write_at: Option<usize>,
}

impl SampleSink<FakeTrack> for FakeSink {
    fn add_track(&mut self, track: &FakeTrack) -> Result<usize> {
        let mut log = self.log.borrow_mut();
        log.tracks.push(track.clone());
        Ok(log.tracks.len() - 1)
    }

    fn start(&mut self) -> Result<()> {
        self.log.borrow_mut().started = true;
        Ok(())
    }

    fn write_sample(
        &mut self,
        track: usize,
        data: &[u8],
        pts_us: i64,
        flags: BufferFlags,
    ) -> Result<bool> {
        let mut log = self.log.borrow_mut();
        if !log.started {
            return Err(Error::invalid_state("write before start"));
        }
        if self.fail_write_at == Some(log.written.len()) {
            return Err(Error::mux("disk full"));
        }
        log.written.push((track, data.to_vec(), pts_us, flags));
        Ok(!flags.contains(BufferFlags::CODEC_CONFIG))
    }

    fn stop(&mut self) -> Result<()> {
        self.log.borrow_mut().stops += 1;
        Ok(())
    }

    fn release(&mut self) {
        let mut log = self.log.borrow_mut();
        if !log.released && log.started && log.stops == 0 {
            log.released_unsealed = true;
        }
        log.released = true;
    }
}

/**
    Decodes little-endian 16-bit payloads as-is, one output chunk per input.

    At most `max_pending` chunks wait for the consumer before input slots
    stop being handed out.
*/
#[derive(Debug)]
pub struct FakeDecoder {
    pub pending: VecDeque<OutputBuffer>,
    pub max_pending: usize,
    pub emit_end_of_stream: bool,
    pub fail_configure: bool,
    pub fail_output_at: Option<usize>,
    pub configured: bool,
    pub started: bool,
    pub stopped: bool,
    pub released: bool,
    pub queued: usize,
    pub outputs: usize,
    pub recycled: usize,
}

impl Default for FakeDecoder {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            max_pending: 2,
            emit_end_of_stream: true,
            fail_configure: false,
            fail_output_at: None,
            configured: false,
            started: false,
            stopped: false,
            released: false,
            queued: 0,
            outputs: 0,
            recycled: 0,
        }
    }
}

impl PcmDecoder<FakeTrack> for FakeDecoder {
    fn configure(&mut self, track: &FakeTrack) -> Result<()> {
        if self.fail_configure {
            return Err(Error::unsupported_codec(track.mime.clone()));
        }
        self.configured = true;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if !self.configured {
            return Err(Error::invalid_state("start before configure"));
        }
        self.started = true;
        Ok(())
    }

    fn dequeue_input_buffer(&mut self, _timeout: Duration) -> Result<Option<InputBuffer>> {
        if self.pending.len() >= self.max_pending {
            return Ok(None);
        }
        Ok(Some(InputBuffer::new(self.queued, 64)))
    }

    fn queue_input_buffer(
        &mut self,
        slot: InputBuffer,
        pts_us: i64,
        flags: BufferFlags,
    ) -> Result<()> {
        self.queued += 1;
        if flags.contains(BufferFlags::END_OF_STREAM) {
            if self.emit_end_of_stream {
                self.pending.push_back(OutputBuffer::end_of_stream(self.queued));
            }
            return Ok(());
        }
        let samples = slot
            .data()
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        self.pending
            .push_back(OutputBuffer::new(self.queued, samples, 2, 8000, Some(pts_us)));
        Ok(())
    }

    fn dequeue_output_buffer(&mut self, _timeout: Duration) -> Result<Option<OutputBuffer>> {
        if self.fail_output_at == Some(self.outputs) {
            return Err(Error::codec("corrupt frame"));
        }
        let chunk = self.pending.pop_front();
        if chunk.is_some() {
            self.outputs += 1;
        }
        Ok(chunk)
    }

    fn release_output_buffer(&mut self, _chunk: OutputBuffer) {
        self.recycled += 1;
    }

    fn stop(&mut self) -> Result<()> {
        self.stopped = true;
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}
