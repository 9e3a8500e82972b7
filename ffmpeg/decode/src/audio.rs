/*!
    Audio decoder implementation.
*/

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use ffmpeg_next::{codec, ffi};
use tracing::{debug, warn};

use ffmpeg_source::TrackFormat;
use ffmpeg_types::{BufferFlags, Error, InputBuffer, OutputBuffer, Result};

use crate::config::AudioDecoderConfig;
use crate::worker::{CodecHandle, DecodeWorker, Submission};

/**
    Lifecycle of an [`AudioDecoder`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderState {
    Created,
    Configured,
    Running,
    Stopped,
    Released,
}

/**
    Channels and worker thread that exist only while the decoder runs.
*/
struct Running {
    free_slots: Receiver<InputBuffer>,
    submissions: Option<SyncSender<Submission>>,
    output: Receiver<Result<OutputBuffer>>,
    recycle: Sender<Vec<i16>>,
    worker: Option<JoinHandle<()>>,
    input_ended: bool,
    output_ended: bool,
}

/**
    Audio decoder driven through input and output buffer slots.

    The decoder moves through [`DecoderState`]: it is configured for one
    track, started, pumped, then stopped and released. While running, the
    codec lives on a worker thread; the caller exchanges data with it
    through two bounded queues:

    - input: [`dequeue_input_buffer`](Self::dequeue_input_buffer) hands out a
      free slot, [`queue_input_buffer`](Self::queue_input_buffer) submits it;
    - output: [`dequeue_output_buffer`](Self::dequeue_output_buffer) yields
      decoded PCM, [`release_output_buffer`](Self::release_output_buffer)
      returns the slot.

    Both dequeue calls wait at most the given timeout and return `None` when
    nothing is available, so a single loop can alternate between them without
    deadlocking on codec latency.

    # Example

    ```ignore
    let mut decoder = AudioDecoder::new(AudioDecoderConfig::default());
    decoder.configure(source.track_format(track)?)?;
    decoder.start()?;

    if let Some(mut slot) = decoder.dequeue_input_buffer(Duration::from_millis(10))? {
        slot.fill(&sample)?;
        decoder.queue_input_buffer(slot, pts_us, BufferFlags::empty())?;
    }
    if let Some(pcm) = decoder.dequeue_output_buffer(Duration::from_millis(10))? {
        consume(pcm.samples());
        decoder.release_output_buffer(pcm);
    }

    decoder.stop()?;
    decoder.release();
    ```
*/
pub struct AudioDecoder {
    config: AudioDecoderConfig,
    state: DecoderState,
    codec: Option<CodecHandle>,
    sample_rate: u32,
    channels: u16,
    running: Option<Running>,
}

impl AudioDecoder {
    /**
        Create an unconfigured decoder.
    */
    pub fn new(config: AudioDecoderConfig) -> Self {
        Self {
            config,
            state: DecoderState::Created,
            codec: None,
            sample_rate: 0,
            channels: 0,
            running: None,
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /**
        Sample rate declared by the configured track.
    */
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /**
        Channel count declared by the configured track.
    */
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /**
        Prepare the codec for `track`.

        Fails with [`Error::UnsupportedCodec`] when the track is not audio or
        no decoder for its codec is available.
    */
    pub fn configure(&mut self, track: &TrackFormat) -> Result<()> {
        match self.state {
            DecoderState::Created | DecoderState::Stopped => {}
            state => {
                return Err(Error::invalid_state(format!(
                    "configure called while {:?}",
                    state
                )));
            }
        }

        if !track.is_audio() {
            return Err(Error::unsupported_codec(format!(
                "track {} is {}, not audio",
                track.index, track.mime
            )));
        }

        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let mut context =
            codec::context::Context::from_parameters(track.codec_config.parameters().clone())
                .map_err(|e| Error::unsupported_codec(format!("{}: {}", track.mime, e)))?;

        // Input slots carry microsecond timestamps
        unsafe {
            (*context.as_mut_ptr()).pkt_timebase = ffi::AVRational {
                num: 1,
                den: 1_000_000,
            };
        }

        let decoder = context
            .decoder()
            .audio()
            .map_err(|e| Error::unsupported_codec(format!("{}: {}", track.mime, e)))?;

        self.sample_rate = decoder.rate();
        self.channels = decoder.ch_layout().channels() as u16;
        self.codec = Some(CodecHandle(decoder));
        self.state = DecoderState::Configured;

        debug!(
            track = track.index,
            mime = %track.mime,
            sample_rate = self.sample_rate,
            channels = self.channels,
            "configured"
        );
        Ok(())
    }

    /**
        Start the decode worker.
    */
    pub fn start(&mut self) -> Result<()> {
        if self.state != DecoderState::Configured {
            return Err(Error::invalid_state(format!(
                "start called while {:?}",
                self.state
            )));
        }
        let codec = self
            .codec
            .take()
            .ok_or_else(|| Error::invalid_state("no configured codec"))?;

        let (free_tx, free_rx) = mpsc::channel();
        for index in 0..self.config.input_slots.max(1) {
            let _ = free_tx.send(InputBuffer::new(index, self.config.input_buffer_size));
        }
        let (submit_tx, submit_rx) = mpsc::sync_channel(self.config.input_slots.max(1));
        let (output_tx, output_rx) = mpsc::sync_channel(self.config.output_slots.max(1));
        let (recycle_tx, recycle_rx) = mpsc::channel();

        let worker = DecodeWorker {
            codec,
            submissions: submit_rx,
            free_slots: free_tx,
            output: output_tx,
            recycled: recycle_rx,
            input_buffer_size: self.config.input_buffer_size,
        };

        let handle = thread::Builder::new()
            .name("audio-decode".to_string())
            .spawn(move || worker.run())?;

        self.running = Some(Running {
            free_slots: free_rx,
            submissions: Some(submit_tx),
            output: output_rx,
            recycle: recycle_tx,
            worker: Some(handle),
            input_ended: false,
            output_ended: false,
        });
        self.state = DecoderState::Running;
        Ok(())
    }

    /**
        Wait up to `timeout` for a free input slot.
    */
    pub fn dequeue_input_buffer(&mut self, timeout: Duration) -> Result<Option<InputBuffer>> {
        let running = self.running_mut("dequeue_input_buffer")?;
        if running.input_ended {
            return Err(Error::invalid_state("input already ended"));
        }

        match running.free_slots.recv_timeout(timeout) {
            Ok(slot) => Ok(Some(slot)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(Error::invalid_state("decode worker has exited"))
            }
        }
    }

    /**
        Submit a filled input slot.

        `pts_us` is the sample's original presentation time. Passing
        [`BufferFlags::END_OF_STREAM`] asks the codec to flush; no further
        input is accepted afterwards.
    */
    pub fn queue_input_buffer(
        &mut self,
        slot: InputBuffer,
        pts_us: i64,
        flags: BufferFlags,
    ) -> Result<()> {
        let running = self.running_mut("queue_input_buffer")?;
        if running.input_ended {
            return Err(Error::invalid_state("input already ended"));
        }
        if flags.contains(BufferFlags::END_OF_STREAM) {
            running.input_ended = true;
        }

        let sender = running
            .submissions
            .as_ref()
            .ok_or_else(|| Error::invalid_state("input queue closed"))?;

        // Never blocks for long: there are only as many slots as queue places
        sender
            .send(Submission {
                buffer: slot,
                pts_us,
                flags,
            })
            .map_err(|_| Error::invalid_state("decode worker has exited"))
    }

    /**
        Wait up to `timeout` for a chunk of decoded PCM.

        Decode failures raised on the worker surface here. After the
        end-of-stream chunk has been returned, this keeps returning `None`.
    */
    pub fn dequeue_output_buffer(&mut self, timeout: Duration) -> Result<Option<OutputBuffer>> {
        let running = self.running_mut("dequeue_output_buffer")?;
        if running.output_ended {
            return Ok(None);
        }

        match running.output.recv_timeout(timeout) {
            Ok(Ok(chunk)) => {
                if chunk.is_end_of_stream() {
                    running.output_ended = true;
                }
                Ok(Some(chunk))
            }
            Ok(Err(e)) => Err(e),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                running.output_ended = true;
                Ok(None)
            }
        }
    }

    /**
        Return an output slot so its storage can be reused.
    */
    pub fn release_output_buffer(&mut self, chunk: OutputBuffer) {
        if let Some(running) = self.running.as_ref() {
            // The worker may already have exited; the storage is simply dropped
            let _ = running.recycle.send(chunk.into_samples());
        }
    }

    /**
        Stop the decode worker.

        Idempotent. Pending output is discarded.
    */
    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            DecoderState::Stopped | DecoderState::Released => return Ok(()),
            _ => {}
        }

        if let Some(mut running) = self.running.take() {
            // Closing the submission queue ends the worker's receive loop;
            // draining output unblocks it if it is waiting for queue space.
            running.submissions = None;
            while running.output.recv().is_ok() {}

            if let Some(handle) = running.worker.take() {
                if handle.join().is_err() {
                    warn!("worker panicked");
                    self.codec = None;
                    self.state = DecoderState::Stopped;
                    return Err(Error::codec("decode worker panicked"));
                }
            }
        }

        self.codec = None;
        self.state = DecoderState::Stopped;
        debug!("stopped");
        Ok(())
    }

    /**
        Release all decoder resources.

        Idempotent; stops the decoder first if needed.
    */
    pub fn release(&mut self) {
        if self.state == DecoderState::Released {
            return;
        }
        if let Err(e) = self.stop() {
            warn!(error = %e, "stop during release failed");
        }
        self.state = DecoderState::Released;
    }

    fn running_mut(&mut self, operation: &str) -> Result<&mut Running> {
        let state = self.state;
        self.running
            .as_mut()
            .filter(|_| state == DecoderState::Running)
            .ok_or_else(|| Error::invalid_state(format!("{} called while {:?}", operation, state)))
    }
}

impl Drop for AudioDecoder {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for AudioDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDecoder")
            .field("state", &self.state)
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_decoder_is_created() {
        let decoder = AudioDecoder::new(AudioDecoderConfig::default());
        assert_eq!(decoder.state(), DecoderState::Created);
    }

    #[test]
    fn start_requires_configure() {
        let mut decoder = AudioDecoder::new(AudioDecoderConfig::default());
        assert!(matches!(decoder.start(), Err(Error::InvalidState(_))));
        assert_eq!(decoder.state(), DecoderState::Created);
    }

    #[test]
    fn slots_unavailable_before_start() {
        let mut decoder = AudioDecoder::new(AudioDecoderConfig::default());
        assert!(matches!(
            decoder.dequeue_input_buffer(Duration::from_millis(1)),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            decoder.dequeue_output_buffer(Duration::from_millis(1)),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            decoder.queue_input_buffer(InputBuffer::new(0, 16), 0, BufferFlags::empty()),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn stop_and_release_are_idempotent() {
        let mut decoder = AudioDecoder::new(AudioDecoderConfig::default());
        decoder.stop().unwrap();
        decoder.stop().unwrap();
        assert_eq!(decoder.state(), DecoderState::Stopped);

        decoder.release();
        decoder.release();
        assert_eq!(decoder.state(), DecoderState::Released);
        assert!(matches!(decoder.start(), Err(Error::InvalidState(_))));
    }
}
