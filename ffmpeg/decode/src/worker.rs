/*!
    Decode worker thread.

    The worker owns the FFmpeg codec context. It receives filled input slots,
    feeds them to the codec, hands the emptied slots back to the free pool,
    and pushes decoded PCM chunks into the bounded output queue.
*/

use std::sync::mpsc::{Receiver, Sender, SyncSender};

use ffmpeg_next::{
    codec::decoder::Audio as AudioDecoderFFmpeg, ffi,
    util::frame::audio::Audio as AudioFrameFFmpeg,
};
use tracing::{debug, warn};

use ffmpeg_source::sample_format_from_ffmpeg;
use ffmpeg_types::{BufferFlags, Error, InputBuffer, OutputBuffer, Result};

use crate::pcm::{copy_audio_data, samples_to_i16};

/**
    A filled input slot on its way to the worker.
*/
pub(crate) struct Submission {
    pub buffer: InputBuffer,
    pub pts_us: i64,
    pub flags: BufferFlags,
}

/**
    Codec context handed to the worker thread.
*/
pub(crate) struct CodecHandle(pub AudioDecoderFFmpeg);

// SAFETY: the context is built from an owned copy of the codec parameters,
// so it holds no reference back to the demuxer, and after start() only the
// worker thread ever touches it.
unsafe impl Send for CodecHandle {}

pub(crate) struct DecodeWorker {
    pub codec: CodecHandle,
    pub submissions: Receiver<Submission>,
    pub free_slots: Sender<InputBuffer>,
    pub output: SyncSender<Result<OutputBuffer>>,
    pub recycled: Receiver<Vec<i16>>,
    pub input_buffer_size: usize,
}

impl DecodeWorker {
    /**
        Run until the submission queue closes or the consumer goes away.
    */
    pub fn run(mut self) {
        let mut next_index = 0usize;

        while let Ok(submission) = self.submissions.recv() {
            let end_of_stream = submission.flags.contains(BufferFlags::END_OF_STREAM);
            let packet = make_packet(&submission);

            let index = submission.buffer.index();
            let storage = submission.buffer.into_storage();
            // The pool only closes once the decoder is stopping
            let _ = self.free_slots.send(InputBuffer::from_storage(
                index,
                storage,
                self.input_buffer_size,
            ));

            let delivered = match packet {
                Some(packet) => self.send_packet(&packet, &mut next_index),
                None => true,
            };
            if !delivered {
                return;
            }

            if end_of_stream {
                if self.flush(&mut next_index) {
                    let _ = self.output.send(Ok(OutputBuffer::end_of_stream(next_index)));
                }
                debug!("end of stream reached");
                return;
            }
        }
    }

    /**
        Send one packet, draining frames when the codec pushes back.

        Returns false when the consumer is gone.
    */
    fn send_packet(&mut self, packet: &ffmpeg_next::Packet, next_index: &mut usize) -> bool {
        let mut retried = false;
        loop {
            match self.codec.0.send_packet(packet) {
                Ok(()) => return self.drain(next_index),
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN && !retried => {
                    // Decoder buffer full - drain frames first, then retry once
                    if !self.drain(next_index) {
                        return false;
                    }
                    retried = true;
                }
                Err(e) => {
                    // A corrupt packet should not end the whole decode
                    warn!(error = %e, "packet rejected");
                    return true;
                }
            }
        }
    }

    fn flush(&mut self, next_index: &mut usize) -> bool {
        match self.codec.0.send_eof() {
            Ok(()) | Err(ffmpeg_next::Error::Eof) => {}
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                if !self.drain(next_index) {
                    return false;
                }
                let _ = self.codec.0.send_eof();
            }
            Err(e) => {
                return self
                    .output
                    .send(Err(Error::codec(format!("flush failed: {}", e))))
                    .is_ok();
            }
        }
        self.drain(next_index)
    }

    /**
        Receive every frame the codec has ready and queue it for the consumer.
    */
    fn drain(&mut self, next_index: &mut usize) -> bool {
        let mut decoded = AudioFrameFFmpeg::empty();

        loop {
            match self.codec.0.receive_frame(&mut decoded) {
                Ok(()) => {
                    let storage = self.recycled.try_recv().unwrap_or_default();
                    match convert_frame(&decoded, *next_index, storage) {
                        Ok(chunk) => {
                            *next_index += 1;
                            if self.output.send(Ok(chunk)).is_err() {
                                return false;
                            }
                        }
                        Err(e) => warn!(error = %e, "frame conversion error"),
                    }
                }
                Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => return true,
                Err(ffmpeg_next::Error::Eof) => return true,
                Err(e) => {
                    return self
                        .output
                        .send(Err(Error::codec(e.to_string())))
                        .is_ok();
                }
            }
        }
    }
}

/**
    Build an FFmpeg packet from a submission, or `None` for an empty
    end-of-stream marker.
*/
fn make_packet(submission: &Submission) -> Option<ffmpeg_next::Packet> {
    if submission.buffer.is_empty() {
        return None;
    }

    let mut packet = ffmpeg_next::Packet::copy(submission.buffer.data());
    // Packet timestamps are in microseconds; the codec's pkt_timebase matches
    packet.set_pts(Some(submission.pts_us));
    packet.set_dts(Some(submission.pts_us));
    if submission.flags.contains(BufferFlags::KEY_FRAME) {
        packet.set_flags(ffmpeg_next::packet::Flags::KEY);
    }
    Some(packet)
}

/**
    Convert an FFmpeg audio frame into an interleaved 16-bit output slot.
*/
fn convert_frame(
    frame: &AudioFrameFFmpeg,
    index: usize,
    mut storage: Vec<i16>,
) -> Result<OutputBuffer> {
    let samples = frame.samples();
    let channel_count = frame.ch_layout().channels() as u16;

    if samples == 0 {
        return Err(Error::invalid_data("audio frame has zero samples"));
    }

    // Check that the frame actually has data planes allocated
    if frame.planes() == 0 {
        return Err(Error::invalid_data(
            "audio frame has no data planes (linesize is 0)",
        ));
    }

    let ffmpeg_format = frame.format();
    let format = sample_format_from_ffmpeg(ffmpeg_format).ok_or_else(|| {
        Error::unsupported_format(format!("unsupported sample format: {:?}", ffmpeg_format))
    })?;

    let bytes = copy_audio_data(frame, format, samples, channel_count)?;
    storage.clear();
    samples_to_i16(&bytes, format, &mut storage);

    Ok(OutputBuffer::new(
        index,
        storage,
        channel_count,
        frame.rate(),
        frame.pts().or(frame.timestamp()),
    ))
}
