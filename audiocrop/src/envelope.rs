/*!
    Envelope extraction: demux, decode and summarize an audio file.
*/

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use ffmpeg_decode::AudioDecoder;
use ffmpeg_source::Source;
use ffmpeg_types::{BufferFlags, SampleFlags, select_audio_track};

use crate::cancel::CancelToken;
use crate::config::EnvelopeConfig;
use crate::error::EnvelopeError;
use crate::media::{PcmDecoder, SampleSource};
use crate::waveform::{Envelope, WaveformSummarizer};

/**
    Envelope of an audio file together with its total duration.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvelopeResult {
    pub envelope: Envelope,
    pub duration_ms: u64,
}

/**
    Total duration of a media file in milliseconds, or 0 if it cannot be
    read.
*/
pub fn probe_duration_ms<P: AsRef<Path>>(path: P) -> u64 {
    ffmpeg_source::probe_duration(path).as_millis() as u64
}

/**
    Extract the amplitude envelope of `path`.

    Never fails: any error is logged and yields an empty envelope with a
    duration of 0. Use [`try_extract_envelope`] to see what went wrong.
*/
pub fn extract_envelope<P: AsRef<Path>>(path: P, config: &EnvelopeConfig) -> EnvelopeResult {
    let path = path.as_ref();
    match try_extract_envelope(path, config, &CancelToken::new()) {
        Ok(result) => result,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "envelope extraction failed");
            EnvelopeResult::default()
        }
    }
}

/**
    Extract the amplitude envelope of `path`, reporting failures.

    Decodes the first audio track until `config.sample_budget` PCM samples
    have been summarized or the track ends.
*/
pub fn try_extract_envelope<P: AsRef<Path>>(
    path: P,
    config: &EnvelopeConfig,
    cancel: &CancelToken,
) -> Result<EnvelopeResult, EnvelopeError> {
    let path = path.as_ref();
    let duration_ms = probe_duration_ms(path);

    let mut source = Source::open(path).map_err(EnvelopeError::Source)?;
    let mut decoder = AudioDecoder::new(config.decoder_config());
    let envelope = summarize(&mut source, &mut decoder, config, cancel);
    source.release();
    let envelope = envelope?;

    info!(
        path = %path.display(),
        samples = envelope.len(),
        duration_ms,
        "envelope extracted"
    );
    Ok(EnvelopeResult {
        envelope,
        duration_ms,
    })
}

/**
    Select the audio track of `source`, run it through `decoder` and
    summarize the PCM.

    The decoder is always stopped and released before returning.
*/
pub(crate) fn summarize<S, D>(
    source: &mut S,
    decoder: &mut D,
    config: &EnvelopeConfig,
    cancel: &CancelToken,
) -> Result<Envelope, EnvelopeError>
where
    S: SampleSource,
    D: PcmDecoder<S::Track>,
{
    let track = select_audio_track(source.track_mimes()).ok_or(EnvelopeError::NoAudioTrack)?;
    source.select_track(track).map_err(EnvelopeError::Source)?;

    let result = source
        .track_format(track)
        .map_err(EnvelopeError::Source)
        .and_then(|format| decoder.configure(format).map_err(EnvelopeError::Decode))
        .and_then(|()| decoder.start().map_err(EnvelopeError::Decode))
        .and_then(|()| pump(source, decoder, config, cancel));

    if let Err(e) = decoder.stop() {
        warn!(error = %e, "failed to stop decoder");
    }
    decoder.release();

    result
}

/**
    Alternate between feeding input slots and draining output slots.

    Stops when the budget is reached, the decoder reports end of stream, or
    the tail drain after the last input runs out.
*/
fn pump<S, D>(
    source: &mut S,
    decoder: &mut D,
    config: &EnvelopeConfig,
    cancel: &CancelToken,
) -> Result<Envelope, EnvelopeError>
where
    S: SampleSource,
    D: PcmDecoder<S::Track>,
{
    let timeout = config.dequeue_timeout();
    let mut summarizer = WaveformSummarizer::new(config.sample_budget);
    let mut sample = Vec::with_capacity(config.input_buffer_size);
    let mut last_time_us = 0;
    let mut last_decoded_us = None;
    let mut drain_deadline: Option<Instant> = None;

    while !summarizer.is_full() {
        if cancel.is_cancelled() {
            return Err(EnvelopeError::Cancelled);
        }

        if drain_deadline.is_none() {
            if let Some(mut slot) = decoder
                .dequeue_input_buffer(timeout)
                .map_err(EnvelopeError::Decode)?
            {
                match source.read_sample(&mut sample).map_err(EnvelopeError::Source)? {
                    Some(_) => {
                        let time_us = source.sample_time().unwrap_or(last_time_us);
                        last_time_us = time_us;
                        let flags = if source.sample_flags().contains(SampleFlags::SYNC) {
                            BufferFlags::KEY_FRAME
                        } else {
                            BufferFlags::empty()
                        };

                        slot.fill(&sample).map_err(EnvelopeError::Decode)?;
                        decoder
                            .queue_input_buffer(slot, time_us, flags)
                            .map_err(EnvelopeError::Decode)?;
                        source.advance().map_err(EnvelopeError::Source)?;
                    }
                    None => {
                        decoder
                            .queue_input_buffer(slot, last_time_us, BufferFlags::END_OF_STREAM)
                            .map_err(EnvelopeError::Decode)?;
                        drain_deadline = Some(Instant::now() + config.tail_drain());
                        debug!(last_time_us, "end of input queued");
                    }
                }
            }
        }

        if let Some(chunk) = decoder
            .dequeue_output_buffer(timeout)
            .map_err(EnvelopeError::Decode)?
        {
            let end_of_stream = chunk.is_end_of_stream();
            last_decoded_us = chunk.pts_us().or(last_decoded_us);
            summarizer.ingest(chunk.samples());
            decoder.release_output_buffer(chunk);
            if end_of_stream {
                break;
            }
        }

        if drain_deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            debug!("decoder did not signal end of stream, giving up on tail");
            break;
        }
    }

    debug!(
        samples = summarizer.len(),
        budget = config.sample_budget,
        last_decoded_us = ?last_decoded_us,
        "pump finished"
    );
    Ok(summarizer.finalize())
}
