/*!
    Lossless cropping: copy the compressed samples inside a time window into
    a new container.

    The window is aligned to sync points: the copy starts at the last sync
    point at or before the requested start, so the first written sample may
    precede it by up to one sync interval. No sample is decoded or
    re-encoded.
*/

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info, warn};

use ffmpeg_sink::Sink;
use ffmpeg_source::Source;
use ffmpeg_types::{BufferFlags, SeekMode, millis_to_micros, select_audio_track};

use crate::cancel::CancelToken;
use crate::config::CropConfig;
use crate::error::CropError;
use crate::media::{SampleSink, SampleSource};

/**
    Requested crop range in milliseconds, as picked by the caller.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl CropWindow {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        Self { start_ms, end_ms }
    }

    /**
        Resolve into `(start_us, end_us)`.

        The end is clamped to `duration_us` when the track declares one.
        Fails with [`CropError::EmptyWindow`] if nothing is left.
    */
    pub fn resolve(&self, duration_us: Option<i64>) -> Result<(i64, i64), CropError> {
        let start_us = millis_to_micros(self.start_ms);
        let mut end_us = millis_to_micros(self.end_ms);
        if let Some(duration_us) = duration_us.filter(|&d| d > 0) {
            end_us = end_us.min(duration_us);
        }

        if start_us >= end_us {
            return Err(CropError::EmptyWindow { start_us, end_us });
        }
        Ok((start_us, end_us))
    }
}

/**
    What a crop wrote.

    Timestamps are those of the source samples, before any rebasing.
*/
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CropReport {
    pub samples_written: u64,
    pub bytes_written: u64,
    pub first_sample_us: Option<i64>,
    pub last_sample_us: Option<i64>,
}

/**
    Copy the audio between `start_ms` and `end_ms` of `input` into an MP4 at
    `output`, with default settings.
*/
pub fn crop_to_file<P, Q>(
    input: P,
    output: Q,
    start_ms: u64,
    end_ms: u64,
) -> Result<CropReport, CropError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    crop_to_file_with(
        input,
        output,
        CropWindow::new(start_ms, end_ms),
        &CropConfig::default(),
        &CancelToken::new(),
    )
}

/**
    Copy the audio inside `window` of `input` into `output`.

    Nothing is created at `output` when the input cannot be read, has no
    audio track, or the window is empty. If anything fails once the output
    exists, the partial file is removed.
*/
pub fn crop_to_file_with<P, Q>(
    input: P,
    output: Q,
    window: CropWindow,
    config: &CropConfig,
    cancel: &CancelToken,
) -> Result<CropReport, CropError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (input, output) = (input.as_ref(), output.as_ref());

    let mut source = Source::open(input).map_err(CropError::Source)?;
    let mut output_created = false;
    let result = crop_samples(
        &mut source,
        || {
            output_created = true;
            Sink::create(output, config.sink_config())
        },
        window,
        config,
        cancel,
    );
    source.release();

    match result {
        Ok(report) => {
            info!(
                input = %input.display(),
                output = %output.display(),
                samples = report.samples_written,
                bytes = report.bytes_written,
                "crop finished"
            );
            Ok(report)
        }
        Err(e) => {
            if output_created {
                remove_partial_output(output);
            }
            Err(e)
        }
    }
}

/**
    Crop the first audio track of `source` into the sink made by
    `create_sink`.

    The sink is only created once the track and window are known to be
    usable. It is sealed only on success; on every path it is then released,
    followed by the source, so a failed crop leaves an unsealed file behind
    for the caller to remove.
*/
pub(crate) fn crop_samples<S, K, F>(
    source: &mut S,
    create_sink: F,
    window: CropWindow,
    config: &CropConfig,
    cancel: &CancelToken,
) -> Result<CropReport, CropError>
where
    S: SampleSource,
    K: SampleSink<S::Track>,
    F: FnOnce() -> ffmpeg_types::Result<K>,
{
    let track = select_audio_track(source.track_mimes()).ok_or(CropError::NoAudioTrack)?;
    source.select_track(track).map_err(CropError::Source)?;
    let (start_us, end_us) = window.resolve(source.track_duration_us(track))?;
    debug!(track, start_us, end_us, "crop window resolved");

    let mut sink = create_sink().map_err(CropError::Mux)?;

    let result = source
        .track_format(track)
        .and_then(|format| sink.add_track(format))
        .and_then(|out_track| sink.start().map(|()| out_track))
        .map_err(CropError::Mux)
        .and_then(|out_track| {
            copy_window(source, &mut sink, out_track, start_us, end_us, config, cancel)
        })
        .and_then(|report| sink.stop().map(|()| report).map_err(CropError::Mux));

    sink.release();
    source.release();
    result
}

fn copy_window<S, K>(
    source: &mut S,
    sink: &mut K,
    out_track: usize,
    start_us: i64,
    end_us: i64,
    config: &CropConfig,
    cancel: &CancelToken,
) -> Result<CropReport, CropError>
where
    S: SampleSource,
    K: SampleSink<S::Track>,
{
    source
        .seek_to(start_us, SeekMode::PreviousSync)
        .map_err(CropError::Mux)?;

    let mut buf = Vec::with_capacity(config.read_buffer_size);
    let mut report = CropReport::default();
    let mut last_time_us = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(CropError::Cancelled);
        }

        let Some(size) = source.read_sample(&mut buf).map_err(CropError::Mux)? else {
            break;
        };
        let time_us = source.sample_time().unwrap_or(last_time_us);
        last_time_us = time_us;
        if time_us > end_us {
            break;
        }

        let flags = BufferFlags::from_sample_flags(source.sample_flags());
        let first_us = *report.first_sample_us.get_or_insert(time_us);
        let pts_us = if config.rebase_timestamps {
            time_us - first_us
        } else {
            time_us
        };

        let stored = sink
            .write_sample(out_track, &buf[..size], pts_us, flags)
            .map_err(CropError::Mux)?;
        if stored {
            report.samples_written += 1;
            report.bytes_written += size as u64;
        }
        report.last_sample_us = Some(time_us);

        if !source.advance().map_err(CropError::Mux)? {
            break;
        }
    }

    debug!(
        samples = report.samples_written,
        first_us = ?report.first_sample_us,
        last_us = ?report.last_sample_us,
        "window copied"
    );
    Ok(report)
}

fn remove_partial_output(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed partial output"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_types::{Error, SampleFlags};

    use crate::fakes::{FakeSample, FakeSink, FakeSource, FakeTrack};

    fn crop(
        source: &mut FakeSource,
        sink: FakeSink,
        window: CropWindow,
        config: &CropConfig,
    ) -> Result<CropReport, CropError> {
        crop_samples(source, move || Ok(sink), window, config, &CancelToken::new())
    }

    #[test]
    fn window_resolution() {
        assert_eq!(
            CropWindow::new(1000, 5000).resolve(Some(10_000_000)).unwrap(),
            (1_000_000, 5_000_000)
        );
        // End beyond the duration clamps
        assert_eq!(
            CropWindow::new(1000, 60_000).resolve(Some(10_000_000)).unwrap(),
            (1_000_000, 10_000_000)
        );
        // Unknown duration leaves the end alone
        assert_eq!(
            CropWindow::new(0, 60_000).resolve(None).unwrap(),
            (0, 60_000_000)
        );
        assert!(matches!(
            CropWindow::new(5000, 5000).resolve(None),
            Err(CropError::EmptyWindow { .. })
        ));
        assert!(matches!(
            CropWindow::new(12_000, 20_000).resolve(Some(10_000_000)),
            Err(CropError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn copies_samples_from_previous_sync() {
        // 100 ms samples over 10 s, sync every 500 ms
        let mut source = FakeSource::audio(100, 100_000, 5);
        let sink = FakeSink::default();
        let log = sink.log.clone();

        let report = crop(
            &mut source,
            sink,
            CropWindow::new(1200, 5000),
            &CropConfig::default(),
        )
        .unwrap();

        assert_eq!(source.seeks, vec![1_200_000]);
        assert_eq!(report.first_sample_us, Some(1_000_000));
        assert_eq!(report.last_sample_us, Some(5_000_000));
        assert_eq!(report.samples_written, 41);
        assert_eq!(report.bytes_written, 41 * 4);

        let log = log.borrow();
        assert_eq!(log.tracks.len(), 1);
        assert_eq!(log.written.len(), 41);
        assert_eq!(log.written[0].2, 1_000_000);
        assert_eq!(log.written[0].3, BufferFlags::KEY_FRAME);
        assert_eq!(log.written[1].3, BufferFlags::empty());
        assert_eq!(log.stops, 1);
        assert!(log.released);
        assert!(source.released);
    }

    #[test]
    fn start_before_first_sync_uses_first_sync() {
        let mut source = FakeSource::audio(20, 100_000, 5);
        source.samples[0].flags = SampleFlags::empty();
        let sink = FakeSink::default();
        let log = sink.log.clone();

        crop(&mut source, sink, CropWindow::new(0, 1000), &CropConfig::default()).unwrap();
        assert_eq!(log.borrow().written[0].2, 500_000);
    }

    #[test]
    fn rebase_starts_at_zero() {
        let mut source = FakeSource::audio(100, 100_000, 5);
        let sink = FakeSink::default();
        let log = sink.log.clone();
        let config = CropConfig {
            rebase_timestamps: true,
            ..CropConfig::default()
        };

        let report = crop(&mut source, sink, CropWindow::new(2600, 3000), &config).unwrap();

        assert_eq!(report.first_sample_us, Some(2_500_000));
        let pts: Vec<i64> = log.borrow().written.iter().map(|w| w.2).collect();
        assert_eq!(pts, vec![0, 100_000, 200_000, 300_000, 400_000, 500_000]);
    }

    #[test]
    fn end_beyond_duration_copies_to_end() {
        let mut source = FakeSource::audio(30, 100_000, 5);
        let sink = FakeSink::default();

        let report = crop(
            &mut source,
            sink,
            CropWindow::new(2000, 99_000),
            &CropConfig::default(),
        )
        .unwrap();
        assert_eq!(report.samples_written, 10);
        assert_eq!(report.last_sample_us, Some(2_900_000));
    }

    #[test]
    fn flags_map_with_priority() {
        let flags = [
            SampleFlags::SYNC | SampleFlags::ENCRYPTED,
            SampleFlags::ENCRYPTED | SampleFlags::PARTIAL,
            SampleFlags::PARTIAL,
            SampleFlags::empty(),
        ];
        let samples = flags
            .iter()
            .enumerate()
            .map(|(i, &flags)| FakeSample {
                time_us: i as i64 * 1000,
                flags,
                data: vec![i as u8],
            })
            .collect();
        let mut source = FakeSource::new(vec![FakeTrack::new("audio/mpeg", None)], samples);
        let sink = FakeSink::default();
        let log = sink.log.clone();

        let report =
            crop(&mut source, sink, CropWindow::new(0, 10), &CropConfig::default()).unwrap();

        // The codec config sample reaches the sink but is not stored
        assert_eq!(report.samples_written, 3);
        assert_eq!(report.bytes_written, 3);
        let written: Vec<BufferFlags> = log.borrow().written.iter().map(|w| w.3).collect();
        assert_eq!(
            written,
            vec![
                BufferFlags::KEY_FRAME,
                BufferFlags::CODEC_CONFIG,
                BufferFlags::PARTIAL_FRAME,
                BufferFlags::empty(),
            ]
        );
    }

    #[test]
    fn no_audio_track_creates_nothing() {
        let mut source = FakeSource::new(
            vec![
                FakeTrack::new("video/avc", Some(10_000_000)),
                FakeTrack::new("text/vtt", None),
            ],
            Vec::new(),
        );
        let mut created = false;

        let result = crop_samples(
            &mut source,
            || {
                created = true;
                Ok(FakeSink::default())
            },
            CropWindow::new(0, 1000),
            &CropConfig::default(),
            &CancelToken::new(),
        );

        assert!(matches!(result, Err(CropError::NoAudioTrack)));
        assert!(!created);
    }

    #[test]
    fn empty_window_creates_nothing() {
        let mut source = FakeSource::audio(10, 100_000, 5);
        let mut created = false;

        let result = crop_samples(
            &mut source,
            || {
                created = true;
                Ok(FakeSink::default())
            },
            CropWindow::new(3000, 2000),
            &CropConfig::default(),
            &CancelToken::new(),
        );

        assert!(matches!(result, Err(CropError::EmptyWindow { .. })));
        assert!(!created);
    }

    #[test]
    fn write_failure_is_mux_error() {
        let mut source = FakeSource::audio(50, 100_000, 5);
        let sink = FakeSink {
            fail_write_at: Some(3),
            ..FakeSink::default()
        };
        let log = sink.log.clone();

        let result = crop(
            &mut source,
            sink,
            CropWindow::new(0, 4000),
            &CropConfig::default(),
        );

        assert!(matches!(result, Err(CropError::Mux(Error::Mux(_)))));
        let log = log.borrow();
        assert_eq!(log.stops, 0);
        assert!(log.released_unsealed);
        assert!(source.released);
    }

    #[test]
    fn successful_crop_is_sealed_before_release() {
        let mut source = FakeSource::audio(10, 100_000, 5);
        let sink = FakeSink::default();
        let log = sink.log.clone();

        crop(&mut source, sink, CropWindow::new(0, 500), &CropConfig::default()).unwrap();

        let log = log.borrow();
        assert_eq!(log.stops, 1);
        assert!(log.released);
        assert!(!log.released_unsealed);
    }

    #[test]
    fn sink_creation_failure_is_mux_error() {
        let mut source = FakeSource::audio(10, 100_000, 5);
        let result = crop_samples::<_, FakeSink, _>(
            &mut source,
            || Err(Error::mux("read-only filesystem")),
            CropWindow::new(0, 500),
            &CropConfig::default(),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(CropError::Mux(_))));
    }

    #[test]
    fn cancellation_leaves_sink_unsealed() {
        let mut source = FakeSource::audio(10, 100_000, 5);
        let sink = FakeSink::default();
        let log = sink.log.clone();
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = crop_samples(
            &mut source,
            move || Ok(sink),
            CropWindow::new(0, 500),
            &CropConfig::default(),
            &cancel,
        );
        assert!(matches!(result, Err(CropError::Cancelled)));
        assert!(source.released);

        let log = log.borrow();
        assert!(log.started);
        assert!(log.written.is_empty());
        assert_eq!(log.stops, 0);
        assert!(log.released_unsealed);
    }

    #[test]
    fn identical_crops_write_identical_samples() {
        let run = || {
            let mut source = FakeSource::audio(100, 100_000, 5);
            let sink = FakeSink::default();
            let log = sink.log.clone();
            crop(
                &mut source,
                sink,
                CropWindow::new(1000, 5000),
                &CropConfig::default(),
            )
            .unwrap();
            let written = log.borrow().written.clone();
            written
        };
        assert_eq!(run(), run());
    }
}
