/*!
    Media sink implementation.
*/

use std::path::{Path, PathBuf};

use ffmpeg_next::{Dictionary, codec, encoder, format::context::Output as OutputContext};
use tracing::{debug, warn};

use ffmpeg_source::TrackFormat;
use ffmpeg_types::{BufferFlags, Error, MICROSECONDS, Rational, Result};

use crate::config::{ContainerFormat, SinkConfig};

/**
    Lifecycle of a [`Sink`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    /// Output created; tracks may be added.
    Created,
    /// Header written; samples may be written.
    Started,
    /// Trailer written; the file is complete.
    Stopped,
    Released,
}

/**
    Output track registered with the muxer.
*/
struct SinkTrack {
    stream_index: usize,
    /// Known only once the header has been written; the muxer picks it.
    time_base: Option<Rational>,
}

/**
    Media sink for stream-copy muxing.

    Compressed samples are written exactly as read from a source, with
    microsecond timestamps; the sink rescales them to whatever time base the
    muxer chose for each track.

    # Example

    ```ignore
    let mut sink = Sink::create("out.mp4", SinkConfig::default())?;
    let track = sink.add_track(source.track_format(audio)?)?;
    sink.start()?;
    sink.write_sample(track, &data, pts_us, BufferFlags::KEY_FRAME)?;
    sink.stop()?;
    sink.release();
    ```
*/
pub struct Sink {
    path: PathBuf,
    format: ContainerFormat,
    output: Option<OutputContext>,
    config: SinkConfig,
    tracks: Vec<SinkTrack>,
    state: SinkState,
    samples_written: u64,
    bytes_written: u64,
}

impl Sink {
    /**
        Create the output file.

        Nothing but the file itself is written until [`start`](Self::start).
    */
    pub fn create<P: AsRef<Path>>(path: P, config: SinkConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::mux(e.to_string()))?;

        let path = path.as_ref();
        let output = ffmpeg_next::format::output_as(path, config.format.muxer_name())
            .map_err(|e| Error::mux(format!("failed to create {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), format = ?config.format, "created");

        Ok(Self {
            path: path.to_path_buf(),
            format: config.format,
            output: Some(output),
            config,
            tracks: Vec::new(),
            state: SinkState::Created,
            samples_written: 0,
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ContainerFormat {
        self.format
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    /**
        Add an output track carrying the same codec configuration as `format`.

        Returns the sink track index to pass to [`write_sample`](Self::write_sample).
    */
    pub fn add_track(&mut self, format: &TrackFormat) -> Result<usize> {
        self.require(SinkState::Created, "add_track")?;
        let output = self.output_mut()?;

        let mut stream = output
            .add_stream(encoder::find(codec::Id::None))
            .map_err(|e| Error::mux(format!("failed to add stream: {}", e)))?;
        stream.set_parameters(format.codec_config.parameters().clone());

        // The source container's codec tag may not be valid in the output
        // container; let the muxer choose.
        let mut parameters = stream.parameters();
        unsafe {
            (*parameters.as_mut_ptr()).codec_tag = 0;
        }

        let stream_index = stream.index();
        self.tracks.push(SinkTrack {
            stream_index,
            time_base: None,
        });

        debug!(
            source_track = format.index,
            stream = stream_index,
            mime = %format.mime,
            "track added"
        );
        Ok(self.tracks.len() - 1)
    }

    /**
        Write the container header. Must be called exactly once, after all
        tracks have been added.
    */
    pub fn start(&mut self) -> Result<()> {
        self.require(SinkState::Created, "start")?;
        if self.tracks.is_empty() {
            return Err(Error::invalid_state("start called with no tracks"));
        }

        let mut options = Dictionary::new();
        if self.config.fast_start {
            options.set("movflags", "+faststart");
        }

        let output = self.output.as_mut().ok_or(Error::Released)?;
        output
            .write_header_with(options)
            .map_err(|e| Error::mux(format!("failed to write header: {}", e)))?;

        // The muxer may have replaced the requested time bases
        let time_bases: Vec<Option<Rational>> = self
            .tracks
            .iter()
            .map(|track| {
                output.stream(track.stream_index).map(|stream| {
                    let tb = stream.time_base();
                    Rational::new(tb.numerator(), tb.denominator())
                })
            })
            .collect();
        for (track, time_base) in self.tracks.iter_mut().zip(time_bases) {
            track.time_base = time_base;
        }

        self.state = SinkState::Started;
        debug!(path = %self.path.display(), "header written");
        Ok(())
    }

    /**
        Write one compressed sample.

        `pts_us` is in microseconds. Codec configuration samples are skipped,
        since the configuration already travels with the track. Partial
        samples are never marked as key frames.

        Returns whether the sample went into the container.
    */
    pub fn write_sample(
        &mut self,
        track: usize,
        data: &[u8],
        pts_us: i64,
        flags: BufferFlags,
    ) -> Result<bool> {
        self.require(SinkState::Started, "write_sample")?;

        let count = self.tracks.len();
        let sink_track = self
            .tracks
            .get(track)
            .ok_or(Error::InvalidTrackIndex { index: track, count })?;

        if flags.contains(BufferFlags::CODEC_CONFIG) {
            debug!(pts_us, "skipping codec config sample");
            return Ok(false);
        }

        let ts = match sink_track.time_base {
            Some(time_base) => MICROSECONDS.rescale(pts_us, time_base),
            None => pts_us,
        };

        let mut packet = ffmpeg_next::Packet::copy(data);
        packet.set_stream(sink_track.stream_index);
        packet.set_pts(Some(ts));
        packet.set_dts(Some(ts));
        if flags.contains(BufferFlags::KEY_FRAME) && !flags.contains(BufferFlags::PARTIAL_FRAME) {
            packet.set_flags(ffmpeg_next::packet::Flags::KEY);
        }

        let output = self.output_mut()?;
        packet
            .write_interleaved(output)
            .map_err(|e| Error::mux(format!("failed to write sample at {} us: {}", pts_us, e)))?;

        self.samples_written += 1;
        self.bytes_written += data.len() as u64;
        Ok(true)
    }

    /**
        Finish the container.

        Writes the trailer (duration, sample index) exactly once. Calling it
        again is a no-op. A sink that was never started is closed without a
        trailer.
    */
    pub fn stop(&mut self) -> Result<()> {
        match self.state {
            SinkState::Started => {
                // Only one attempt is ever made, even if it fails
                self.state = SinkState::Stopped;
                let output = self.output_mut()?;
                output
                    .write_trailer()
                    .map_err(|e| Error::mux(format!("failed to write trailer: {}", e)))?;
                debug!(
                    path = %self.path.display(),
                    samples = self.samples_written,
                    bytes = self.bytes_written,
                    "finished"
                );
                Ok(())
            }
            SinkState::Created => {
                self.state = SinkState::Stopped;
                Ok(())
            }
            SinkState::Stopped | SinkState::Released => Ok(()),
        }
    }

    /**
        Close the output file. Idempotent.

        Only [`stop`](Self::stop) writes the trailer. A sink released while
        still started is left unsealed.
    */
    pub fn release(&mut self) {
        if self.state == SinkState::Released {
            return;
        }
        if self.state == SinkState::Started {
            warn!(
                path = %self.path.display(),
                samples = self.samples_written,
                "released without trailer"
            );
        }
        self.output = None;
        self.state = SinkState::Released;
    }

    fn require(&self, expected: SinkState, operation: &str) -> Result<()> {
        match self.state {
            SinkState::Released => Err(Error::Released),
            state if state == expected => Ok(()),
            state => Err(Error::invalid_state(format!(
                "{} called while {:?}",
                operation, state
            ))),
        }
    }

    fn output_mut(&mut self) -> Result<&mut OutputContext> {
        self.output.as_mut().ok_or(Error::Released)
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("state", &self.state)
            .field("tracks", &self.tracks.len())
            .field("samples_written", &self.samples_written)
            .finish_non_exhaustive()
    }
}
