/*!
    Container reader implementation.
*/

use std::path::{Path, PathBuf};

use ffmpeg_next::format::context::Input as InputContext;
use tracing::{debug, warn};

use ffmpeg_types::{Error, MICROSECONDS, Result, SampleFlags, SeekMode};

use crate::convert::sample_flags_from_packet;
use crate::track::TrackFormat;

/**
    The sample the read cursor currently points at.
*/
#[derive(Debug)]
struct CurrentSample {
    data: Vec<u8>,
    time_us: Option<i64>,
    flags: SampleFlags,
}

/**
    A media container opened for sequential sample reading.

    After [`select_track`](Self::select_track), the reader walks the
    selected track's compressed samples in file order. The cursor only
    moves on [`advance`](Self::advance) or [`seek_to`](Self::seek_to), so
    repeated calls to [`read_sample`](Self::read_sample) return the same
    sample.

    The underlying handle is released by [`release`](Self::release) or when
    the source is dropped, whichever comes first.
*/
pub struct Source {
    path: PathBuf,
    input: Option<InputContext>,
    tracks: Vec<TrackFormat>,
    selected: Option<usize>,
    current: Option<CurrentSample>,
    last_time_us: Option<i64>,
    end_of_stream: bool,
}

impl Source {
    /**
        Open a media file and read its track list.

        # Example

        ```ignore
        let mut source = Source::open("input.aac")?;
        for i in 0..source.track_count() {
            println!("{}: {}", i, source.track_format(i)?.mime);
        }
        ```
    */
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let input = open_input(&path)?;

        let container_duration_us = (input.duration() > 0).then(|| input.duration());
        let tracks: Vec<TrackFormat> = input
            .streams()
            .map(|stream| TrackFormat::from_stream(&stream, container_duration_us))
            .collect();

        debug!(
            path = %path.display(),
            tracks = tracks.len(),
            duration_us = ?container_duration_us,
            "opened container"
        );

        Ok(Self {
            path,
            input: Some(input),
            tracks,
            selected: None,
            current: None,
            last_time_us: None,
            end_of_stream: false,
        })
    }

    /**
        Path this source was opened from.
    */
    pub fn path(&self) -> &Path {
        &self.path
    }

    /**
        Number of tracks in the container.
    */
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /**
        Describe the track at `index`.
    */
    pub fn track_format(&self, index: usize) -> Result<&TrackFormat> {
        self.tracks.get(index).ok_or(Error::InvalidTrackIndex {
            index,
            count: self.tracks.len(),
        })
    }

    /**
        All track descriptors, in container order.
    */
    pub fn tracks(&self) -> &[TrackFormat] {
        &self.tracks
    }

    /**
        Restrict reading to the track at `index`.

        Selecting a track resets the read cursor to the next packet of that
        track in file order.
    */
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        self.track_format(index)?;

        self.selected = Some(index);
        self.current = None;
        self.end_of_stream = false;
        Ok(())
    }

    /**
        Copy the current sample's bytes into `buf`.

        Returns the number of bytes written, or `Ok(None)` once the selected
        track has no more samples (or no track is selected).
    */
    pub fn read_sample(&mut self, buf: &mut Vec<u8>) -> Result<Option<usize>> {
        self.load_current()?;

        match &self.current {
            Some(sample) => {
                buf.clear();
                buf.extend_from_slice(&sample.data);
                Ok(Some(sample.data.len()))
            }
            None => Ok(None),
        }
    }

    /**
        Presentation time in microseconds of the sample last returned by
        [`read_sample`](Self::read_sample).
    */
    pub fn sample_time(&self) -> Option<i64> {
        self.current.as_ref().and_then(|sample| sample.time_us)
    }

    /**
        Flags of the sample last returned by [`read_sample`](Self::read_sample).
    */
    pub fn sample_flags(&self) -> SampleFlags {
        self.current
            .as_ref()
            .map(|sample| sample.flags)
            .unwrap_or_default()
    }

    /**
        Move the cursor to the next sample of the selected track.

        Returns false once the track is exhausted.
    */
    pub fn advance(&mut self) -> Result<bool> {
        self.current = None;
        self.load_current()?;
        Ok(self.current.is_some())
    }

    /**
        Seek to a sync point near `time_us`.

        With [`SeekMode::PreviousSync`], a target before the first sync
        point lands on the first sync point rather than failing.
    */
    pub fn seek_to(&mut self, time_us: i64, mode: SeekMode) -> Result<()> {
        let input = self.input.as_mut().ok_or(Error::Released)?;

        // FFmpeg seeks with stream index -1 in AV_TIME_BASE units (microseconds)
        let result = match mode {
            SeekMode::PreviousSync => input.seek(time_us, ..time_us),
            SeekMode::NextSync => input.seek(time_us, time_us..),
            SeekMode::ClosestSync => input.seek(time_us, ..),
        };

        if let Err(e) = result {
            match mode {
                SeekMode::PreviousSync => {
                    debug!(time_us, error = %e, "no sync point before target, widening seek");
                    if let Err(e) = input.seek(time_us, ..) {
                        warn!(time_us, error = %e, "seek failed, rewinding to start");
                        self.input = Some(open_input(&self.path)?);
                    }
                }
                _ => return Err(Error::codec(format!("seek failed: {}", e))),
            }
        }

        self.current = None;
        self.last_time_us = None;
        self.end_of_stream = false;
        Ok(())
    }

    /**
        Release the container handle.

        Safe to call more than once; later reads fail with [`Error::Released`].
    */
    pub fn release(&mut self) {
        if self.input.take().is_some() {
            debug!(path = %self.path.display(), "released container");
        }
        self.current = None;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.input.is_none() {
            return Err(Error::Released);
        }
        Ok(())
    }

    /**
        Pull packets until one belongs to the selected track.
    */
    fn load_current(&mut self) -> Result<()> {
        if self.current.is_some() || self.end_of_stream {
            return Ok(());
        }

        let input = self.input.as_mut().ok_or(Error::Released)?;
        let Some(selected) = self.selected else {
            return Ok(());
        };
        let time_base = self.tracks[selected].time_base;

        loop {
            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(input) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => {
                    self.end_of_stream = true;
                    return Ok(());
                }
                Err(e) => return Err(Error::codec(format!("read failed: {}", e))),
            }

            if packet.stream() != selected {
                continue;
            }

            let time_us = packet
                .pts()
                .or(packet.dts())
                .map(|ts| time_base.rescale(ts, MICROSECONDS))
                .or(self.last_time_us);
            self.last_time_us = time_us;

            self.current = Some(CurrentSample {
                data: packet.data().map(|d| d.to_vec()).unwrap_or_default(),
                time_us,
                flags: sample_flags_from_packet(&packet),
            });
            return Ok(());
        }
    }
}

impl Drop for Source {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("path", &self.path)
            .field("tracks", &self.tracks.len())
            .field("selected", &self.selected)
            .field("released", &self.input.is_none())
            .finish_non_exhaustive()
    }
}

/**
    Open an FFmpeg input context.

    A missing, corrupt or unrecognised file is an
    [`Error::UnreadableContainer`].
*/
pub(crate) fn open_input(path: &Path) -> Result<InputContext> {
    ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

    if !path.is_file() {
        return Err(Error::unreadable(format!("{}: no such file", path.display())));
    }
    ffmpeg_next::format::input(path)
        .map_err(|e| Error::unreadable(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = Source::open(dir.path().join("missing.aac"));
        assert!(matches!(result, Err(Error::UnreadableContainer(_))));
    }

    #[test]
    fn directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let result = Source::open(dir.path());
        assert!(matches!(result, Err(Error::UnreadableContainer(_))));
    }

    #[test]
    fn garbage_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, [0u8; 64]).unwrap();

        let result = Source::open(&path);
        assert!(matches!(result, Err(Error::UnreadableContainer(_))));
    }
}
