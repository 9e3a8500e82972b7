/*!
    Sink configuration.
*/

use std::path::Path;

/**
    Output container format.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContainerFormat {
    /// MPEG-4 Part 14.
    #[default]
    Mp4,
    /// QuickTime. Accepts codecs MP4 cannot carry, such as raw PCM.
    Mov,
}

impl ContainerFormat {
    /**
        Name of the FFmpeg muxer for this format.
    */
    pub fn muxer_name(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
        }
    }

    /**
        Guess the format from a file extension.
    */
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" | "m4a" => Some(Self::Mp4),
            "mov" | "qt" => Some(Self::Mov),
            _ => None,
        }
    }

    /**
        Guess the format from a path's extension.
    */
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/**
    Configuration for a [`Sink`](crate::Sink).
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkConfig {
    pub format: ContainerFormat,
    /// Move the sample index to the front of the file.
    pub fast_start: bool,
}

impl SinkConfig {
    pub fn new(format: ContainerFormat) -> Self {
        Self {
            format,
            fast_start: false,
        }
    }

    pub fn with_fast_start(mut self, fast_start: bool) -> Self {
        self.fast_start = fast_start;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_mp4() {
        let config = SinkConfig::default();
        assert_eq!(config.format, ContainerFormat::Mp4);
        assert!(!config.fast_start);
        assert_eq!(config.format.muxer_name(), "mp4");
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            ContainerFormat::from_path("out/clip.M4A"),
            Some(ContainerFormat::Mp4)
        );
        assert_eq!(
            ContainerFormat::from_path("clip.mov"),
            Some(ContainerFormat::Mov)
        );
        assert_eq!(ContainerFormat::from_path("clip.wav"), None);
        assert_eq!(ContainerFormat::from_path("clip"), None);
    }
}
