use std::fmt;
use std::str::FromStr;

#[cfg(feature = "cli")]
use clap::ValueEnum;

use crate::Error;

/// The supported output formats for transcription segments.
///
/// Why this exists:
/// - We want a single, strongly-typed representation of output formats
///   across the CLI and library code.
/// - Each variant maps to one encoder strategy (see [`crate::segment_encoder::open_encoder`]),
///   so format selection happens once instead of at every write.
///
/// Integration notes:
/// - With the `cli` feature, `ValueEnum` allows this enum to be used directly as a CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum OutputType {
    /// SubRip subtitles (`HH:MM:SS,mmm`, 1-based cue numbers).
    Srt,

    /// WebVTT subtitles (`HH:MM:SS.mmm`).
    Vtt,

    /// Plain text, one segment per line.
    Txt,

    /// Tab-separated `start`, `end` (milliseconds) and `text`.
    Tsv,

    /// A single pretty-printed JSON array of `{id, start, end, text}` records.
    Json,
}

impl OutputType {
    /// File extension used for this format, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputType::Srt => "srt",
            OutputType::Vtt => "vtt",
            OutputType::Txt => "txt",
            OutputType::Tsv => "tsv",
            OutputType::Json => "json",
        }
    }

    /// Whether records are appended to the destination as they arrive.
    ///
    /// JSON is the only buffered format: it needs the full sequence before it can emit a
    /// well-formed document.
    pub fn is_streaming(self) -> bool {
        !matches!(self, OutputType::Json)
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "srt" => Ok(OutputType::Srt),
            "vtt" => Ok(OutputType::Vtt),
            "txt" => Ok(OutputType::Txt),
            "tsv" => Ok(OutputType::Tsv),
            "json" => Ok(OutputType::Json),
            other => Err(Error::UnknownOutputFormat(other.to_owned())),
        }
    }
}
