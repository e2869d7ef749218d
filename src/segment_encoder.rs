use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::Result;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::layouts::{SrtLayout, TsvLayout, TxtLayout, VttLayout};
use crate::output_type::OutputType;
use crate::segments::Segment;
use crate::stream_encoder::StreamEncoder;

/// Serializes an ordered run of segments into one output.
///
/// Lifecycle: `begin` once, `write_segment` per segment (with its 0-based ordinal), then exactly
/// one of `close` (normal end) or `interrupt` (cancelled). Writes after either are errors.
pub trait SegmentEncoder {
    /// Emit any header before the first segment. Idempotent.
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_segment(&mut self, index: usize, seg: &Segment) -> Result<()>;

    /// Stop early: mark the output as interrupted (when it exists) and release it.
    fn interrupt(&mut self) -> Result<()>;

    /// Finish the output and release it. Idempotent.
    fn close(&mut self) -> Result<()>;
}

/// Somewhere an encoder can write to, opened on demand.
///
/// Streaming encoders open their destination immediately; the JSON encoder only opens it once it
/// has a complete document, so a cancelled JSON run never creates a file.
pub trait Destination {
    type Writer: Write;

    fn open(self) -> io::Result<Self::Writer>;
}

/// A file created (or truncated) when opened.
#[derive(Debug, Clone)]
pub struct FileDestination {
    path: PathBuf,
}

impl FileDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Destination for FileDestination {
    type Writer = BufWriter<File>;

    fn open(self) -> io::Result<Self::Writer> {
        File::create(&self.path).map(BufWriter::new)
    }
}

impl<'a> Destination for &'a mut Vec<u8> {
    type Writer = &'a mut Vec<u8>;

    fn open(self) -> io::Result<Self::Writer> {
        Ok(self)
    }
}

/// Build the encoder strategy for `output_type`.
///
/// Streaming formats open `dest` right away, so I/O failures surface here before any segment
/// is consumed.
pub fn open_encoder<'a, D>(
    output_type: OutputType,
    dest: D,
) -> Result<Box<dyn SegmentEncoder + 'a>>
where
    D: Destination + 'a,
    D::Writer: 'a,
{
    let encoder: Box<dyn SegmentEncoder + 'a> = match output_type {
        OutputType::Srt => Box::new(StreamEncoder::new(dest.open()?, SrtLayout)),
        OutputType::Vtt => Box::new(StreamEncoder::new(dest.open()?, VttLayout)),
        OutputType::Txt => Box::new(StreamEncoder::new(dest.open()?, TxtLayout)),
        OutputType::Tsv => Box::new(StreamEncoder::new(dest.open()?, TsvLayout)),
        OutputType::Json => Box::new(JsonArrayEncoder::new(dest)),
    };
    Ok(encoder)
}
