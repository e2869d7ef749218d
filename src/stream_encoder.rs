use std::io::{self, Write};

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// Appended to a streaming output when a run is cancelled mid-way.
pub const INTERRUPTED_MARKER: &str = "\n[Interrupted by User]\n";

/// The per-format part of a streaming encoder: an optional header plus one record per segment.
pub trait CueLayout {
    /// Written once, before the first record.
    fn header(&self) -> &'static str {
        ""
    }

    /// Write the record for the segment at 0-based position `index`.
    fn write_cue<W: Write>(&self, w: &mut W, index: usize, seg: &Segment) -> io::Result<()>;
}

/// A `SegmentEncoder` that appends each record to a `Write` as soon as it arrives.
///
/// Design:
/// - Memory stays bounded to one segment regardless of media length.
/// - The header is written by `begin()` (or lazily by the first write), so a run that yields no
///   segments still produces a valid, header-only file.
/// - We flush after every record so a partially finished run leaves everything written so far
///   on disk.
pub struct StreamEncoder<W: Write, L: CueLayout> {
    /// The underlying writer we stream records into.
    w: W,

    layout: L,

    /// Whether we've written the header.
    started: bool,

    /// Whether the encoder has been closed or interrupted.
    closed: bool,
}

impl<W: Write, L: CueLayout> StreamEncoder<W, L> {
    pub fn new(w: W, layout: L) -> Self {
        Self {
            w,
            layout,
            started: false,
            closed: false,
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(self.layout.header().as_bytes())?;
            self.started = true;
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }
        Ok(())
    }
}

impl<W: Write, L: CueLayout> SegmentEncoder for StreamEncoder<W, L> {
    fn begin(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.start_if_needed()?;
        self.w.flush()?;
        Ok(())
    }

    fn write_segment(&mut self, index: usize, seg: &Segment) -> Result<()> {
        self.ensure_open()?;
        self.start_if_needed()?;

        self.layout.write_cue(&mut self.w, index, seg)?;
        self.w.flush()?;

        Ok(())
    }

    fn interrupt(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.write_all(INTERRUPTED_MARKER.as_bytes())?;
        self.w.flush()?;
        self.closed = true;

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}
