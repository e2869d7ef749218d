use std::io::{self, Write};

use crate::segments::Segment;
use crate::stream_encoder::CueLayout;
use crate::timestamp::{Separator, format_timestamp};

/// WebVTT cues (`HH:MM:SS.mmm`), no cue identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct VttLayout;

impl CueLayout for VttLayout {
    fn header(&self) -> &'static str {
        // WebVTT files begin with a mandatory header line followed by a blank line.
        "WEBVTT\n\n"
    }

    fn write_cue<W: Write>(&self, w: &mut W, _index: usize, seg: &Segment) -> io::Result<()> {
        let start = format_timestamp(seg.start_seconds, Separator::Period);
        let end = format_timestamp(seg.end_seconds, Separator::Period);

        writeln!(w, "{start} --> {end}")?;
        writeln!(w, "{}", seg.text)?;
        writeln!(w)
    }
}
