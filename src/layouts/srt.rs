use std::io::{self, Write};

use crate::segments::Segment;
use crate::stream_encoder::CueLayout;
use crate::timestamp::{Separator, format_timestamp};

/// SubRip cues. Cue numbers are 1-based even though segment ordinals are not.
#[derive(Debug, Clone, Copy, Default)]
pub struct SrtLayout;

impl CueLayout for SrtLayout {
    fn write_cue<W: Write>(&self, w: &mut W, index: usize, seg: &Segment) -> io::Result<()> {
        let start = format_timestamp(seg.start_seconds, Separator::Comma);
        let end = format_timestamp(seg.end_seconds, Separator::Comma);

        writeln!(w, "{}", index + 1)?;
        writeln!(w, "{start} --> {end}")?;
        writeln!(w, "{}", seg.text)?;
        writeln!(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment_encoder::SegmentEncoder;
    use crate::stream_encoder::StreamEncoder;

    #[test]
    fn srt_cue_numbers_start_at_one() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = StreamEncoder::new(&mut out, SrtLayout);
        enc.begin()?;
        enc.write_segment(0, &Segment::new(0.0, 1.5, "Hello"))?;
        enc.write_segment(1, &Segment::new(1.5, 3.0, "World"))?;
        enc.close()?;

        assert_eq!(
            std::str::from_utf8(&out)?,
            "1\n00:00:00,000 --> 00:00:01,500\nHello\n\n\
             2\n00:00:01,500 --> 00:00:03,000\nWorld\n\n"
        );
        Ok(())
    }
}
