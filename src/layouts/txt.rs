use std::io::{self, Write};

use crate::segments::Segment;
use crate::stream_encoder::CueLayout;

/// Plain text: one segment per line, no timing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxtLayout;

impl CueLayout for TxtLayout {
    fn write_cue<W: Write>(&self, w: &mut W, _index: usize, seg: &Segment) -> io::Result<()> {
        writeln!(w, "{}", seg.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment_encoder::SegmentEncoder;
    use crate::stream_encoder::StreamEncoder;

    #[test]
    fn txt_keeps_non_ascii_text() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = StreamEncoder::new(&mut out, TxtLayout);
        enc.write_segment(0, &Segment::new(0.0, 1.0, "大家好"))?;
        enc.write_segment(1, &Segment::new(1.0, 2.0, "bye"))?;
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "大家好\nbye\n");
        Ok(())
    }
}
