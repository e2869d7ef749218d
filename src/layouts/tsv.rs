use std::io::{self, Write};

use crate::segments::Segment;
use crate::stream_encoder::CueLayout;
use crate::timestamp::seconds_to_millis;

/// Tab-separated values with integer millisecond timings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvLayout;

impl CueLayout for TsvLayout {
    fn header(&self) -> &'static str {
        "start\tend\ttext\n"
    }

    fn write_cue<W: Write>(&self, w: &mut W, _index: usize, seg: &Segment) -> io::Result<()> {
        writeln!(
            w,
            "{}\t{}\t{}",
            seconds_to_millis(seg.start_seconds),
            seconds_to_millis(seg.end_seconds),
            seg.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment_encoder::SegmentEncoder;
    use crate::stream_encoder::StreamEncoder;

    #[test]
    fn tsv_truncates_milliseconds() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = StreamEncoder::new(&mut out, TsvLayout);
        enc.begin()?;
        enc.write_segment(0, &Segment::new(1.2345, 2.0, "hi"))?;
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "start\tend\ttext\n1234\t2000\thi\n");
        Ok(())
    }
}
