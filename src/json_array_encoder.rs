use std::io::Write;

use serde::Serialize;

use crate::Result;
use crate::segment_encoder::{Destination, SegmentEncoder};
use crate::segments::Segment;

/// One element of the JSON output array.
#[derive(Debug, Serialize)]
struct JsonRecord {
    id: usize,
    start: f64,
    end: f64,
    text: String,
}

/// A `SegmentEncoder` that writes all segments as a single JSON array.
///
/// Design:
/// - A JSON document is only valid once complete, so we buffer records in memory and serialize
///   once on `close()`.
/// - The destination is not opened until then. An interrupted run discards the buffer and
///   leaves no file behind.
///
/// Example output:
/// ```json
/// [
///   {
///     "id": 0,
///     "start": 0.0,
///     "end": 1.2,
///     "text": "hello"
///   }
/// ]
/// ```
pub struct JsonArrayEncoder<D: Destination> {
    /// Where the finished document goes; taken when we write it.
    dest: Option<D>,

    /// Records collected so far, in arrival order.
    records: Vec<JsonRecord>,

    /// Whether the encoder has been closed or interrupted.
    /// Once closed, no further writes are allowed.
    closed: bool,
}

impl<D: Destination> JsonArrayEncoder<D> {
    pub fn new(dest: D) -> Self {
        Self {
            dest: Some(dest),
            records: Vec::new(),
            closed: false,
        }
    }
}

impl<D: Destination> SegmentEncoder for JsonArrayEncoder<D> {
    fn write_segment(&mut self, index: usize, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write segment: encoder is already closed",
            ));
        }

        self.records.push(JsonRecord {
            id: index,
            start: seg.start_seconds,
            end: seg.end_seconds,
            text: seg.text.clone(),
        });

        Ok(())
    }

    fn interrupt(&mut self) -> Result<()> {
        self.records.clear();
        self.dest = None;
        self.closed = true;
        Ok(())
    }

    /// Serialize the buffered array and write it out.
    ///
    /// serde_json's pretty printer indents with two spaces and leaves non-ASCII text unescaped.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let Some(dest) = self.dest.take() else {
            return Ok(());
        };

        let mut w = dest.open()?;
        serde_json::to_writer_pretty(&mut w, &self.records)?;
        w.flush()?;
        self.records.clear();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_close_without_segments_emits_empty_array() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "[]");
        Ok(())
    }

    #[test]
    fn json_is_pretty_printed_with_literal_unicode() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);

        enc.write_segment(0, &Segment::new(0.0, 1.5, "你好"))?;
        enc.write_segment(1, &Segment::new(1.5, 2.25, "world"))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.starts_with("[\n  {\n    \"id\": 0,\n    \"start\": 0.0,\n    \"end\": 1.5,\n"));
        assert!(s.contains("\"text\": \"你好\""));

        let parsed: serde_json::Value = serde_json::from_str(s)?;
        let arr = parsed.as_array().expect("expected JSON array");
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[1]["id"], 1);
        assert_eq!(arr[1]["end"], 2.25);
        Ok(())
    }

    #[test]
    fn json_interrupt_writes_nothing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.write_segment(0, &Segment::new(0.0, 1.0, "hello"))?;
        enc.interrupt()?;
        enc.close()?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn json_write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = JsonArrayEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_segment(0, &Segment::new(0.0, 1.0, "nope")).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
