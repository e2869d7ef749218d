use serde::Serialize;

/// A timed piece of recognized text, as yielded by an [`crate::engine::Engine`].
///
/// Engines yield segments in non-decreasing `start_seconds` order; we rely on that and do not
/// re-sort.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Segment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }

    /// Return this segment with leading/trailing whitespace removed from its text.
    pub fn trimmed(mut self) -> Self {
        let trimmed = self.text.trim();
        if trimmed.len() != self.text.len() {
            self.text = trimmed.to_owned();
        }
        self
    }
}

/// Spoken-language detection for a whole input, reported once before any segment.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DetectionInfo {
    /// Language code such as `"en"` or `"zh"`.
    pub language: String,

    /// Confidence in `[0, 1]`.
    pub language_probability: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_strips_surrounding_whitespace_only() {
        let seg = Segment::new(0.0, 1.0, "  hello  world \n").trimmed();
        assert_eq!(seg.text, "hello  world");
    }
}
