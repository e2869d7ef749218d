//! Time code formatting for subtitle cues and log lines.

/// The character placed between seconds and milliseconds.
///
/// SubRip uses a comma (`HH:MM:SS,mmm`); WebVTT uses a period (`HH:MM:SS.mmm`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Comma,
    Period,
}

impl Separator {
    pub fn as_char(self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Period => '.',
        }
    }
}

/// Format seconds as `HH:MM:SS<sep>mmm`.
///
/// Truncation policy:
/// - The input is first quantized to whole microseconds, then whole seconds and milliseconds
///   are both truncated, never rounded. `3661.2505` becomes `01:01:01,250`.
/// - Hours are not wrapped at 24 and grow past two digits when needed.
///
/// Negative input is clamped to zero.
pub fn format_timestamp(seconds: f64, separator: Separator) -> String {
    let total_us = (seconds.max(0.0) * 1_000_000.0).round() as u64;

    let ms = (total_us % 1_000_000) / 1_000;
    let total_s = total_us / 1_000_000;

    let s = total_s % 60;
    let m = (total_s % 3_600) / 60;
    let h = total_s / 3_600;

    format!("{h:02}:{m:02}:{s:02}{}{ms:03}", separator.as_char())
}

/// Convert seconds to whole milliseconds, truncating toward zero.
pub fn seconds_to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1_000.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn truncates_milliseconds_instead_of_rounding() {
        assert_eq!(format_timestamp(3661.2505, Separator::Comma), "01:01:01,250");
        assert_eq!(format_timestamp(1.9996, Separator::Comma), "00:00:01,999");
    }

    #[test]
    fn uses_requested_separator() {
        assert_eq!(format_timestamp(61.2, Separator::Period), "00:01:01.200");
        assert_eq!(format_timestamp(61.2, Separator::Comma), "00:01:01,200");
    }

    #[test]
    fn hours_are_not_wrapped() {
        assert_eq!(format_timestamp(90_000.0, Separator::Comma), "25:00:00,000");
        assert_eq!(
            format_timestamp(360_000.5, Separator::Period),
            "100:00:00.500"
        );
    }

    #[test]
    fn sub_microsecond_noise_does_not_drop_a_second() {
        assert_eq!(format_timestamp(0.9999996, Separator::Comma), "00:00:01,000");
    }

    #[test]
    fn every_output_matches_the_fixed_layout() {
        let comma = Regex::new(r"^\d{2,}:\d{2}:\d{2},\d{3}$").expect("valid regex");
        let period = Regex::new(r"^\d{2,}:\d{2}:\d{2}\.\d{3}$").expect("valid regex");

        let samples = [0.0, 0.001, 0.5, 59.999, 60.0, 3599.9994, 3600.0, 86_399.5, 123_456.789];
        for s in samples {
            let out = format_timestamp(s, Separator::Comma);
            assert!(comma.is_match(&out), "bad time code {out} for {s}");
            let out = format_timestamp(s, Separator::Period);
            assert!(period.is_match(&out), "bad time code {out} for {s}");
        }
    }

    #[test]
    fn millis_truncate_toward_zero() {
        assert_eq!(seconds_to_millis(1.2345), 1234);
        assert_eq!(seconds_to_millis(2.0), 2000);
        assert_eq!(seconds_to_millis(0.0009), 0);
    }
}
