//! Per-format record layouts for [`crate::stream_encoder::StreamEncoder`].
//!
//! Each layout only decides how one segment is rendered; opening, flushing and interruption
//! live in the stream encoder.

mod srt;
mod tsv;
mod txt;
mod vtt;

pub use srt::SrtLayout;
pub use tsv::TsvLayout;
pub use txt::TxtLayout;
pub use vtt::VttLayout;
