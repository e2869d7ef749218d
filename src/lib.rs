//! `subtitler` — turn local audio/video files into subtitle files with Whisper.
//!
//! This crate provides:
//! - A run orchestrator with lazy engine loading and cooperative cancellation
//! - Collision-free output naming next to the source file
//! - Output encoders for SRT, WebVTT, plain text, TSV and JSON
//! - A built-in Whisper engine, behind a small trait so others can be plugged in
//!
//! Most consumers only need [`Subtitler`], [`Opts`] and a [`CancelToken`].

mod error;

// High-level API (most consumers should start here).
pub mod opts;
pub mod subtitler;

// Engine interface, caller hooks and built-in engines.
pub mod backends;
pub mod cancel;
pub mod engine;

// Segment data structures.
pub mod segments;

// Output naming, selection and encoders.
pub mod output_path;
pub mod output_type;
pub mod segment_encoder;
pub mod timestamp;

pub mod json_array_encoder;
pub mod layouts;
pub mod stream_encoder;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;

pub use backends::whisper::{Device, EngineConfig, ModelSize, WhisperEngine, WhisperLoader};
pub use cancel::{CancelPoll, CancelToken, LogSink};
pub use engine::{DecodeOptions, Engine, EngineLoader, Transcription};
pub use error::{Error, Result};
pub use opts::{Opts, Task};
pub use output_type::OutputType;
pub use segments::{DetectionInfo, Segment};
pub use subtitler::{RunOutcome, Subtitler};

#[cfg(feature = "logging")]
pub use logging::init as init_logging;
