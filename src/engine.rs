use std::path::Path;

use crate::Result;
use crate::opts::Task;
use crate::segments::{DetectionInfo, Segment};

/// Beam width requested from the engine for every run.
pub const DEFAULT_BEAM_SIZE: usize = 5;

/// Decoding parameters handed to [`Engine::transcribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions<'a> {
    pub beam_size: usize,
    pub task: Task,
    /// Already filtered: `None` whenever the task is a translation.
    pub initial_prompt: Option<&'a str>,
}

/// The result of starting a transcription: detection metadata plus the segments to come.
pub struct Transcription<S> {
    pub info: DetectionInfo,
    pub segments: S,
}

/// Pluggable ASR engine used by [`crate::Subtitler`].
///
/// An engine turns a media file into a finite, consume-once sequence of [`Segment`]s. Iteration
/// may block while the next segment is produced; an `Err` item ends the run.
pub trait Engine {
    /// Lazy segment sequence for one run.
    ///
    /// The lifetime ties the sequence to the engine borrow so implementations can reuse
    /// engine-owned state while iterating.
    type Segments<'a>: Iterator<Item = Result<Segment>> + 'a
    where
        Self: 'a;

    fn transcribe<'a>(
        &'a mut self,
        media_path: &Path,
        opts: &DecodeOptions<'_>,
    ) -> Result<Transcription<Self::Segments<'a>>>;
}

/// Builds an [`Engine`] on demand.
///
/// [`crate::Subtitler`] calls `load` the first time it needs an engine and keeps the result
/// warm for later runs. Load failures should be classified with
/// [`crate::Error::engine_init`].
pub trait EngineLoader {
    type Engine: Engine;

    /// Short human-readable description (model and device) for run logs.
    fn describe(&self) -> String;

    fn load(&self) -> Result<Self::Engine>;
}
