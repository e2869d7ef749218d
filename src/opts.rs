use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[cfg(feature = "cli")]
use clap::ValueEnum;

use crate::Error;
use crate::output_type::OutputType;

/// What the engine should produce from the spoken audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum Task {
    /// Keep the spoken language.
    #[default]
    Transcribe,

    /// Translate the speech to English.
    Translate,
}

impl Task {
    /// Marker inserted before the output extension (`movie.en.srt` for translations).
    pub fn file_suffix(self) -> &'static str {
        match self {
            Task::Transcribe => "",
            Task::Translate => ".en",
        }
    }

    /// Human-readable description used in run logs.
    pub fn describe(self) -> &'static str {
        match self {
            Task::Transcribe => "transcribe (source language)",
            Task::Translate => "translate to English",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Transcribe => f.write_str("transcribe"),
            Task::Translate => f.write_str("translate"),
        }
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "transcribe" => Ok(Task::Transcribe),
            "translate" => Ok(Task::Translate),
            other => Err(Error::UnknownTask(other.to_owned())),
        }
    }
}

/// Options that describe a single transcription run.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - other frontends (GUIs, tests, batch jobs) can construct options programmatically
#[derive(Debug, Clone)]
pub struct Opts {
    /// The media file to transcribe. Output lands next to it.
    pub file_path: PathBuf,

    /// The desired output format.
    pub output_type: OutputType,

    /// Transcribe verbatim or translate to English.
    pub task: Task,

    /// Text used to bias decoding toward a script or dialect (e.g. Traditional Chinese).
    ///
    /// Only honored for [`Task::Transcribe`]; see [`Opts::effective_initial_prompt`].
    pub initial_prompt: Option<String>,
}

impl Opts {
    pub fn new(file_path: impl Into<PathBuf>, output_type: OutputType) -> Self {
        Self {
            file_path: file_path.into(),
            output_type,
            task: Task::Transcribe,
            initial_prompt: None,
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    pub fn with_initial_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.initial_prompt = Some(prompt.into());
        self
    }

    /// The prompt that is actually handed to the engine.
    ///
    /// Translation output is always English, so a source-language prompt is dropped there.
    /// Empty prompts count as absent.
    pub fn effective_initial_prompt(&self) -> Option<&str> {
        match self.task {
            Task::Translate => None,
            Task::Transcribe => self.initial_prompt.as_deref().filter(|p| !p.is_empty()),
        }
    }
}
