use std::error::Error as StdError;

use thiserror::Error;

/// Subtitler's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Library-load failures whose message contains one of these markers come from a missing GPU
/// runtime (driver, cuDNN or cuBLAS) rather than from the model itself.
const GPU_RUNTIME_MARKERS: &[&str] = &["cudnn", "cublas", "load symbol", "dll"];

/// Subtitler's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The engine could not start on the GPU because the accelerator runtime is missing.
    #[error(
        "failed to start the GPU backend: the NVIDIA driver or the cuDNN/cuBLAS libraries could \
         not be loaded. Switch the compute device to `cpu` and try again. ({0})"
    )]
    GpuUnavailable(String),

    /// The engine could not be constructed for any other reason.
    #[error("{0}")]
    EngineInit(String),

    /// The engine failed while decoding or streaming segments.
    #[error("{0}")]
    Engine(String),

    #[error("unknown output format '{0}' (expected one of: srt, vtt, txt, tsv, json)")]
    UnknownOutputFormat(String),

    #[error("unknown task '{0}' (expected 'transcribe' or 'translate')")]
    UnknownTask(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Classify an engine construction failure.
    ///
    /// Missing GPU runtime libraries get an actionable message; everything else keeps the
    /// underlying message unchanged.
    pub fn engine_init(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        if GPU_RUNTIME_MARKERS.iter().any(|m| lowered.contains(m)) {
            Self::GpuUnavailable(message)
        } else {
            Self::EngineInit(message)
        }
    }

    /// Whether this error happened while constructing the engine.
    pub fn is_engine_init(&self) -> bool {
        matches!(self, Self::GpuUnavailable(_) | Self::EngineInit(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}
