use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use clap::ValueEnum;
use tracing::debug;
use whisper_rs::WhisperContext;

use crate::engine::{DecodeOptions, Engine, EngineLoader, Transcription};
use crate::{Error, Result};

mod ctx;
mod logging;
mod media;
mod segments;

pub use segments::WhisperSegments;

/// Where whisper.cpp runs its inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum Device {
    #[default]
    Cpu,

    /// Requires whisper-rs built with a GPU feature (`cuda`, `metal`, `vulkan`, …).
    Gpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Gpu => f.write_str("gpu"),
        }
    }
}

/// The standard whisper.cpp model sizes. Bigger is more accurate and slower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum ModelSize {
    Tiny,
    Base,
    #[default]
    Small,
    Medium,
    #[cfg_attr(feature = "cli", value(name = "large-v3"))]
    LargeV3,
}

impl ModelSize {
    /// The conventional ggml file name for this size, e.g. `ggml-small.bin`.
    pub fn file_name(self) -> &'static str {
        match self {
            ModelSize::Tiny => "ggml-tiny.bin",
            ModelSize::Base => "ggml-base.bin",
            ModelSize::Small => "ggml-small.bin",
            ModelSize::Medium => "ggml-medium.bin",
            ModelSize::LargeV3 => "ggml-large-v3.bin",
        }
    }
}

/// How to construct the Whisper engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Path to a whisper.cpp model file.
    pub model_path: PathBuf,

    pub device: Device,

    /// Inference threads; defaults to the number of logical CPUs.
    pub threads: usize,
}

impl EngineConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            device: Device::default(),
            threads: num_cpus::get(),
        }
    }

    /// Use the conventionally named model of `size` inside `models_dir`.
    pub fn from_size(models_dir: impl AsRef<Path>, size: ModelSize) -> Self {
        Self::new(models_dir.as_ref().join(size.file_name()))
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

/// Loads a [`WhisperEngine`] from an [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct WhisperLoader {
    config: EngineConfig,
}

impl WhisperLoader {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl EngineLoader for WhisperLoader {
    type Engine = WhisperEngine;

    fn describe(&self) -> String {
        format!(
            "{} (device: {})",
            self.config.model_path.display(),
            self.config.device
        )
    }

    fn load(&self) -> Result<WhisperEngine> {
        if self.config.model_path.as_os_str().is_empty() {
            return Err(Error::EngineInit("model path must be provided".to_owned()));
        }

        let ctx = ctx::load_context(&self.config.model_path, self.config.device)
            .map_err(|err| Error::engine_init(format!("{err:#}")))?;

        Ok(WhisperEngine {
            ctx,
            threads: self.config.threads,
        })
    }
}

/// Built-in engine powered by `whisper-rs` / `whisper.cpp`.
pub struct WhisperEngine {
    ctx: WhisperContext,
    threads: usize,
}

impl WhisperEngine {
    /// Access the underlying Whisper context.
    pub fn context(&self) -> &WhisperContext {
        &self.ctx
    }
}

impl Engine for WhisperEngine {
    type Segments<'a>
        = WhisperSegments
    where
        Self: 'a;

    fn transcribe<'a>(
        &'a mut self,
        media_path: &Path,
        opts: &DecodeOptions<'_>,
    ) -> Result<Transcription<WhisperSegments>> {
        let samples = media::decode_to_mono_16k(media_path)
            .map_err(|err| Error::Engine(format!("{err:#}")))?;
        debug!(
            samples = samples.len(),
            seconds = samples.len() as f64 / media::TARGET_SAMPLE_RATE as f64,
            "decoded media"
        );

        let (info, segments) = segments::run_whisper(&self.ctx, opts, self.threads, samples)
            .map_err(|err| Error::Engine(format!("{err:#}")))?;

        Ok(Transcription { info, segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_size_uses_conventional_file_name() {
        let config = EngineConfig::from_size("/models", ModelSize::LargeV3);
        assert_eq!(config.model_path, PathBuf::from("/models/ggml-large-v3.bin"));
        assert_eq!(config.device, Device::Cpu);
        assert!(config.threads >= 1);
    }

    #[test]
    fn describe_names_model_and_device() {
        let loader = WhisperLoader::new(EngineConfig::new("m.bin").with_device(Device::Gpu));
        assert_eq!(loader.describe(), "m.bin (device: gpu)");
    }

    #[test]
    fn load_fails_before_touching_whisper_for_empty_path() {
        let err = WhisperLoader::new(EngineConfig::new("")).load().err();
        assert!(matches!(err, Some(Error::EngineInit(_))));
    }

    #[test]
    fn load_reports_missing_model_as_init_failure() {
        let err = WhisperLoader::new(EngineConfig::new("/no/such/model.bin"))
            .load()
            .err();
        assert!(matches!(err, Some(Error::EngineInit(_))));
    }
}
