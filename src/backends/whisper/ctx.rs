use std::path::Path;

use anyhow::{Context, Result, anyhow};
use whisper_rs::{WhisperContext, WhisperContextParameters};

use super::Device;
use super::logging::silence_whisper_logging;

/// Load a whisper.cpp model on the requested device.
pub(super) fn load_context(model_path: &Path, device: Device) -> Result<WhisperContext> {
    silence_whisper_logging();

    let model_path_str = model_path
        .to_str()
        .ok_or_else(|| anyhow!("model path is not valid UTF-8: {}", model_path.display()))?;

    let mut ctx_params = WhisperContextParameters::default();
    ctx_params.use_gpu(matches!(device, Device::Gpu));

    let ctx = WhisperContext::new_with_params(model_path_str, ctx_params)
        .with_context(|| format!("failed to load model from path: {model_path_str}"))?;

    Ok(ctx)
}
