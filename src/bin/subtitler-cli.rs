use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use tracing::{error, info};

use subtitler::{
    CancelToken, Device, EngineConfig, ModelSize, Opts, OutputType, RunOutcome, Subtitler, Task,
};

/// Initial prompt that nudges Whisper toward Traditional Chinese (Taiwan) output.
const TRADITIONAL_CHINESE_PROMPT: &str = "以下是使用台灣繁體中文撰寫的字幕。";

#[derive(Parser, Debug)]
#[command(name = "subtitler")]
#[command(about = "Generate subtitles for a local audio/video file")]
struct Params {
    /// Audio or video file to transcribe. Output is written next to it.
    input: PathBuf,

    /// Path to a whisper.cpp model file. Takes precedence over `--model-size`.
    #[arg(short = 'm', long = "model")]
    model_path: Option<PathBuf>,

    /// Model size to look up in `--models-dir` when `--model` is not given.
    #[arg(long = "model-size", value_enum, default_value_t = ModelSize::Small)]
    model_size: ModelSize,

    /// Directory holding `ggml-<size>.bin` model files.
    #[arg(long = "models-dir", default_value = "models")]
    models_dir: PathBuf,

    #[arg(short = 'd', long = "device", value_enum, default_value_t = Device::Cpu)]
    device: Device,

    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputType::Srt)]
    output_type: OutputType,

    /// Translate the speech to English instead of transcribing it.
    #[arg(short = 't', long = "translate", default_value_t = false)]
    translate: bool,

    /// Initial prompt used to bias transcription. Ignored with `--translate`.
    #[arg(short = 'p', long = "prompt")]
    initial_prompt: Option<String>,

    /// Prefer Traditional Chinese characters. Ignored with `--translate`.
    #[arg(long = "traditional-chinese", conflicts_with = "initial_prompt")]
    traditional_chinese: bool,

    /// Inference threads (defaults to the number of logical CPUs).
    #[arg(long = "threads")]
    threads: Option<usize>,
}

impl Params {
    fn opts(&self) -> Opts {
        let task = if self.translate {
            Task::Translate
        } else {
            Task::Transcribe
        };

        let initial_prompt = if self.traditional_chinese {
            Some(TRADITIONAL_CHINESE_PROMPT.to_owned())
        } else {
            self.initial_prompt.clone()
        };

        Opts {
            file_path: self.input.clone(),
            output_type: self.output_type,
            task,
            initial_prompt,
        }
    }

    fn engine_config(&self) -> EngineConfig {
        let config = match &self.model_path {
            Some(path) => EngineConfig::new(path),
            None => EngineConfig::from_size(&self.models_dir, self.model_size),
        };
        let config = config.with_device(self.device);
        match self.threads {
            Some(threads) => config.with_threads(threads),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    subtitler::init_logging();

    match run(Params::parse()).await {
        Ok(RunOutcome::Completed(path)) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Cancelled) => {
            eprintln!("cancelled");
            ExitCode::from(130)
        }
        Err(err) => {
            error!(error = ?err, "subtitler-cli failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(params: Params) -> Result<RunOutcome> {
    ensure!(
        params.input.is_file(),
        "input file not found: {}",
        params.input.display()
    );

    let opts = params.opts();
    let config = params.engine_config();
    let token = CancelToken::new();

    // Ctrl-C only flips the token; the worker stops at the next segment boundary.
    let signal_token = token.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Stopping after the current segment...");
            info!("cancellation requested");
            signal_token.cancel();
        }
    });

    let worker = tokio::task::spawn_blocking(move || {
        let mut subtitler = Subtitler::new(config);
        let mut log = |line: &str| eprintln!("{line}");
        subtitler.run(&opts, &mut log, &token)
    });

    let outcome = worker.await.context("transcription worker panicked");
    signal_task.abort();

    Ok(outcome??)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_desktop_tool() -> anyhow::Result<()> {
        let params = Params::try_parse_from(["subtitler", "talk.mp4"])?;
        let opts = params.opts();
        assert_eq!(opts.output_type, OutputType::Srt);
        assert_eq!(opts.task, Task::Transcribe);
        assert_eq!(opts.initial_prompt, None);

        let config = params.engine_config();
        assert_eq!(config.model_path, PathBuf::from("models/ggml-small.bin"));
        assert_eq!(config.device, Device::Cpu);
        Ok(())
    }

    #[test]
    fn explicit_model_wins_over_size() -> anyhow::Result<()> {
        let params = Params::try_parse_from([
            "subtitler",
            "talk.mp4",
            "--model",
            "/m/custom.bin",
            "--model-size",
            "large-v3",
            "--device",
            "gpu",
            "--threads",
            "2",
        ])?;
        let config = params.engine_config();
        assert_eq!(config.model_path, PathBuf::from("/m/custom.bin"));
        assert_eq!(config.device, Device::Gpu);
        assert_eq!(config.threads, 2);
        Ok(())
    }

    #[test]
    fn traditional_chinese_sets_prompt_and_conflicts_with_custom_prompt() -> anyhow::Result<()> {
        let params = Params::try_parse_from(["subtitler", "a.mp4", "--traditional-chinese"])?;
        assert_eq!(
            params.opts().initial_prompt.as_deref(),
            Some(TRADITIONAL_CHINESE_PROMPT)
        );

        let res = Params::try_parse_from([
            "subtitler",
            "a.mp4",
            "--traditional-chinese",
            "--prompt",
            "x",
        ]);
        assert!(res.is_err());
        Ok(())
    }

    #[test]
    fn translate_flag_and_format() -> anyhow::Result<()> {
        let params = Params::try_parse_from(["subtitler", "a.mp4", "-t", "-f", "json"])?;
        let opts = params.opts();
        assert_eq!(opts.task, Task::Translate);
        assert_eq!(opts.output_type, OutputType::Json);
        Ok(())
    }
}
