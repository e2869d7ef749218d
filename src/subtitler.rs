//! High-level API for turning a media file into a subtitle file.
//!
//! We expose a single entry point (`Subtitler`) that wires up engine → segment loop → encoder:
//! - The engine is loaded lazily on the first run (expensive) and reused afterwards.
//! - Each run resolves a fresh, non-colliding output path next to the source file.
//! - Cancellation is polled between segments only, so each record is written whole.
//!
//! `run` is synchronous and may block for a long time. Callers with a UI or signal handler
//! should call it from a worker thread and flip a [`crate::CancelToken`] from elsewhere.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::backends::whisper::{EngineConfig, WhisperLoader};
use crate::cancel::{CancelPoll, LogSink};
use crate::engine::{DEFAULT_BEAM_SIZE, DecodeOptions, Engine, EngineLoader, Transcription};
use crate::opts::Opts;
use crate::output_path::resolve_output_path;
use crate::segment_encoder::{FileDestination, SegmentEncoder, open_encoder};
use crate::segments::Segment;
use crate::timestamp::{Separator, format_timestamp};
use crate::{Error, Result};

const RULE: &str = "--------------------------------------------------";
const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every segment was written; the output lives at this path.
    Completed(PathBuf),

    /// The caller cancelled between two segments.
    ///
    /// Streaming formats leave a truncated file ending in an interruption marker; JSON leaves no
    /// file at all.
    Cancelled,
}

impl RunOutcome {
    pub fn output_path(&self) -> Option<&Path> {
        match self {
            RunOutcome::Completed(path) => Some(path),
            RunOutcome::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled)
    }
}

/// The main transcription-to-subtitle entry point.
///
/// `Subtitler` owns the engine loader and, after the first run, the loaded engine.
///
/// Typical usage:
/// - Construct once (cheap; nothing is loaded yet).
/// - Call `run` many times; the first call loads the model.
///
/// `run` takes `&mut self`, so one `Subtitler` can never have two runs in flight.
pub struct Subtitler<L: EngineLoader = WhisperLoader> {
    loader: L,
    engine: Option<L::Engine>,
}

impl Subtitler<WhisperLoader> {
    /// Create a `Subtitler` backed by the built-in Whisper engine.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_loader(WhisperLoader::new(config))
    }
}

impl<L: EngineLoader> Subtitler<L> {
    /// Create a `Subtitler` using a custom engine loader.
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            engine: None,
        }
    }

    /// Whether the engine has been loaded by an earlier run.
    pub fn is_loaded(&self) -> bool {
        self.engine.is_some()
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Access the loaded engine, if any.
    pub fn engine(&self) -> Option<&L::Engine> {
        self.engine.as_ref()
    }

    /// Transcribe `opts.file_path` and write the result next to it.
    ///
    /// Lines for a human reader go to `log`; `cancel` is polled before each segment is written.
    /// Engine load failures are returned before any output file exists. Failures after that
    /// leave whatever streaming output was already flushed on disk; JSON output is never written.
    pub fn run<S, C>(&mut self, opts: &Opts, log: &mut S, cancel: &C) -> Result<RunOutcome>
    where
        S: LogSink + ?Sized,
        C: CancelPoll + ?Sized,
    {
        let engine = self.ensure_engine(log)?;

        let started = Instant::now();
        log.emit(RULE);
        log.emit(&format!("Started: {}", Local::now().format(CLOCK_FORMAT)));
        log.emit(&format!("File: {}", display_file_name(&opts.file_path)));
        log.emit(&format!("Task: {}", opts.task.describe()));
        log.emit(&format!(
            "Output format: {}",
            opts.output_type.extension().to_uppercase()
        ));
        info!(
            file = %opts.file_path.display(),
            task = %opts.task,
            format = %opts.output_type,
            "transcription started"
        );

        let initial_prompt = opts.effective_initial_prompt();
        if let Some(prompt) = initial_prompt {
            log.emit(&format!("Initial prompt: {prompt}"));
        }

        let decode_opts = DecodeOptions {
            beam_size: DEFAULT_BEAM_SIZE,
            task: opts.task,
            initial_prompt,
        };
        let Transcription { info, segments } = engine.transcribe(&opts.file_path, &decode_opts)?;

        log.emit(&format!(
            "Detected language: {} (probability: {:.2})",
            info.language.to_uppercase(),
            info.language_probability
        ));
        info!(
            language = %info.language,
            probability = info.language_probability,
            "language detected"
        );

        let output_path = resolve_output_path(&opts.file_path, opts.task, opts.output_type);
        debug!(path = %output_path.display(), "resolved output path");

        let mut encoder = open_encoder(opts.output_type, FileDestination::new(&output_path))?;
        let consumed = encoder
            .begin()
            .and_then(|()| consume_segments(segments, encoder.as_mut(), log, cancel));

        match consumed {
            Ok(Consumed::Exhausted { written }) => {
                encoder.close()?;

                let elapsed = started.elapsed();
                log.emit(RULE);
                log.emit(&format!("Finished: {}", Local::now().format(CLOCK_FORMAT)));
                log.emit(&format!("Elapsed: {}", format_elapsed(elapsed)));
                log.emit(&format!("Saved to: {}", output_path.display()));
                info!(
                    path = %output_path.display(),
                    segments = written,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "transcription finished"
                );

                Ok(RunOutcome::Completed(output_path))
            }
            Ok(Consumed::Cancelled { written }) => {
                log.emit(">>> Cancelled by user <<<");
                encoder.interrupt()?;
                info!(segments = written, "transcription cancelled");

                Ok(RunOutcome::Cancelled)
            }
            Err(err) => {
                warn!(error = %err, path = %output_path.display(), "transcription failed");

                // Streamed records are already on disk and stay there. A buffered document
                // would look complete, so it is dropped instead.
                let released = if opts.output_type.is_streaming() {
                    encoder.close()
                } else {
                    encoder.interrupt()
                };
                merge_run_and_close(Err(err), released)
            }
        }
    }

    fn ensure_engine<S>(&mut self, log: &mut S) -> Result<&mut L::Engine>
    where
        S: LogSink + ?Sized,
    {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => self.load_engine(log)?,
        };
        Ok(self.engine.insert(engine))
    }

    fn load_engine<S>(&self, log: &mut S) -> Result<L::Engine>
    where
        S: LogSink + ?Sized,
    {
        let description = self.loader.describe();
        log.emit(&format!("Loading model: {description}..."));
        info!(engine = %description, "loading engine");

        let engine = self.loader.load().map_err(|err| {
            if err.is_engine_init() {
                err
            } else {
                Error::engine_init(err.to_string())
            }
        });

        match engine {
            Ok(engine) => {
                log.emit("Model loaded.");
                Ok(engine)
            }
            Err(err @ Error::GpuUnavailable(_)) => {
                log.emit("Error: GPU libraries are missing, switch the device to CPU.");
                warn!(error = %err, "engine load failed");
                Err(err)
            }
            Err(err) => {
                log.emit(&format!("Failed to load model: {err}"));
                warn!(error = %err, "engine load failed");
                Err(err)
            }
        }
    }
}

enum Consumed {
    Exhausted { written: usize },
    Cancelled { written: usize },
}

/// Drive the segment sequence into `encoder`, polling `cancel` before each write.
fn consume_segments<I, S, C>(
    segments: I,
    encoder: &mut dyn SegmentEncoder,
    log: &mut S,
    cancel: &C,
) -> Result<Consumed>
where
    I: Iterator<Item = Result<Segment>>,
    S: LogSink + ?Sized,
    C: CancelPoll + ?Sized,
{
    let mut written = 0;

    for (index, item) in segments.enumerate() {
        if cancel.is_cancelled() {
            return Ok(Consumed::Cancelled { written });
        }

        let seg = item?.trimmed();

        // The run log always uses the SRT-style clock, whatever the output format.
        let clock = format_timestamp(seg.start_seconds, Separator::Comma);
        log.emit(&format!("[{clock}] {}", seg.text));
        debug!(
            index,
            start = seg.start_seconds,
            end = seg.end_seconds,
            "segment"
        );

        encoder.write_segment(index, &seg)?;
        written += 1;
    }

    Ok(Consumed::Exhausted { written })
}

fn merge_run_and_close<T>(run_res: Result<T>, close_res: Result<()>) -> Result<T> {
    match (run_res, close_res) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "failed to close output after an earlier error");
            Err(err)
        }
    }
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render a duration as `H:MM:SS[.ffffff]`.
fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let micros = elapsed.subsec_micros();
    let (h, m, s) = (secs / 3_600, (secs % 3_600) / 60, secs % 60);

    if micros == 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{h}:{m:02}:{s:02}.{micros:06}")
    }
}
