use std::os::raw::c_int;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use whisper_rs::{FullParams, SamplingStrategy, SegmentCallbackData, WhisperContext, WhisperState};

use crate::engine::DecodeOptions;
use crate::opts::Task;
use crate::segments::{DetectionInfo, Segment};

/// Language code used when detection is impossible (e.g. silent or empty input).
///
/// Prefers `"und"` (“undetermined”) because it's the usual convention in language tagging.
const UNDETERMINED_LANGUAGE: &str = "und";

/// Segments buffered between the decode thread and the consumer before whisper blocks.
const SEGMENT_CHANNEL_CAPACITY: usize = 16;

/// Owned copy of the decoding parameters, so they can move onto the decode thread.
struct DecodeJob {
    beam_size: usize,
    task: Task,
    initial_prompt: Option<String>,
    language: Option<&'static str>,
    threads: usize,
}

/// Segments yielded while whisper is still decoding the rest of the file.
///
/// `full()` runs on a dedicated thread and hands each new segment over a bounded channel.
/// Dropping the iterator early asks whisper to abort and waits for the thread to exit, so a
/// cancelled run stops decoding instead of finishing the file in the background.
pub struct WhisperSegments {
    rx: Option<mpsc::Receiver<crate::Result<Segment>>>,
    abort: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl WhisperSegments {
    fn empty() -> Self {
        Self {
            rx: None,
            abort: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    fn join_worker(&mut self) -> crate::Result<()> {
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| crate::Error::Engine("whisper decode thread panicked".to_owned())),
            None => Ok(()),
        }
    }
}

impl Iterator for WhisperSegments {
    type Item = crate::Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        let rx = self.rx.as_ref()?;
        match rx.recv() {
            Ok(item) => Some(item),
            // The decode thread hung up: whisper is done (or failed and already said so).
            Err(mpsc::RecvError) => {
                self.rx = None;
                self.join_worker().err().map(Err)
            }
        }
    }
}

impl Drop for WhisperSegments {
    fn drop(&mut self) {
        self.abort.store(true, Ordering::Relaxed);
        // Unblock a decode thread waiting on a full channel before joining it.
        self.rx = None;
        let _ = self.join_worker();
    }
}

/// Run language detection, then start decoding `samples` on a background thread.
pub(super) fn run_whisper(
    ctx: &WhisperContext,
    opts: &DecodeOptions<'_>,
    threads: usize,
    samples: Vec<f32>,
) -> Result<(DetectionInfo, WhisperSegments)> {
    if samples.is_empty() {
        let info = DetectionInfo {
            language: UNDETERMINED_LANGUAGE.to_owned(),
            language_probability: 0.0,
        };
        return Ok((info, WhisperSegments::empty()));
    }

    let mut state = ctx
        .create_state()
        .context("failed to create whisper state")?;

    let (info, language) = detect_language(&mut state, threads, &samples)?;

    let job = DecodeJob {
        beam_size: opts.beam_size,
        task: opts.task,
        initial_prompt: opts.initial_prompt.map(str::to_owned),
        language,
        threads,
    };
    let segments = spawn_decode(state, job, samples)?;

    Ok((info, segments))
}

fn spawn_decode(
    mut state: WhisperState,
    job: DecodeJob,
    samples: Vec<f32>,
) -> Result<WhisperSegments> {
    let (tx, rx) = mpsc::sync_channel(SEGMENT_CHANNEL_CAPACITY);
    let abort = Arc::new(AtomicBool::new(false));
    let worker_abort = Arc::clone(&abort);

    let worker = thread::Builder::new()
        .name("whisper-decode".to_owned())
        .spawn(move || {
            let mut params = build_full_params(&job);

            let segment_tx = tx.clone();
            let hung_up = Arc::clone(&worker_abort);
            params.set_segment_callback_safe_lossy(move |data: SegmentCallbackData| {
                let seg = Segment {
                    start_seconds: centiseconds_to_seconds(data.start_timestamp),
                    end_seconds: centiseconds_to_seconds(data.end_timestamp),
                    text: data.text,
                };
                if segment_tx.send(Ok(seg)).is_err() {
                    hung_up.store(true, Ordering::Relaxed);
                }
            });

            let stop = Arc::clone(&worker_abort);
            params.set_abort_callback_safe(move || stop.load(Ordering::Relaxed));

            if let Err(err) = state.full(params, &samples) {
                // An abort we asked for is not a failure.
                if !worker_abort.load(Ordering::Relaxed) {
                    let _ = tx.send(Err(crate::Error::Engine(format!(
                        "failed to run whisper full(): {err}"
                    ))));
                }
            }
        })
        .context("failed to spawn whisper decode thread")?;

    Ok(WhisperSegments {
        rx: Some(rx),
        abort,
        worker: Some(worker),
    })
}

/// Detect the spoken language from the first 30 s window.
///
/// Returns the detection metadata plus the whisper language code to pin for decoding, so the
/// full pass doesn't detect a second time.
fn detect_language(
    state: &mut WhisperState,
    threads: usize,
    samples: &[f32],
) -> Result<(DetectionInfo, Option<&'static str>)> {
    state
        .pcm_to_mel(samples, threads)
        .context("failed to compute mel spectrogram")?;
    let (lang_id, probs) = state
        .lang_detect(0, threads)
        .context("failed to detect language")?;

    let lang = whisper_rs::get_lang_str(lang_id);
    let probability = usize::try_from(lang_id)
        .ok()
        .and_then(|idx| probs.get(idx).copied())
        .unwrap_or(0.0);

    let info = DetectionInfo {
        language: lang.unwrap_or(UNDETERMINED_LANGUAGE).to_owned(),
        language_probability: probability.clamp(0.0, 1.0),
    };
    Ok((info, lang))
}

fn build_full_params(job: &DecodeJob) -> FullParams<'static, 'static> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: job.beam_size as c_int,
        patience: 1.0,
    });

    params.set_n_threads(job.threads as c_int);
    params.set_translate(matches!(job.task, Task::Translate));
    params.set_language(job.language);
    if let Some(prompt) = job.initial_prompt.as_deref() {
        params.set_initial_prompt(prompt);
    }
    params.set_no_context(true);
    params.set_single_segment(false);

    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    params
}

/// whisper reports segment times in centiseconds and uses -1 for unknown.
fn centiseconds_to_seconds(value: i64) -> f64 {
    if value < 0 { 0.0 } else { value as f64 / 100.0 }
}
