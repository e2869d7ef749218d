//! Caller-facing hooks: cooperative cancellation and the run log.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A read-only view of the caller's cancellation state.
///
/// [`crate::Subtitler::run`] polls this once before each segment and nowhere else, so a single
/// segment's record is never cut short.
pub trait CancelPoll {
    fn is_cancelled(&self) -> bool;
}

impl<F> CancelPoll for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A cloneable cancellation flag owned by the caller.
///
/// The flag only ever goes from "running" to "cancelled"; there is no way to reset it. Create a
/// fresh token for each run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl CancelPoll for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Receives the human-readable run log, one line at a time.
///
/// Called synchronously from the thread running the transcription; forwarding lines to another
/// thread (a UI, a channel) is the implementor's job.
pub trait LogSink {
    fn emit(&mut self, line: &str);
}

impl<F> LogSink for F
where
    F: FnMut(&str),
{
    fn emit(&mut self, line: &str) {
        self(line)
    }
}
