/// Built-in ASR engines.
pub mod whisper;
