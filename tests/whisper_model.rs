//! End-to-end runs against a real whisper.cpp model.
//!
//! Needs `./models/ggml-tiny.bin`; run with `cargo test -- --ignored`.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use subtitler::{EngineConfig, ModelSize, Opts, OutputType, RunOutcome, Subtitler, Task};

fn write_silent_wav(path: &Path, seconds: u32) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for _ in 0..spec.sample_rate * seconds {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
#[ignore = "needs ./models/ggml-tiny.bin"]
fn silent_wav_produces_valid_json_and_reuses_the_model() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("silence.wav");
    write_silent_wav(&source, 2)?;

    let mut subtitler = Subtitler::new(EngineConfig::from_size("./models", ModelSize::Tiny));
    let never = || false;

    let outcome = subtitler.run(&Opts::new(&source, OutputType::Json), &mut |_: &str| {}, &never)?;
    let path = dir.path().join("silence.json");
    assert_eq!(outcome, RunOutcome::Completed(path.clone()));
    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert!(parsed.is_array());

    let opts = Opts::new(&source, OutputType::Srt).with_task(Task::Translate);
    let outcome = subtitler.run(&opts, &mut |_: &str| {}, &never)?;
    assert_eq!(
        outcome.output_path(),
        Some(dir.path().join("silence.en.srt").as_path())
    );
    assert!(subtitler.is_loaded());
    Ok(())
}
