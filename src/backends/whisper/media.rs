//! Decode a local media file into the mono 16 kHz `f32` buffer whisper.cpp expects.
//!
//! The whole file is decoded up front: whisper runs one full pass over contiguous samples.
//! Probing uses a seekable `File` so containers that keep their index at the end (MP4/MOV)
//! work too.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// whisper.cpp's input sample rate (Hz).
pub(super) const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Source frames fed to the resampler per call.
const RESAMPLE_CHUNK_FRAMES: usize = 2048;

pub(super) fn decode_to_mono_16k(path: &Path) -> Result<Vec<f32>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open media file '{}'", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| anyhow!(e))
        .context("failed to probe media file")?;
    let mut format = probed.format;

    // First track that looks decodable and has a known sample rate.
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .cloned()
        .ok_or_else(|| anyhow!("no audio track found"))?;
    let src_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| anyhow!("audio track has no sample rate"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| anyhow!(e))
        .context("failed to create decoder for audio track")?;

    let mut mono = Vec::new();
    let mut scratch: Option<(SampleBuffer<f32>, usize)> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // Symphonia reports end-of-stream as an I/O error.
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(anyhow!(e)).context("failed reading packet"),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frame; skip it and keep going.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(anyhow!(e)).context("decoder failure"),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            bail!("decoded audio had zero channels");
        }

        let frames = decoded.capacity();
        if scratch.as_ref().is_none_or(|(_, capacity)| *capacity < frames) {
            scratch = Some((SampleBuffer::new(frames as u64, spec), frames));
        }
        let Some((buf, _)) = scratch.as_mut() else {
            bail!("sample buffer not initialized");
        };
        buf.copy_interleaved_ref(decoded);
        downmix_into(buf.samples(), channels, &mut mono);
    }

    if src_rate == TARGET_SAMPLE_RATE {
        return Ok(mono);
    }
    resample_to_target(&mono, src_rate)
}

/// Average interleaved channels into `out`, one value per frame.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }

    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

fn resample_to_target(mono: &[f32], src_rate: u32) -> Result<Vec<f32>> {
    let mut resampler = SincFixedIn::<f32>::new(
        TARGET_SAMPLE_RATE as f64 / src_rate as f64,
        2.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        RESAMPLE_CHUNK_FRAMES,
        1,
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let expected = (mono.len() as u64 * TARGET_SAMPLE_RATE as u64 / src_rate as u64) as usize;
    let delay = resampler.output_delay();
    let in_max = resampler.input_frames_max();

    let mut out = Vec::with_capacity(expected + delay);
    let mut block = vec![0.0f32; in_max];
    let mut pos = 0;

    // Keep feeding (zero-padded past the end) until the delayed tail has come out.
    while out.len() < expected + delay {
        block.fill(0.0);
        if pos < mono.len() {
            let end = (pos + in_max).min(mono.len());
            block[..end - pos].copy_from_slice(&mono[pos..end]);
        }
        pos += in_max;

        let resampled = resampler
            .process(&[block.as_slice()], None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;
        let Some(channel) = resampled.first() else {
            bail!("expected mono output from resampler");
        };
        out.extend_from_slice(channel);
    }

    out.drain(..delay.min(out.len()));
    out.truncate(expected);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) -> anyhow::Result<()> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec)?;
        for &s in samples {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
        Ok(())
    }

    #[test]
    fn downmix_averages_channels() {
        let mut out = Vec::new();
        downmix_into(&[1.0, 3.0, -1.0, 1.0], 2, &mut out);
        assert_eq!(out, vec![2.0, 0.0]);

        downmix_into(&[0.5], 1, &mut out);
        assert_eq!(out, vec![2.0, 0.0, 0.5]);
    }

    #[test]
    fn resample_produces_target_length() -> anyhow::Result<()> {
        let one_second_8k = vec![0.0f32; 8_000];
        let out = resample_to_target(&one_second_8k, 8_000)?;
        assert_eq!(out.len(), 16_000);

        let out = resample_to_target(&[], 44_100)?;
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn decodes_16k_mono_wav_without_resampling() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");
        let samples: Vec<i16> = (0..1_600).map(|i| ((i % 100) * 100) as i16).collect();
        write_wav(&path, 16_000, 1, &samples)?;

        let decoded = decode_to_mono_16k(&path)?;
        assert_eq!(decoded.len(), samples.len());
        Ok(())
    }

    #[test]
    fn stereo_8k_wav_is_downmixed_and_resampled() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");
        // Half a second of interleaved left/right frames.
        let samples: Vec<i16> = (0..8_000).map(|i| if i % 2 == 0 { 1_000 } else { -1_000 }).collect();
        write_wav(&path, 8_000, 2, &samples)?;

        let decoded = decode_to_mono_16k(&path)?;
        assert_eq!(decoded.len(), 8_000);
        Ok(())
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = decode_to_mono_16k(Path::new("/definitely/not/here.mp4")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.mp4"));
    }
}
