//! Integration tests for the render-then-export pipeline.
//!
//! Tests the complete flow:
//! 1. Render every clip with a fixed seed
//! 2. Export through the exporter, with and without a transcoder
//! 3. Read the files back and check the PCM data

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use proc_sfx::{
    to_pcm_i16, Clip, ExportFormat, Exporter, Synth, SynthConfig, TranscodeError,
    TranscodeSettings, Transcoder,
};

/// Stands in for an encoder that is not installed
struct NoEncoder;

impl Transcoder for NoEncoder {
    fn transcode(
        &self,
        _input: &Path,
        _output: &Path,
        _settings: &TranscodeSettings,
    ) -> Result<(), TranscodeError> {
        Err(TranscodeError::NotFound("ffmpeg".to_string()))
    }
}

/// Copies the WAV bytes verbatim, like a lossless "encoder"
struct CopyEncoder;

impl Transcoder for CopyEncoder {
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        _settings: &TranscodeSettings,
    ) -> Result<(), TranscodeError> {
        fs::copy(input, output).map_err(TranscodeError::Spawn)?;
        Ok(())
    }
}

fn read_pcm(path: &Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

#[test]
fn test_all_clips_export_as_wav() {
    let dir = tempdir().unwrap();
    let synth = Synth::new(SynthConfig::default());
    let exporter = Exporter::new(dir.path().join("sounds"));

    for clip in Clip::ALL {
        let rendered = synth.render(clip, clip.default_duration(), Some(7)).unwrap();
        let file = exporter.export(clip.name(), &rendered.buffer).unwrap();

        assert_eq!(file.format, ExportFormat::Wav);
        assert_eq!(
            file.path.file_name().unwrap().to_string_lossy(),
            format!("{}.wav", clip.name())
        );

        let (spec, samples) = read_pcm(&file.path);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(samples.len() / 2, file.frames);
        assert_eq!(samples, to_pcm_i16(&rendered.buffer.samples));
    }
}

#[test]
fn test_fallback_keeps_expected_names() {
    let dir = tempdir().unwrap();
    let synth = Synth::default();
    let exporter = Exporter::new(dir.path()).with_transcoder(NoEncoder);

    let rendered = synth.render(Clip::ImpactBoom, 0.8, Some(3)).unwrap();
    let file = exporter.export(Clip::ImpactBoom.name(), &rendered.buffer).unwrap();

    assert_eq!(file.path, dir.path().join("big-bang-impact.mp3"));
    assert_eq!(file.format, ExportFormat::Wav);

    // The renamed file still carries the exact PCM data
    let (spec, samples) = read_pcm(&file.path);
    assert_eq!(spec.channels, 2);
    assert_eq!(samples.len(), 35280 * 2);

    let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
    let expected = (10f32.powf(-3.0 / 20.0) * i16::MAX as f32) as u16;
    assert!(peak.abs_diff(expected) <= 4, "peak {}", peak);

    let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(remaining.len(), 1);
}

#[test]
fn test_transcoded_output_replaces_wav() {
    let dir = tempdir().unwrap();
    let synth = Synth::default();
    let exporter = Exporter::new(dir.path()).with_transcoder(CopyEncoder);

    let rendered = synth.render(Clip::StellarChime, 0.25, None).unwrap();
    let file = exporter.export(Clip::StellarChime.name(), &rendered.buffer).unwrap();

    assert_eq!(file.format, ExportFormat::Compressed);
    assert!(file.path.ends_with("stellar-twinkle.mp3"));
    assert!(!dir.path().join("stellar-twinkle.wav").exists());
    assert_eq!(file.size_bytes, fs::metadata(&file.path).unwrap().len());
}

#[test]
fn test_seeded_renders_are_reproducible_on_disk() {
    let synth = Synth::default();
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();

    for dir in [&first, &second] {
        let rendered = synth.render(Clip::AmbientDrone, 2.0, Some(11)).unwrap();
        Exporter::new(dir.path())
            .export(Clip::AmbientDrone.name(), &rendered.buffer)
            .unwrap();
    }

    let a = fs::read(first.path().join("space-ambient.wav")).unwrap();
    let b = fs::read(second.path().join("space-ambient.wav")).unwrap();
    assert_eq!(a, b);
}
