//! PCM conversion, WAV writing and the clip exporter

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::error::{Result, SynthError};
use crate::stereo::upmix;
use crate::transcode::{TranscodeSettings, Transcoder};
use crate::AudioBuffer;

/// Convert f32 samples (-1.0 to 1.0) to PCM i16
///
/// # Arguments
/// * `samples` - Audio samples in -1.0 to 1.0 range
///
/// # Returns
/// Vector of i16 PCM samples
pub fn to_pcm_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| {
            // Clamp to -1.0 to 1.0 range
            let clamped = s.clamp(-1.0, 1.0);
            // Convert to i16 range
            (clamped * i16::MAX as f32) as i16
        })
        .collect()
}

/// Write a buffer to a 16-bit integer PCM WAV file
///
/// Channel count and sample rate come from the buffer; stereo samples are
/// already interleaved.
pub fn write_wav(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    use hound::{SampleFormat, WavSpec, WavWriter};

    let spec = WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for sample in to_pcm_i16(&buffer.samples) {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(())
}

/// Container of an exported file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// 16-bit PCM WAV data
    Wav,
    /// Output of the transcoder
    Compressed,
}

/// A finished clip on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// Final location
    pub path: PathBuf,
    /// What the file actually contains
    ///
    /// A failed transcode leaves WAV data under the compressed name.
    pub format: ExportFormat,
    /// Sample frames written
    pub frames: usize,
    /// File size after writing
    pub size_bytes: u64,
}

impl ExportedFile {
    /// Size in kilobytes, for reporting
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Writes rendered clips into an output directory
///
/// Every clip is written as a stereo WAV first. With a transcoder attached,
/// the WAV is then encoded to `<name>.<extension>`; on success the WAV is
/// removed, on failure it is renamed to the compressed name so the expected
/// file always exists.
pub struct Exporter {
    output_dir: PathBuf,
    transcoder: Option<Box<dyn Transcoder>>,
    settings: TranscodeSettings,
}

impl Exporter {
    /// Exporter writing plain WAV files into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            transcoder: None,
            settings: TranscodeSettings::default(),
        }
    }

    /// Encode every clip with `transcoder`
    pub fn with_transcoder(mut self, transcoder: impl Transcoder + 'static) -> Self {
        self.transcoder = Some(Box::new(transcoder));
        self
    }

    /// Replace the encoder settings
    pub fn with_settings(mut self, settings: TranscodeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn settings(&self) -> &TranscodeSettings {
        &self.settings
    }

    /// Write one clip and return where it ended up
    ///
    /// # Errors
    /// [`SynthError::Io`] if the output directory cannot be created or the
    /// files cannot be moved, [`SynthError::Wav`] if the WAV cannot be
    /// written. Transcoder failures are not errors.
    #[instrument(skip(self, buffer), fields(frames = buffer.frames()))]
    pub fn export(&self, name: &str, buffer: &AudioBuffer) -> Result<ExportedFile> {
        fs::create_dir_all(&self.output_dir).map_err(|e| SynthError::io(&self.output_dir, e))?;

        let stereo = upmix(buffer);
        let wav_path = self.output_dir.join(format!("{name}.wav"));
        write_wav(&wav_path, &stereo)?;

        let (path, format) = match self.compressed_target(name) {
            Some((transcoder, target)) => {
                match transcoder.transcode(&wav_path, &target, &self.settings) {
                    Ok(()) => {
                        fs::remove_file(&wav_path).map_err(|e| SynthError::io(&wav_path, e))?;
                        (target, ExportFormat::Compressed)
                    }
                    Err(err) => {
                        warn!(%err, "Transcode failed, keeping WAV data as {}", target.display());
                        fs::rename(&wav_path, &target).map_err(|e| SynthError::io(&target, e))?;
                        (target, ExportFormat::Wav)
                    }
                }
            }
            None => (wav_path, ExportFormat::Wav),
        };

        let size_bytes = fs::metadata(&path)
            .map_err(|e| SynthError::io(&path, e))?
            .len();
        info!(path = %path.display(), size_bytes, ?format, "Exported clip");

        Ok(ExportedFile {
            path,
            format,
            frames: stereo.frames(),
            size_bytes,
        })
    }

    /// Transcoder and target path, unless the target would be the WAV itself
    fn compressed_target(&self, name: &str) -> Option<(&dyn Transcoder, PathBuf)> {
        let transcoder = self.transcoder.as_deref()?;
        let extension = self.settings.extension.trim_start_matches('.');
        if extension.eq_ignore_ascii_case("wav") {
            return None;
        }
        Some((transcoder, self.output_dir.join(format!("{name}.{extension}"))))
    }
}
