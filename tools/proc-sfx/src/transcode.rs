//! External transcoding of exported WAV files
//!
//! The exporter only knows the [`Transcoder`] trait. [`FfmpegTranscoder`] is
//! the stock implementation; tests and callers without an encoder can supply
//! their own.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Encoder settings shared by every clip in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSettings {
    /// Target bitrate, passed through verbatim (e.g. "128k")
    pub bitrate: String,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Extension of the compressed file, without the dot
    pub extension: String,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            bitrate: "128k".to_string(),
            sample_rate: crate::SAMPLE_RATE,
            extension: "mp3".to_string(),
        }
    }
}

/// Errors from an external encoder
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Encoder '{0}' not found")]
    NotFound(String),

    #[error("Failed to launch encoder: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Encoder exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("No audio codec for '.{0}' files")]
    UnsupportedFormat(String),
}

/// ffmpeg audio codec that produces files with `extension`
///
/// ```
/// assert_eq!(proc_sfx::codec_for("ogg"), Some("libvorbis"));
/// assert_eq!(proc_sfx::codec_for("aiff"), None);
/// ```
pub fn codec_for(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "mp3" => Some("libmp3lame"),
        "ogg" => Some("libvorbis"),
        "opus" => Some("libopus"),
        _ => None,
    }
}

/// Converts a finished WAV file into a compressed format
pub trait Transcoder: Send + Sync {
    /// Read `input` and write the encoded result to `output`
    ///
    /// `input` must be left in place; the exporter decides what happens to it.
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        settings: &TranscodeSettings,
    ) -> Result<(), TranscodeError>;
}

/// Compressed encoding through an `ffmpeg` executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegTranscoder {
    /// Use `program` as the encoder; bare names are looked up on `PATH`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Configured program name or path
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolve the encoder executable
    pub fn locate(&self) -> Result<PathBuf, TranscodeError> {
        which::which(&self.program)
            .map_err(|_| TranscodeError::NotFound(self.program.display().to_string()))
    }

    /// Check if the encoder can be found at all
    pub fn is_available(&self) -> bool {
        self.locate().is_ok()
    }
}

/// Command-line arguments for one ffmpeg invocation
fn ffmpeg_args(
    input: &Path,
    output: &Path,
    codec: &str,
    settings: &TranscodeSettings,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "error", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(input.into());
    args.extend(
        [
            "-acodec".to_string(),
            codec.to_string(),
            "-b:a".to_string(),
            settings.bitrate.clone(),
            "-ar".to_string(),
            settings.sample_rate.to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(
        &self,
        input: &Path,
        output: &Path,
        settings: &TranscodeSettings,
    ) -> Result<(), TranscodeError> {
        let codec = codec_for(&settings.extension)
            .ok_or_else(|| TranscodeError::UnsupportedFormat(settings.extension.clone()))?;
        let program = self.locate()?;
        tracing::debug!(
            program = %program.display(),
            input = %input.display(),
            codec,
            "Running encoder"
        );

        let result = Command::new(&program)
            .args(ffmpeg_args(input, output, codec, settings))
            .output()
            .map_err(TranscodeError::Spawn)?;

        if !result.status.success() {
            return Err(TranscodeError::Failed {
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = TranscodeSettings::default();
        assert_eq!(settings.bitrate, "128k");
        assert_eq!(settings.sample_rate, 44100);
        assert_eq!(settings.extension, "mp3");
    }

    #[test]
    fn test_ffmpeg_args() {
        let settings = TranscodeSettings {
            bitrate: "192k".to_string(),
            ..Default::default()
        };
        let args = ffmpeg_args(Path::new("in.wav"), Path::new("out.mp3"), "libmp3lame", &settings);
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            [
                "-y", "-hide_banner", "-loglevel", "error", "-i", "in.wav", "-acodec",
                "libmp3lame", "-b:a", "192k", "-ar", "44100", "out.mp3"
            ]
        );
    }

    #[test]
    fn test_codec_follows_extension() {
        assert_eq!(codec_for("mp3"), Some("libmp3lame"));
        assert_eq!(codec_for("ogg"), Some("libvorbis"));
        assert_eq!(codec_for("OPUS"), Some("libopus"));
        assert_eq!(codec_for("wav"), None);

        let settings = TranscodeSettings {
            extension: "ogg".to_string(),
            ..Default::default()
        };
        let args = ffmpeg_args(Path::new("a.wav"), Path::new("a.ogg"), "libvorbis", &settings);
        let codec = args.iter().position(|a| a == "-acodec").unwrap() + 1;
        assert_eq!(args[codec], "libvorbis");
    }

    #[test]
    fn test_unsupported_format_never_runs_encoder() {
        let settings = TranscodeSettings {
            extension: "aiff".to_string(),
            ..Default::default()
        };
        let err = FfmpegTranscoder::new("proc-sfx-no-such-encoder")
            .transcode(Path::new("in.wav"), Path::new("out.aiff"), &settings)
            .unwrap_err();
        assert!(matches!(err, TranscodeError::UnsupportedFormat(ref ext) if ext == "aiff"));
    }

    #[test]
    fn test_missing_encoder() {
        let transcoder = FfmpegTranscoder::new("proc-sfx-no-such-encoder");
        assert!(!transcoder.is_available());

        let err = transcoder
            .transcode(
                Path::new("in.wav"),
                Path::new("out.mp3"),
                &TranscodeSettings::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            TranscodeError::NotFound(ref name) if name == "proc-sfx-no-such-encoder"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failure() {
        let transcoder = FfmpegTranscoder::new("false");
        let err = transcoder
            .transcode(
                Path::new("in.wav"),
                Path::new("out.mp3"),
                &TranscodeSettings::default(),
            )
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Failed { .. }));
    }
}
