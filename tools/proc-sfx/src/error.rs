//! Error types for synthesis and export

use std::path::PathBuf;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, SynthError>;

/// Errors raised by the synthesis pipeline and the WAV exporter.
///
/// Everything except [`SynthError::Io`] and [`SynthError::Wav`] is a
/// configuration error: it is raised before any samples are produced.
#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("Cutoff {cutoff} Hz is outside (0, {nyquist}) Hz")]
    InvalidCutoff { cutoff: f32, nyquist: f32 },

    #[error("Band-pass range {low}..{high} Hz is empty")]
    InvalidBand { low: f32, high: f32 },

    #[error("Filter order must be at least 1")]
    InvalidOrder,

    #[error("Cutoff sweep must start and end on the same filter kind")]
    FilterKindMismatch,

    #[error("Duration must be positive and finite, got {0}")]
    InvalidDuration(f32),

    #[error("Sweep from {start} Hz to {end} Hz has no exponential curve")]
    InvalidSweep { start: f32, end: f32 },

    #[error("Stereo width must be within 0..=1, got {0}")]
    InvalidWidth(f32),

    #[error("Reverb decay must be within 0..1, got {0}")]
    InvalidReverb(f32),

    #[error("Target level must be within (0, 1], got {0}")]
    InvalidLevel(f32),

    #[error("Cannot mix buffers of different lengths ({expected} vs {found})")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Unknown clip '{0}'")]
    UnknownClip(String),

    #[error("Clip '{0}' produced NaN or infinite samples")]
    NonFinite(&'static str),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),
}

impl SynthError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SynthError::InvalidCutoff {
            cutoff: 22050.0,
            nyquist: 22050.0,
        };
        assert!(err.to_string().contains("22050"));

        let err = SynthError::io("out/a.wav", std::io::Error::other("disk full"));
        assert!(err.to_string().contains("out/a.wav"));
        assert!(err.to_string().contains("disk full"));
    }
}
