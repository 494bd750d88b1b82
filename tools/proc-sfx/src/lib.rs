//! Procedural sound-effect synthesis
//!
//! Renders short effect clips from scratch: oscillator banks, noise, Butterworth
//! filters, envelopes, a simple feedback-delay reverb, stereo widening, and a
//! 16-bit WAV exporter with optional transcoding.
//!
//! Signals flow one way: generators, filters, envelopes/dynamics, stereo
//! imaging, then export.
//!
//! # Example
//! ```no_run
//! use proc_sfx::*;
//!
//! let synth = Synth::new(SynthConfig::default());
//!
//! // Render the impact clip with a fixed seed
//! let clip = synth.render(Clip::ImpactBoom, Clip::ImpactBoom.default_duration(), Some(7))?;
//!
//! // Write it next to the other clips, without an encoder
//! let exporter = Exporter::new("assets/sounds");
//! let file = exporter.export(Clip::ImpactBoom.name(), &clip.buffer)?;
//! println!("{} ({} bytes)", file.path.display(), file.size_bytes);
//! # Ok::<(), SynthError>(())
//! ```

mod clips;
mod config;
mod dynamics;
mod envelope;
mod error;
mod export;
mod filters;
mod noise;
mod oscillators;
mod stereo;
mod synth;
mod transcode;

/// Default render sample rate (44.1kHz)
pub const SAMPLE_RATE: u32 = 44100;

// Configuration and errors
pub use config::{nyquist, sample_count, SynthConfig};
pub use error::{Result, SynthError};

// Generators
pub use noise::{brown_noise, noise_rng, pink_noise, white_noise, NoiseRng};
pub use oscillators::{exponential_sweep, sine, sweep_phase, HarmonicBank, Partial, Vibrato};

// Filters
pub use filters::{apply_filter, sweep_filter, Biquad, Cascade, FilterKind, FilterMode, FilterSpec};

// Envelopes and dynamics
pub use dynamics::{feedback_delay, mix, normalize, normalize_to, peak, saturate, tremolo, Level};
pub use envelope::{
    apply_attack, apply_curve, exp_decay, exp_rise, fade_in, fade_out, lfo, power_curve, Envelope,
};

// Stereo
pub use stereo::{upmix, widen};

// Recipes
pub use clips::{Clip, RenderedClip};
pub use synth::Synth;

// Export
pub use export::{to_pcm_i16, write_wav, ExportFormat, ExportedFile, Exporter};
pub use transcode::{codec_for, FfmpegTranscoder, TranscodeError, TranscodeSettings, Transcoder};

/// Audio sample buffer (f32 samples, nominally -1.0 to 1.0)
///
/// Stereo buffers are interleaved (L, R, L, R, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// 1 for mono, 2 for stereo
    pub channels: u16,
    /// Interleaved samples
    pub samples: Vec<f32>,
}

impl AudioBuffer {
    /// Create a mono buffer from samples
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: 1,
            samples,
        }
    }

    /// Interleave two equal-length channels into a stereo buffer
    pub fn stereo(sample_rate: u32, left: &[f32], right: &[f32]) -> Result<Self> {
        if left.len() != right.len() {
            return Err(SynthError::LengthMismatch {
                expected: left.len(),
                found: right.len(),
            });
        }

        let mut samples = Vec::with_capacity(left.len() * 2);
        for (&l, &r) in left.iter().zip(right) {
            samples.push(l);
            samples.push(r);
        }

        Ok(Self {
            sample_rate,
            channels: 2,
            samples,
        })
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Total number of samples across all channels
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Copy one channel out of the interleaved data
    pub fn channel(&self, index: usize) -> Vec<f32> {
        let channels = self.channels.max(1) as usize;
        self.samples
            .iter()
            .skip(index)
            .step_by(channels)
            .copied()
            .collect()
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f32 {
        dynamics::peak(&self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_buffer_mono() {
        let buf = AudioBuffer::mono(SAMPLE_RATE, vec![0.0, 0.5, -1.0]);
        assert_eq!(buf.channels, 1);
        assert_eq!(buf.frames(), 3);
        assert_eq!(buf.peak(), 1.0);
    }

    #[test]
    fn test_audio_buffer_stereo_interleaves() {
        let buf = AudioBuffer::stereo(SAMPLE_RATE, &[1.0, 2.0], &[3.0, 4.0]).unwrap();
        assert_eq!(buf.samples, vec![1.0, 3.0, 2.0, 4.0]);
        assert_eq!(buf.frames(), 2);
        assert_eq!(buf.channel(0), vec![1.0, 2.0]);
        assert_eq!(buf.channel(1), vec![3.0, 4.0]);
    }

    #[test]
    fn test_audio_buffer_stereo_length_mismatch() {
        let result = AudioBuffer::stereo(SAMPLE_RATE, &[1.0, 2.0], &[3.0]);
        assert!(matches!(result, Err(SynthError::LengthMismatch { .. })));
    }

    #[test]
    fn test_audio_buffer_duration() {
        let buf = AudioBuffer::mono(SAMPLE_RATE, vec![0.0; SAMPLE_RATE as usize]);
        assert!((buf.duration() - 1.0).abs() < 0.001);
        assert!(!buf.is_empty());
    }
}
