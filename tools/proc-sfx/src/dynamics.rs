//! Mixing and dynamics: saturation, feedback delay, normalization

use std::f32::consts::TAU;

use crate::error::{Result, SynthError};

/// Mix equal-length signals together
///
/// Each signal is multiplied by its volume before mixing.
/// The result is NOT normalized - use [`normalize_to`] if needed.
///
/// # Arguments
/// * `signals` - Slice of (samples, volume) tuples
///
/// # Errors
/// [`SynthError::LengthMismatch`] if any signal differs in length from the
/// first one.
///
/// # Example
/// ```
/// use proc_sfx::*;
///
/// let bass = sine(50.0, 0.5, SAMPLE_RATE)?;
/// let mid = sine(120.0, 0.5, SAMPLE_RATE)?;
///
/// let mixed = mix(&[(&bass, 0.6), (&mid, 0.25)])?;
/// assert_eq!(mixed.len(), bass.len());
/// # Ok::<(), SynthError>(())
/// ```
pub fn mix(signals: &[(&[f32], f32)]) -> Result<Vec<f32>> {
    let Some((first, _)) = signals.first() else {
        return Ok(Vec::new());
    };

    let len = first.len();
    if let Some((other, _)) = signals.iter().find(|(s, _)| s.len() != len) {
        return Err(SynthError::LengthMismatch {
            expected: len,
            found: other.len(),
        });
    }

    let mut result = vec![0.0f32; len];
    for (samples, volume) in signals {
        for (out, &sample) in result.iter_mut().zip(samples.iter()) {
            *out += sample * volume;
        }
    }

    Ok(result)
}

/// Largest absolute sample value, 0.0 for an empty slice
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |a, s| a.max(s.abs()))
}

/// Peak target for normalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Level {
    /// Linear amplitude in (0, 1]
    Linear(f32),
    /// Decibels relative to full scale, at most 0
    Dbfs(f32),
}

impl Level {
    /// Linear amplitude for this level
    pub fn amplitude(self) -> f32 {
        match self {
            Level::Linear(amplitude) => amplitude,
            Level::Dbfs(db) => 10f32.powf(db / 20.0),
        }
    }

    fn checked_amplitude(self) -> Result<f32> {
        let amplitude = self.amplitude();
        if !amplitude.is_finite() || amplitude <= 0.0 || amplitude > 1.0 {
            return Err(SynthError::InvalidLevel(amplitude));
        }
        Ok(amplitude)
    }
}

/// Normalize audio to a peak of exactly 1.0
///
/// Does nothing if the audio is silent.
pub fn normalize(samples: &mut [f32]) {
    scale_to(samples, 1.0);
}

/// Normalize audio with target peak level
///
/// # Arguments
/// * `samples` - Audio samples to normalize (modified in-place)
/// * `level` - Target peak (e.g. `Level::Dbfs(-3.0)` or `Level::Linear(0.9)`)
///
/// Silent input is left unchanged.
pub fn normalize_to(samples: &mut [f32], level: Level) -> Result<()> {
    let target = level.checked_amplitude()?;
    scale_to(samples, target);
    Ok(())
}

fn scale_to(samples: &mut [f32], target: f32) {
    let max_amplitude = peak(samples);
    if max_amplitude > 0.0 {
        let scale = target / max_amplitude;
        for sample in samples.iter_mut() {
            *sample *= scale;
        }
    }
}

/// Soft clip with `tanh(drive * x)` (in-place)
///
/// Monotonic, maps 0 to 0 and never leaves (-1, 1).
pub fn saturate(samples: &mut [f32], drive: f32) {
    for sample in samples.iter_mut() {
        *sample = (*sample * drive).tanh();
    }
}

/// Feedback-delay echo (in-place)
///
/// Single forward pass of `out[i] += out[i - delay] * decay`. Because earlier
/// outputs already carry their own echoes, each repeat is `decay` times
/// quieter than the previous one. A delay of 0 or one at least as long as the
/// buffer leaves the samples untouched.
///
/// # Errors
/// [`SynthError::InvalidReverb`] unless `decay` is within `0.0..1.0`.
pub fn feedback_delay(samples: &mut [f32], delay: usize, decay: f32) -> Result<()> {
    if !(0.0..1.0).contains(&decay) {
        return Err(SynthError::InvalidReverb(decay));
    }
    if delay == 0 || delay >= samples.len() {
        return Ok(());
    }

    for i in delay..samples.len() {
        samples[i] += samples[i - delay] * decay;
    }

    Ok(())
}

/// Amplitude modulation by `1 + depth * sin(2π * rate * t)` (in-place)
pub fn tremolo(samples: &mut [f32], depth: f32, rate: f32, sample_rate: u32) {
    let omega = TAU * rate / sample_rate as f32;
    for (i, sample) in samples.iter_mut().enumerate() {
        *sample *= 1.0 + depth * (omega * i as f32).sin();
    }
}
