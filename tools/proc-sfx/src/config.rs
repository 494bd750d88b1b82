//! Render configuration shared by every stage

use crate::error::{Result, SynthError};
use crate::SAMPLE_RATE;

/// Immutable render settings threaded through each stage call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
        }
    }
}

impl SynthConfig {
    /// Create a config for the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Half the sample rate
    pub fn nyquist(&self) -> f32 {
        nyquist(self.sample_rate)
    }

    /// Number of samples for `duration` seconds
    pub fn sample_count(&self, duration: f32) -> Result<usize> {
        sample_count(duration, self.sample_rate)
    }
}

/// Half of `sample_rate`, in Hz
pub fn nyquist(sample_rate: u32) -> f32 {
    sample_rate as f32 / 2.0
}

/// Convert a duration to a sample count, `round(duration * sample_rate)`.
///
/// 1.8f32 is 1.79999995..., so truncation would land one sample short.
pub fn sample_count(duration: f32, sample_rate: u32) -> Result<usize> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(SynthError::InvalidDuration(duration));
    }
    Ok((duration as f64 * sample_rate as f64).round() as usize)
}
