//! Envelopes and amplitude curves
//!
//! Curves are plain `Vec<f32>` weights applied by elementwise multiplication.
//! Position-based curves use `x = i / (len - 1)`, running from 0 on the first
//! sample to 1 on the last.

use std::f32::consts::TAU;

use crate::error::{Result, SynthError};

/// ADSR Envelope parameters
///
/// Controls the amplitude shape of a sound over time:
/// - Attack: Time to reach peak amplitude (0 to 1)
/// - Decay: Time to fall from peak to sustain level
/// - Sustain: Amplitude level held during the sustain phase (0.0 to 1.0)
/// - Release: Time to fade from sustain to silence
///
/// All times are in seconds. When attack, decay and release together run
/// longer than the buffer, all three shrink by the same factor to fit. The
/// release lands on exactly zero at the final sample whenever it spans more
/// than one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Attack time in seconds
    pub attack: f32,
    /// Decay time in seconds
    pub decay: f32,
    /// Sustain level (0.0 to 1.0)
    pub sustain: f32,
    /// Release time in seconds
    pub release: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.2,
        }
    }
}

impl Envelope {
    /// Create a new envelope with custom parameters
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain: sustain.clamp(0.0, 1.0),
            release,
        }
    }

    /// Reveal swell - slow attack, held body, long release
    pub fn swell() -> Self {
        Self::new(0.25, 0.3, 0.75, 0.35)
    }

    /// Apply envelope to samples
    ///
    /// The sustain phase fills the time between attack+decay and the release
    /// phase.
    ///
    /// # Arguments
    /// * `samples` - Audio samples to shape
    /// * `sample_rate` - Sample rate in Hz
    pub fn apply(&self, samples: &mut [f32], sample_rate: u32) {
        if samples.is_empty() {
            return;
        }

        let total_samples = samples.len();

        let (attack_samples, decay_samples, release_samples) =
            self.stage_lengths(total_samples, sample_rate);

        let release_start = total_samples - release_samples;
        let sustain_start = attack_samples + decay_samples;

        // Level the curve would have at `i` without a release
        let level_at = |i: usize| -> f32 {
            if i < attack_samples {
                i as f32 / attack_samples as f32
            } else if i < sustain_start {
                let progress = (i - attack_samples) as f32 / decay_samples.max(1) as f32;
                1.0 - progress * (1.0 - self.sustain)
            } else {
                self.sustain
            }
        };

        let release_from = level_at(release_start);
        let release_span = release_samples.saturating_sub(1).max(1) as f32;

        for (i, sample) in samples.iter_mut().enumerate() {
            let amplitude = if i < release_start {
                level_at(i)
            } else {
                let progress = (i - release_start) as f32 / release_span;
                release_from * (1.0 - progress)
            };

            *sample *= amplitude;
        }
    }

    /// Attack, decay and release lengths in samples, fitted into `total`
    fn stage_lengths(&self, total: usize, sample_rate: u32) -> (usize, usize, usize) {
        let to_samples = |seconds: f32| (seconds.max(0.0) * sample_rate as f32) as usize;
        let (attack, decay, release) = (
            to_samples(self.attack),
            to_samples(self.decay),
            to_samples(self.release),
        );

        let stages = attack + decay + release;
        if stages <= total {
            return (attack, decay, release);
        }

        let fit = |len: usize| (len as u64 * total as u64 / stages as u64) as usize;
        (fit(attack), fit(decay), fit(release))
    }

    /// Generate envelope curve as samples
    ///
    /// # Arguments
    /// * `len` - Number of samples
    /// * `sample_rate` - Sample rate in Hz
    pub fn generate(&self, len: usize, sample_rate: u32) -> Vec<f32> {
        let mut samples = vec![1.0; len];
        self.apply(&mut samples, sample_rate);
        samples
    }
}

/// Position of sample `i` in a curve of `len` samples, 0.0..=1.0
#[inline]
fn position(i: usize, len: usize) -> f32 {
    if len <= 1 {
        0.0
    } else {
        i as f32 / (len - 1) as f32
    }
}

/// Linear fade-in over the first `len` samples (in-place)
///
/// The first sample becomes 0 and sample `len - 1` keeps its value. `len` is
/// clamped to the buffer length; a one-sample fade silences that sample.
pub fn fade_in(samples: &mut [f32], len: usize) {
    let len = len.min(samples.len());
    for (i, sample) in samples[..len].iter_mut().enumerate() {
        *sample *= position(i, len);
    }
}

/// Linear fade-out over the last `len` samples (in-place)
///
/// Sample `samples.len() - len` keeps its value and the last sample becomes 0.
pub fn fade_out(samples: &mut [f32], len: usize) {
    let len = len.min(samples.len());
    let start = samples.len() - len;
    for (i, sample) in samples[start..].iter_mut().enumerate() {
        *sample *= if len <= 1 { 0.0 } else { 1.0 - position(i, len) };
    }
}

/// Power-curve attack over the first `len` samples (in-place)
///
/// Multiplies by `x^power` with `x` going 0..=1 across the attack, so the
/// result layers on top of any decay already applied.
pub fn apply_attack(samples: &mut [f32], len: usize, power: f32) {
    let len = len.min(samples.len());
    for (i, sample) in samples[..len].iter_mut().enumerate() {
        *sample *= position(i, len).powf(power);
    }
}

/// Exponential decay curve `exp(-k * x)`
pub fn exp_decay(len: usize, k: f32) -> Vec<f32> {
    (0..len).map(|i| (-k * position(i, len)).exp()).collect()
}

/// Saturating rise `1 - exp(-k * x)`
pub fn exp_rise(len: usize, k: f32) -> Vec<f32> {
    (0..len).map(|i| 1.0 - (-k * position(i, len)).exp()).collect()
}

/// Power curve `x^p`; `p > 1` rises slowly then sharply
pub fn power_curve(len: usize, p: f32) -> Vec<f32> {
    (0..len).map(|i| position(i, len).powf(p)).collect()
}

/// Low-frequency oscillator `offset + depth * sin(2π * rate * t)`
pub fn lfo(len: usize, offset: f32, depth: f32, rate: f32, sample_rate: u32) -> Vec<f32> {
    let omega = TAU * rate / sample_rate as f32;
    (0..len)
        .map(|i| offset + depth * (omega * i as f32).sin())
        .collect()
}

/// Multiply samples by an equal-length curve (in-place)
pub fn apply_curve(samples: &mut [f32], curve: &[f32]) -> Result<()> {
    if samples.len() != curve.len() {
        return Err(SynthError::LengthMismatch {
            expected: samples.len(),
            found: curve.len(),
        });
    }
    for (sample, gain) in samples.iter_mut().zip(curve) {
        *sample *= gain;
    }
    Ok(())
}
