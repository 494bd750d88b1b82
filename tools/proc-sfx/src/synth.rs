//! High-level synthesizer API
//!
//! [`Synth`] carries the render configuration and offers the layer building
//! blocks the clip recipes are made of: oscillator banks, chords, sweeps and
//! filtered noise. [`Synth::render`] runs a whole recipe through
//! normalization and stereo imaging.

use tracing::debug;

use crate::clips::{Clip, RenderedClip};
use crate::config::SynthConfig;
use crate::dynamics::normalize_to;
use crate::error::{Result, SynthError};
use crate::filters::{apply_filter, FilterSpec};
use crate::noise::{noise_rng, white_noise, NoiseRng};
use crate::oscillators::{sweep_phase, HarmonicBank, Partial};
use crate::stereo::widen;

/// Synthesizer for the intro sound effects
///
/// # Example
/// ```
/// use proc_sfx::*;
///
/// let synth = Synth::new(SynthConfig::default());
///
/// // Same seed, same clip
/// let a = synth.render(Clip::StellarChime, 0.25, Some(1))?;
/// let b = synth.render(Clip::StellarChime, 0.25, Some(1))?;
/// assert_eq!(a.buffer, b.buffer);
/// assert_eq!(a.buffer.channels, 2);
/// # Ok::<(), SynthError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Synth {
    config: SynthConfig,
}

impl Synth {
    /// Create a new synthesizer with the given configuration
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> SynthConfig {
        self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Number of samples for `duration` seconds at this sample rate
    pub fn samples_for(&self, duration: f32) -> Result<usize> {
        self.config.sample_count(duration)
    }

    /// Render an oscillator bank
    pub fn bank(&self, bank: &HarmonicBank, duration: f32) -> Result<Vec<f32>> {
        bank.render(duration, self.sample_rate())
    }

    /// Sum of one bank per note, all sharing the same partials
    ///
    /// # Arguments
    /// * `notes` - Fundamentals in Hz
    /// * `partials` - Harmonic layout applied to every note
    /// * `duration` - Duration in seconds
    pub fn chord(&self, notes: &[f32], partials: &[Partial], duration: f32) -> Result<Vec<f32>> {
        let mut out = vec![0.0f32; self.samples_for(duration)?];
        for &note in notes {
            let bank = HarmonicBank {
                fundamental: note,
                partials: partials.to_vec(),
                vibrato: None,
            };
            for (acc, sample) in out.iter_mut().zip(self.bank(&bank, duration)?) {
                *acc += sample;
            }
        }
        Ok(out)
    }

    /// Exponential sweep rendered as a sum of harmonics of the sweep phase
    ///
    /// Each `(multiple, amplitude)` pair adds `amplitude * sin(multiple * phase)`,
    /// so harmonics follow the fundamental exactly.
    pub fn harmonic_sweep(
        &self,
        f_start: f32,
        f_end: f32,
        harmonics: &[(f32, f32)],
        duration: f32,
    ) -> Result<Vec<f32>> {
        let phases = sweep_phase(f_start, f_end, duration, self.sample_rate())?;
        Ok(phases
            .iter()
            .map(|&phase| {
                harmonics
                    .iter()
                    .map(|&(multiple, amplitude)| {
                        amplitude * (multiple as f64 * phase).sin() as f32
                    })
                    .sum()
            })
            .collect())
    }

    /// White noise shaped by a filter
    ///
    /// The filter is validated before any noise is drawn.
    pub fn filtered_noise(
        &self,
        duration: f32,
        std_dev: f32,
        filter: &FilterSpec,
        rng: &mut NoiseRng,
    ) -> Result<Vec<f32>> {
        filter.validate(self.sample_rate())?;
        let mut noise = white_noise(duration, std_dev, self.sample_rate(), rng)?;
        apply_filter(&mut noise, filter, self.sample_rate())?;
        Ok(noise)
    }

    /// Render a clip's mono signal, normalized to its target peak
    ///
    /// # Errors
    /// Configuration errors from the recipe's stages, or
    /// [`SynthError::NonFinite`] if the recipe blew up.
    pub fn render_mono(&self, clip: Clip, duration: f32, rng: &mut NoiseRng) -> Result<Vec<f32>> {
        let mut samples = clip.compose(self, duration, rng)?;

        if samples.iter().any(|s| !s.is_finite()) {
            return Err(SynthError::NonFinite(clip.name()));
        }
        normalize_to(&mut samples, clip.target())?;

        Ok(samples)
    }

    /// Render a clip to stereo
    ///
    /// Without a seed a random one is drawn; it is returned in the
    /// [`RenderedClip`] so the run can be reproduced.
    pub fn render(&self, clip: Clip, duration: f32, seed: Option<u64>) -> Result<RenderedClip> {
        let seed = seed.unwrap_or_else(rand::random);
        debug!(clip = clip.name(), duration, seed, "Rendering clip");

        let mut rng = noise_rng(seed);
        let mono = self.render_mono(clip, duration, &mut rng)?;
        let buffer = widen(&mono, clip.stereo_width(), self.sample_rate())?;

        Ok(RenderedClip { clip, seed, buffer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::peak;
    use crate::oscillators::sine;

    #[test]
    fn test_chord_sums_notes() {
        let synth = Synth::default();
        let chord = synth
            .chord(&[200.0, 300.0], &[Partial::new(1.0, 1.0)], 0.05)
            .unwrap();
        let a = sine(200.0, 0.05, 44100).unwrap();
        let b = sine(300.0, 0.05, 44100).unwrap();

        assert_eq!(chord.len(), 2205);
        for i in 0..chord.len() {
            assert!((chord[i] - (a[i] + b[i])).abs() < 1e-4);
        }
    }

    #[test]
    fn test_harmonic_sweep_matches_phase() {
        let synth = Synth::default();
        let sweep = synth
            .harmonic_sweep(300.0, 30.0, &[(1.0, 1.0), (2.0, 0.5)], 0.1)
            .unwrap();
        let phases = sweep_phase(300.0, 30.0, 0.1, 44100).unwrap();

        assert_eq!(sweep.len(), phases.len());
        let expected = (phases[100].sin() + 0.5 * (2.0 * phases[100]).sin()) as f32;
        assert!((sweep[100] - expected).abs() < 1e-5);
    }

    #[test]
    fn test_filtered_noise_validates_first() {
        let synth = Synth::default();
        let mut rng = noise_rng(1);
        let err = synth
            .filtered_noise(0.1, 1.0, &FilterSpec::low_pass(30_000.0), &mut rng)
            .unwrap_err();
        assert!(matches!(err, SynthError::InvalidCutoff { .. }));
    }

    #[test]
    fn test_render_mono_hits_target() {
        let synth = Synth::default();
        let mut rng = noise_rng(3);
        let mono = synth.render_mono(Clip::ImpactBoom, 0.4, &mut rng).unwrap();
        let expected = 10f32.powf(-3.0 / 20.0);
        assert!((peak(&mono) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_render_reports_seed() {
        let synth = Synth::default();
        let first = synth.render(Clip::ParticleRiser, 0.3, None).unwrap();
        let again = synth
            .render(Clip::ParticleRiser, 0.3, Some(first.seed))
            .unwrap();
        assert_eq!(first.buffer, again.buffer);
    }

    #[test]
    fn test_render_rejects_bad_duration() {
        let synth = Synth::default();
        for clip in Clip::ALL {
            assert!(matches!(
                synth.render(clip, 0.0, Some(0)),
                Err(SynthError::InvalidDuration(_))
            ));
        }
    }

    #[test]
    fn test_low_sample_rate_rejects_high_cutoffs() {
        // 8 kHz shimmer band cannot exist below 16 kHz
        let synth = Synth::new(SynthConfig::new(16000));
        assert!(matches!(
            synth.render(Clip::AmbientDrone, 1.0, Some(0)),
            Err(SynthError::InvalidCutoff { .. })
        ));
    }
}
