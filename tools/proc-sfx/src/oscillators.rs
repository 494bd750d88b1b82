//! Sine oscillators and exponential sweeps
//!
//! Phase is accumulated sample by sample in `f64`, so frequency changes
//! (vibrato, sweeps) never jump.

use std::f64::consts::TAU;

use crate::config::sample_count;
use crate::error::{Result, SynthError};

/// Generate a sine tone
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `duration` - Duration in seconds
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// Vector of samples in -1.0 to 1.0 range
pub fn sine(frequency: f32, duration: f32, sample_rate: u32) -> Result<Vec<f32>> {
    let num_samples = sample_count(duration, sample_rate)?;
    let omega = TAU * frequency as f64 / sample_rate as f64;
    Ok((0..num_samples)
        .map(|i| (omega * i as f64).sin() as f32)
        .collect())
}

/// One sine component of a [`HarmonicBank`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    /// Frequency as a multiple of the fundamental
    pub ratio: f32,
    /// Peak amplitude
    pub amplitude: f32,
    /// Decay rate `k` of `exp(-k * t / duration)`; 0 holds the level
    pub decay: f32,
}

impl Partial {
    /// Sustained partial
    pub const fn new(ratio: f32, amplitude: f32) -> Self {
        Self {
            ratio,
            amplitude,
            decay: 0.0,
        }
    }

    /// Partial with its own exponential decay
    pub const fn decaying(ratio: f32, amplitude: f32, decay: f32) -> Self {
        Self {
            ratio,
            amplitude,
            decay,
        }
    }
}

/// Slow sinusoidal pitch modulation, `f0 + depth * sin(2π * rate * t)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vibrato {
    /// Deviation in Hz
    pub depth: f32,
    /// Modulation rate in Hz
    pub rate: f32,
}

/// Sum of sine partials over a shared fundamental
///
/// # Example
/// ```
/// use proc_sfx::*;
///
/// // Sub-bass with an octave above, drifting ±15 Hz every ten seconds
/// let drone = HarmonicBank::new(50.0)
///     .partial(1.0, 1.0)
///     .partial(2.0, 0.3)
///     .with_vibrato(15.0, 0.1)
///     .render(1.0, SAMPLE_RATE)?;
/// assert_eq!(drone.len(), 44100);
/// # Ok::<(), SynthError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicBank {
    pub fundamental: f32,
    pub partials: Vec<Partial>,
    pub vibrato: Option<Vibrato>,
}

impl HarmonicBank {
    /// Empty bank; renders silence until partials are added
    pub fn new(fundamental: f32) -> Self {
        Self {
            fundamental,
            partials: Vec::new(),
            vibrato: None,
        }
    }

    /// Add a sustained partial
    pub fn partial(mut self, ratio: f32, amplitude: f32) -> Self {
        self.partials.push(Partial::new(ratio, amplitude));
        self
    }

    /// Add a partial with its own decay rate
    pub fn decaying_partial(mut self, ratio: f32, amplitude: f32, decay: f32) -> Self {
        self.partials.push(Partial::decaying(ratio, amplitude, decay));
        self
    }

    /// Modulate the fundamental
    pub fn with_vibrato(mut self, depth: f32, rate: f32) -> Self {
        self.vibrato = Some(Vibrato { depth, rate });
        self
    }

    /// Render the bank for `duration` seconds
    pub fn render(&self, duration: f32, sample_rate: u32) -> Result<Vec<f32>> {
        let num_samples = sample_count(duration, sample_rate)?;
        let sr = sample_rate as f64;
        let span = (num_samples.max(2) - 1) as f64;

        let mut samples = Vec::with_capacity(num_samples);
        let mut phase = 0.0f64;

        for i in 0..num_samples {
            let x = i as f64 / span;
            let sample: f64 = self
                .partials
                .iter()
                .map(|p| {
                    let level = if p.decay != 0.0 {
                        (-(p.decay as f64) * x).exp()
                    } else {
                        1.0
                    };
                    p.amplitude as f64 * level * (p.ratio as f64 * phase).sin()
                })
                .sum();
            samples.push(sample as f32);

            let freq = match self.vibrato {
                Some(v) => {
                    let t = i as f64 / sr;
                    self.fundamental as f64 + v.depth as f64 * (TAU * v.rate as f64 * t).sin()
                }
                None => self.fundamental as f64,
            };
            phase += TAU * freq / sr;
        }

        Ok(samples)
    }
}

/// Instantaneous phase of an exponential sweep
///
/// The frequency follows `f_start * (f_end / f_start)^(t / duration)` with
/// `t / duration` running from 0 on the first sample to 1 on the last. The
/// phase is the running sum of `2π * f(t) / sample_rate`, so the difference
/// between neighbouring phases is the instantaneous frequency.
///
/// # Errors
/// [`SynthError::InvalidSweep`] unless both frequencies are finite, nonzero
/// and of the same sign.
pub fn sweep_phase(f_start: f32, f_end: f32, duration: f32, sample_rate: u32) -> Result<Vec<f64>> {
    let ratio = f_end as f64 / f_start as f64;
    if !f_start.is_finite() || !f_end.is_finite() || !ratio.is_finite() || ratio <= 0.0 {
        return Err(SynthError::InvalidSweep {
            start: f_start,
            end: f_end,
        });
    }

    let num_samples = sample_count(duration, sample_rate)?;
    let span = (num_samples.max(2) - 1) as f64;
    let sr = sample_rate as f64;

    let mut phases = Vec::with_capacity(num_samples);
    let mut phase = 0.0f64;
    for i in 0..num_samples {
        let freq = f_start as f64 * ratio.powf(i as f64 / span);
        phase += TAU * freq / sr;
        phases.push(phase);
    }

    Ok(phases)
}

/// Generate a sine sweeping exponentially from `f_start` to `f_end`
///
/// See [`sweep_phase`] for the frequency curve.
pub fn exponential_sweep(
    f_start: f32,
    f_end: f32,
    duration: f32,
    sample_rate: u32,
) -> Result<Vec<f32>> {
    Ok(sweep_phase(f_start, f_end, duration, sample_rate)?
        .into_iter()
        .map(|phase| phase.sin() as f32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SAMPLE_RATE: u32 = 44100;

    fn zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count()
    }

    #[test]
    fn test_sine_wave() {
        let samples = sine(440.0, 1.0, TEST_SAMPLE_RATE).unwrap();
        assert_eq!(samples.len(), 44100);
        assert!(samples.iter().all(|&s| (-1.0..=1.0).contains(&s)));
        // One upward crossing per cycle
        let crossings = zero_crossings(&samples) as i32;
        assert!((crossings - 440).abs() <= 1);
    }

    #[test]
    fn test_sample_count() {
        let samples = sine(440.0, 0.5, TEST_SAMPLE_RATE).unwrap();
        assert_eq!(samples.len(), 22050);
        assert!(sine(440.0, 0.0, TEST_SAMPLE_RATE).is_err());
    }

    #[test]
    fn test_bank_sums_partials() {
        let bank = HarmonicBank::new(100.0).partial(1.0, 0.5).partial(3.0, 0.25);
        let samples = bank.render(0.1, TEST_SAMPLE_RATE).unwrap();
        let a = sine(100.0, 0.1, TEST_SAMPLE_RATE).unwrap();
        let b = sine(300.0, 0.1, TEST_SAMPLE_RATE).unwrap();

        for i in 0..samples.len() {
            let expected = 0.5 * a[i] + 0.25 * b[i];
            assert!((samples[i] - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_bank_empty_is_silent() {
        let samples = HarmonicBank::new(440.0).render(0.01, TEST_SAMPLE_RATE).unwrap();
        assert_eq!(samples.len(), 441);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_bank_partial_decay() {
        let samples = HarmonicBank::new(1000.0)
            .decaying_partial(1.0, 1.0, 6.0)
            .render(0.5, TEST_SAMPLE_RATE)
            .unwrap();
        let head = samples[..2205].iter().fold(0.0f32, |a, s| a.max(s.abs()));
        let tail = samples[samples.len() - 2205..]
            .iter()
            .fold(0.0f32, |a, s| a.max(s.abs()));

        assert!(head > 0.9);
        // exp(-6) at the very end
        assert!(tail < 0.01);
    }

    #[test]
    fn test_vibrato_stays_continuous() {
        let samples = HarmonicBank::new(50.0)
            .partial(1.0, 1.0)
            .with_vibrato(15.0, 0.1)
            .render(2.0, TEST_SAMPLE_RATE)
            .unwrap();

        // Largest possible step for a 65 Hz sine
        let max_step = (TAU * 65.0 / TEST_SAMPLE_RATE as f64) as f32 * 1.01;
        assert!(samples.windows(2).all(|w| (w[1] - w[0]).abs() <= max_step));
    }

    #[test]
    fn test_sweep_phase_derivative_matches_endpoints() {
        let phases = sweep_phase(300.0, 30.0, 0.8, TEST_SAMPLE_RATE).unwrap();
        assert_eq!(phases.len(), 35280);

        let sr = TEST_SAMPLE_RATE as f64;
        let first = phases[0];
        let last = phases[phases.len() - 1] - phases[phases.len() - 2];

        assert!((first - TAU * 300.0 / sr).abs() < 1e-9);
        assert!((last - TAU * 30.0 / sr).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_frequency_falls() {
        let samples = exponential_sweep(300.0, 30.0, 0.8, TEST_SAMPLE_RATE).unwrap();
        let early = zero_crossings(&samples[..4410]);
        let late = zero_crossings(&samples[samples.len() - 4410..]);
        assert!(early > late * 4, "early {} late {}", early, late);
    }

    #[test]
    fn test_sweep_rejects_degenerate_curves() {
        for (start, end) in [(0.0, 30.0), (300.0, 0.0), (300.0, -30.0), (f32::NAN, 30.0)] {
            assert!(
                matches!(
                    sweep_phase(start, end, 0.8, TEST_SAMPLE_RATE),
                    Err(SynthError::InvalidSweep { .. })
                ),
                "{} -> {} was accepted",
                start,
                end
            );
        }
    }
}
