//! Noise generators
//!
//! Every generator takes the random source explicitly, so a fixed seed gives
//! a reproducible clip.

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64;

use crate::config::sample_count;
use crate::dynamics::normalize;
use crate::error::Result;
use crate::filters::{apply_filter, FilterSpec};

/// Random source used by the noise layers
pub type NoiseRng = Pcg64;

/// Create a seeded noise source
pub fn noise_rng(seed: u64) -> NoiseRng {
    Pcg64::seed_from_u64(seed)
}

/// Generate white noise
///
/// Samples are independent draws from a normal distribution.
///
/// # Arguments
/// * `duration` - Duration in seconds
/// * `std_dev` - Standard deviation of each sample
/// * `sample_rate` - Sample rate in Hz
/// * `rng` - Random source
pub fn white_noise<R: Rng + ?Sized>(
    duration: f32,
    std_dev: f32,
    sample_rate: u32,
    rng: &mut R,
) -> Result<Vec<f32>> {
    let num_samples = sample_count(duration, sample_rate)?;
    Ok((0..num_samples)
        .map(|_| {
            let z: f32 = rng.sample(StandardNormal);
            z * std_dev
        })
        .collect())
}

/// Generate brown noise
///
/// Running sum of white noise (a random walk), rescaled to unit peak.
pub fn brown_noise<R: Rng + ?Sized>(
    duration: f32,
    sample_rate: u32,
    rng: &mut R,
) -> Result<Vec<f32>> {
    let mut samples = white_noise(duration, 1.0, sample_rate, rng)?;

    let mut acc = 0.0f32;
    for sample in samples.iter_mut() {
        acc += *sample;
        *sample = acc;
    }

    normalize(&mut samples);
    Ok(samples)
}

/// Generate pink-like noise
///
/// White noise through a first-order low-pass at `cutoff`, rescaled to unit
/// peak. Only an approximation of a true 1/f spectrum.
pub fn pink_noise<R: Rng + ?Sized>(
    duration: f32,
    cutoff: f32,
    sample_rate: u32,
    rng: &mut R,
) -> Result<Vec<f32>> {
    let spec = FilterSpec::low_pass(cutoff).with_order(1).direct();
    spec.validate(sample_rate)?;

    let mut samples = white_noise(duration, 1.0, sample_rate, rng)?;
    apply_filter(&mut samples, &spec, sample_rate)?;
    normalize(&mut samples);
    Ok(samples)
}
