//! Butterworth filters
//!
//! Low-pass and high-pass filters are built as cascades of biquad sections
//! (bilinear transform with pre-warping). Band-pass is a high-pass cascaded
//! with a low-pass. Coefficients and state are kept in `f64`; only the
//! buffers are `f32`.
//!
//! Cutoffs are validated, never clamped: anything at or above Nyquist is an
//! error.

use std::f64::consts::PI;

use crate::config::{nyquist, sample_count};
use crate::error::{Result, SynthError};

/// Default Butterworth order
pub const DEFAULT_ORDER: usize = 4;

/// Filter response and cutoff(s) in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    LowPass(f32),
    HighPass(f32),
    BandPass { low: f32, high: f32 },
}

impl FilterKind {
    /// Linear interpolation between two filters of the same kind
    fn lerp(self, end: FilterKind, t: f32) -> Option<FilterKind> {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        match (self, end) {
            (FilterKind::LowPass(a), FilterKind::LowPass(b)) => {
                Some(FilterKind::LowPass(mix(a, b)))
            }
            (FilterKind::HighPass(a), FilterKind::HighPass(b)) => {
                Some(FilterKind::HighPass(mix(a, b)))
            }
            (
                FilterKind::BandPass { low: l0, high: h0 },
                FilterKind::BandPass { low: l1, high: h1 },
            ) => Some(FilterKind::BandPass {
                low: mix(l0, l1),
                high: mix(h0, h1),
            }),
            _ => None,
        }
    }
}

/// How the cascade is run over the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Forward then backward pass, no phase shift (offline only)
    #[default]
    ZeroPhase,
    /// Single causal forward pass
    Direct,
}

/// Filter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    /// Butterworth order (per edge for band-pass)
    pub order: usize,
    pub mode: FilterMode,
}

impl FilterSpec {
    /// Low-pass at `cutoff` Hz, default order, zero-phase
    pub fn low_pass(cutoff: f32) -> Self {
        Self::new(FilterKind::LowPass(cutoff))
    }

    /// High-pass at `cutoff` Hz, default order, zero-phase
    pub fn high_pass(cutoff: f32) -> Self {
        Self::new(FilterKind::HighPass(cutoff))
    }

    /// Band-pass between `low` and `high` Hz, default order, zero-phase
    pub fn band_pass(low: f32, high: f32) -> Self {
        Self::new(FilterKind::BandPass { low, high })
    }

    fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            order: DEFAULT_ORDER,
            mode: FilterMode::ZeroPhase,
        }
    }

    /// Set the Butterworth order
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Use a single causal pass
    pub fn direct(mut self) -> Self {
        self.mode = FilterMode::Direct;
        self
    }

    /// Use forward-backward filtering
    pub fn zero_phase(mut self) -> Self {
        self.mode = FilterMode::ZeroPhase;
        self
    }

    /// Check order and cutoffs against `sample_rate`
    pub fn validate(&self, sample_rate: u32) -> Result<()> {
        if self.order == 0 {
            return Err(SynthError::InvalidOrder);
        }
        match self.kind {
            FilterKind::LowPass(cutoff) | FilterKind::HighPass(cutoff) => {
                check_cutoff(cutoff, sample_rate)
            }
            FilterKind::BandPass { low, high } => {
                check_cutoff(low, sample_rate)?;
                check_cutoff(high, sample_rate)?;
                if low >= high {
                    return Err(SynthError::InvalidBand { low, high });
                }
                Ok(())
            }
        }
    }

    /// Validate and build the biquad cascade
    pub fn design(&self, sample_rate: u32) -> Result<Cascade> {
        self.validate(sample_rate)?;
        let sections = match self.kind {
            FilterKind::LowPass(cutoff) => {
                butterworth(Response::LowPass, cutoff, self.order, sample_rate)
            }
            FilterKind::HighPass(cutoff) => {
                butterworth(Response::HighPass, cutoff, self.order, sample_rate)
            }
            FilterKind::BandPass { low, high } => {
                let mut sections = butterworth(Response::HighPass, low, self.order, sample_rate);
                sections.extend(butterworth(Response::LowPass, high, self.order, sample_rate));
                sections
            }
        };
        Ok(Cascade { sections })
    }
}

fn check_cutoff(cutoff: f32, sample_rate: u32) -> Result<()> {
    let nyquist = nyquist(sample_rate);
    if !cutoff.is_finite() || cutoff <= 0.0 || cutoff >= nyquist {
        return Err(SynthError::InvalidCutoff { cutoff, nyquist });
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum Response {
    LowPass,
    HighPass,
}

/// Butterworth sections for `order`: one biquad per conjugate pole pair,
/// plus a first-order section when the order is odd
fn butterworth(response: Response, cutoff: f32, order: usize, sample_rate: u32) -> Vec<Biquad> {
    let cutoff = cutoff as f64;
    let sample_rate = sample_rate as f64;
    let n = order as f64;

    let mut sections: Vec<Biquad> = (1..=order / 2)
        .map(|k| {
            let q = 1.0 / (2.0 * ((2 * k - 1) as f64 * PI / (2.0 * n)).sin());
            Biquad::second_order(response, cutoff, q, sample_rate)
        })
        .collect();

    if order % 2 == 1 {
        sections.push(Biquad::first_order(response, cutoff, sample_rate));
    }

    sections
}

/// One filter section in Direct Form II Transposed
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn second_order(response: Response, cutoff: f64, q: f64, sample_rate: f64) -> Self {
        let omega = 2.0 * PI * cutoff / sample_rate;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * q);

        let (b0, b1, b2) = match response {
            Response::LowPass => {
                let edge = (1.0 - cos_omega) / 2.0;
                (edge, 1.0 - cos_omega, edge)
            }
            Response::HighPass => {
                let edge = (1.0 + cos_omega) / 2.0;
                (edge, -(1.0 + cos_omega), edge)
            }
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        Self::normalized(b0 / a0, b1 / a0, b2 / a0, a1 / a0, a2 / a0)
    }

    fn first_order(response: Response, cutoff: f64, sample_rate: f64) -> Self {
        let k = (PI * cutoff / sample_rate).tan();
        let a1 = (k - 1.0) / (k + 1.0);
        let (b0, b1) = match response {
            Response::LowPass => (k / (1.0 + k), k / (1.0 + k)),
            Response::HighPass => (1.0 / (1.0 + k), -1.0 / (1.0 + k)),
        };
        Self::normalized(b0, b1, 0.0, a1, 0.0)
    }

    fn normalized(b0: f64, b1: f64, b2: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Filter one sample
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

/// Series of biquad sections
#[derive(Debug, Clone)]
pub struct Cascade {
    sections: Vec<Biquad>,
}

impl Cascade {
    /// Number of sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when there are no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Filter one sample through every section
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.sections
            .iter_mut()
            .fold(input, |x, section| section.process(x))
    }

    /// Clear every section's state
    pub fn reset(&mut self) {
        self.sections.iter_mut().for_each(Biquad::reset);
    }

    /// Run forward over `samples` in place
    pub fn run(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample as f64) as f32;
        }
    }

    /// Run backward over `samples` in place
    pub fn run_reverse(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut().rev() {
            *sample = self.process(*sample as f64) as f32;
        }
    }
}

/// Apply a filter to samples (in-place)
///
/// # Arguments
/// * `samples` - Audio samples to filter (modified in-place)
/// * `spec` - Filter kind, order and mode
/// * `sample_rate` - Sample rate in Hz
///
/// # Errors
/// [`SynthError::InvalidCutoff`] for cutoffs outside (0, Nyquist),
/// [`SynthError::InvalidBand`] and [`SynthError::InvalidOrder`] for degenerate
/// designs. Validation happens before any sample is touched.
pub fn apply_filter(samples: &mut [f32], spec: &FilterSpec, sample_rate: u32) -> Result<()> {
    let mut cascade = spec.design(sample_rate)?;
    run_cascade(&mut cascade, samples, spec.mode);
    Ok(())
}

fn run_cascade(cascade: &mut Cascade, samples: &mut [f32], mode: FilterMode) {
    cascade.run(samples);
    if mode == FilterMode::ZeroPhase {
        cascade.reset();
        cascade.run_reverse(samples);
    }
}

/// Apply a filter whose cutoff moves linearly over the buffer (in-place)
///
/// The buffer is split into chunks of `chunk_duration` seconds. Each chunk is
/// filtered on its own by a freshly designed filter whose cutoff is
/// interpolated from `spec.kind` to `end` by the chunk's start position.
/// Chunk boundaries are not smoothed, so small seams are expected.
///
/// # Arguments
/// * `samples` - Audio samples to filter (modified in-place)
/// * `spec` - Starting filter (order and mode apply to every chunk)
/// * `end` - Filter reached at the end of the buffer, same kind as `spec.kind`
/// * `chunk_duration` - Chunk length in seconds
/// * `sample_rate` - Sample rate in Hz
pub fn sweep_filter(
    samples: &mut [f32],
    spec: &FilterSpec,
    end: FilterKind,
    chunk_duration: f32,
    sample_rate: u32,
) -> Result<()> {
    let end_spec = FilterSpec { kind: end, ..*spec };
    spec.validate(sample_rate)?;
    end_spec.validate(sample_rate)?;
    if spec.kind.lerp(end, 0.0).is_none() {
        return Err(SynthError::FilterKindMismatch);
    }

    let chunk_size = sample_count(chunk_duration, sample_rate)?.max(1);
    let total = samples.len();

    for (index, chunk) in samples.chunks_mut(chunk_size).enumerate() {
        let t = (index * chunk_size) as f32 / total as f32;
        let kind = spec
            .kind
            .lerp(end, t)
            .ok_or(SynthError::FilterKindMismatch)?;
        let mut cascade = FilterSpec { kind, ..*spec }.design(sample_rate)?;
        run_cascade(&mut cascade, chunk, spec.mode);
    }

    Ok(())
}
