//! Mono to stereo imaging

use crate::error::{Result, SynthError};
use crate::AudioBuffer;

/// Spread a mono signal across two channels
///
/// The left channel is the input. The right channel is the input delayed by
/// `round(width * 1 ms)` samples: padded with silence at the front and cut to
/// the input length. A width of 0 gives identical channels.
///
/// # Arguments
/// * `mono` - Mono samples
/// * `width` - Decorrelation amount, 0.0..=1.0 (1.0 = 1 ms delay)
/// * `sample_rate` - Sample rate in Hz
pub fn widen(mono: &[f32], width: f32, sample_rate: u32) -> Result<AudioBuffer> {
    if !(0.0..=1.0).contains(&width) {
        return Err(SynthError::InvalidWidth(width));
    }

    let delay = (width as f64 * sample_rate as f64 / 1000.0).round() as usize;
    let delay = delay.min(mono.len());

    let mut right = vec![0.0f32; delay];
    right.extend_from_slice(&mono[..mono.len() - delay]);

    AudioBuffer::stereo(sample_rate, mono, &right)
}

/// Dual-mono copy of a mono buffer; stereo buffers pass through unchanged
pub fn upmix(buffer: &AudioBuffer) -> AudioBuffer {
    if buffer.channels == 2 {
        return buffer.clone();
    }

    let mut samples = Vec::with_capacity(buffer.samples.len() * 2);
    for &sample in &buffer.samples {
        samples.push(sample);
        samples.push(sample);
    }

    AudioBuffer {
        sample_rate: buffer.sample_rate,
        channels: 2,
        samples,
    }
}
