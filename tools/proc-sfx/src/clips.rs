//! The intro sound effects
//!
//! Each [`Clip`] is a fixed layered recipe. Recipes return a mono buffer of
//! exactly `round(duration * sample_rate)` samples; [`Synth::render`] takes
//! care of normalization and stereo width.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::dynamics::{feedback_delay, mix, saturate, tremolo, Level};
use crate::envelope::{
    apply_attack, apply_curve, exp_decay, exp_rise, fade_in, fade_out, lfo, power_curve, Envelope,
};
use crate::error::{Result, SynthError};
use crate::filters::{sweep_filter, FilterKind, FilterSpec};
use crate::noise::{white_noise, NoiseRng};
use crate::oscillators::{HarmonicBank, Partial};
use crate::synth::Synth;
use crate::AudioBuffer;

/// C major triad: C4, E4, G4
const C_MAJOR: [f32; 3] = [261.63, 329.63, 392.00];

/// Bell partials as (ratio, amplitude, decay rate)
const BELL_PARTIALS: [Partial; 4] = [
    Partial::decaying(1.0, 1.0, 12.0),
    Partial::decaying(2.76, 0.5, 10.8),
    Partial::decaying(5.40, 0.25, 9.6),
    Partial::decaying(8.93, 0.15, 8.4),
];

const PIANO_PARTIALS: [Partial; 4] = [
    Partial::new(1.0, 1.0),
    Partial::new(2.0, 0.5),
    Partial::new(3.0, 0.25),
    Partial::new(4.0, 0.125),
];

const PAD_PARTIALS: [Partial; 2] = [Partial::new(1.0, 1.0), Partial::new(2.0, 0.3)];

/// Riser filter chunk length in seconds
const RISER_CHUNK: f32 = 0.1;

/// One of the five intro sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clip {
    /// Deep cosmic drone with high shimmer, loopable
    AmbientDrone,
    /// Sub-bass boom with a falling pitch
    ImpactBoom,
    /// Noise whoosh rising in pitch and level
    ParticleRiser,
    /// Short crystalline bell
    StellarChime,
    /// Warm C major chord swell
    ChordReveal,
}

impl Clip {
    /// Every clip, in render order
    pub const ALL: [Clip; 5] = [
        Clip::AmbientDrone,
        Clip::ImpactBoom,
        Clip::ParticleRiser,
        Clip::StellarChime,
        Clip::ChordReveal,
    ];

    /// Output file stem
    pub fn name(self) -> &'static str {
        match self {
            Clip::AmbientDrone => "space-ambient",
            Clip::ImpactBoom => "big-bang-impact",
            Clip::ParticleRiser => "particle-expansion",
            Clip::StellarChime => "stellar-twinkle",
            Clip::ChordReveal => "avatar-reveal",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Clip::AmbientDrone => "Deep cosmic drone with shimmer",
            Clip::ImpactBoom => "Sub-bass boom impact",
            Clip::ParticleRiser => "Rising noise whoosh",
            Clip::StellarChime => "Crystalline bell chime",
            Clip::ChordReveal => "Warm C major chord reveal",
        }
    }

    /// Default length in seconds
    pub fn default_duration(self) -> f32 {
        match self {
            Clip::AmbientDrone => 9.0,
            Clip::ImpactBoom => 0.8,
            Clip::ParticleRiser => 4.0,
            Clip::StellarChime => 0.25,
            Clip::ChordReveal => 1.8,
        }
    }

    /// Peak level after normalization
    pub fn target(self) -> Level {
        match self {
            Clip::ImpactBoom => Level::Dbfs(-3.0),
            Clip::StellarChime => Level::Dbfs(-9.0),
            Clip::AmbientDrone | Clip::ParticleRiser | Clip::ChordReveal => Level::Dbfs(-6.0),
        }
    }

    /// Stereo width passed to [`crate::widen`]
    pub fn stereo_width(self) -> f32 {
        match self {
            Clip::AmbientDrone => 0.3,
            Clip::ImpactBoom => 0.2,
            Clip::ParticleRiser => 0.7,
            Clip::StellarChime => 0.4,
            Clip::ChordReveal => 0.5,
        }
    }

    /// Look a clip up by its file stem
    pub fn from_name(name: &str) -> Option<Clip> {
        Clip::ALL.into_iter().find(|clip| clip.name() == name)
    }

    /// Run the recipe, before normalization
    pub(crate) fn compose(
        self,
        synth: &Synth,
        duration: f32,
        rng: &mut NoiseRng,
    ) -> Result<Vec<f32>> {
        match self {
            Clip::AmbientDrone => ambient_drone(synth, duration, rng),
            Clip::ImpactBoom => impact_boom(synth, duration, rng),
            Clip::ParticleRiser => particle_riser(synth, duration, rng),
            Clip::StellarChime => stellar_chime(synth, duration),
            Clip::ChordReveal => chord_reveal(synth, duration),
        }
    }
}

impl fmt::Display for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Clip {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        Clip::from_name(s).ok_or_else(|| SynthError::UnknownClip(s.to_string()))
    }
}

/// A rendered clip and the seed that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedClip {
    pub clip: Clip,
    pub seed: u64,
    /// Stereo, normalized
    pub buffer: AudioBuffer,
}

fn ambient_drone(synth: &Synth, duration: f32, rng: &mut NoiseRng) -> Result<Vec<f32>> {
    let sr = synth.sample_rate();

    // Sub-bass drifting 35..65 Hz
    let bass = HarmonicBank::new(50.0)
        .partial(1.0, 1.0)
        .partial(2.0, 0.3)
        .with_vibrato(15.0, 0.1);
    let bass = synth.bank(&bass, duration)?;

    let mid = HarmonicBank::new(120.0).partial(1.0, 0.4).partial(1.5, 0.2);
    let mid = synth.bank(&mid, duration)?;

    let band = FilterSpec::band_pass(2000.0, 8000.0).with_order(6).direct();
    let mut shimmer = synth.filtered_noise(duration, 0.15, &band, rng)?;
    let drift = lfo(shimmer.len(), 0.5, 0.5, 0.3, sr);
    apply_curve(&mut shimmer, &drift)?;
    feedback_delay(&mut shimmer, synth.samples_for(0.08)?, 0.3)?;
    debug!(samples = bass.len(), "Drone layers ready");

    let mut out = mix(&[(&bass, 0.6), (&mid, 0.25), (&shimmer, 0.15)])?;

    let fade = synth.samples_for(0.5)?;
    fade_in(&mut out, fade);
    fade_out(&mut out, fade);

    Ok(out)
}

fn impact_boom(synth: &Synth, duration: f32, rng: &mut NoiseRng) -> Result<Vec<f32>> {
    let tone = synth.harmonic_sweep(300.0, 30.0, &[(1.0, 1.0), (2.0, 0.5)], duration)?;
    let rumble = synth.filtered_noise(duration, 0.3, &FilterSpec::low_pass(200.0).direct(), rng)?;
    debug!(samples = tone.len(), "Impact layers ready");

    let mut out = mix(&[(&tone, 0.7), (&rumble, 0.3)])?;
    let decay = exp_decay(out.len(), 4.0);
    apply_curve(&mut out, &decay)?;
    apply_attack(&mut out, synth.samples_for(0.005)?, 1.0);

    // Punch
    saturate(&mut out, 1.5);

    Ok(out)
}

fn particle_riser(synth: &Synth, duration: f32, rng: &mut NoiseRng) -> Result<Vec<f32>> {
    let sr = synth.sample_rate();
    let mut out = white_noise(duration, 1.0, sr, rng)?;

    sweep_filter(
        &mut out,
        &FilterSpec::high_pass(200.0).direct(),
        FilterKind::HighPass(8000.0),
        RISER_CHUNK,
        sr,
    )?;
    debug!(samples = out.len(), "Riser sweep done");

    let swell = power_curve(out.len(), 1.5);
    apply_curve(&mut out, &swell)?;
    tremolo(&mut out, 0.1, 2.0, sr);

    Ok(out)
}

fn stellar_chime(synth: &Synth, duration: f32) -> Result<Vec<f32>> {
    let bell = HarmonicBank {
        fundamental: 2000.0,
        partials: BELL_PARTIALS.to_vec(),
        vibrato: None,
    };
    let mut out = synth.bank(&bell, duration)?;
    debug!(samples = out.len(), partials = bell.partials.len(), "Bell rendered");

    apply_attack(&mut out, synth.samples_for(0.01)?, 2.0);
    // Land on silence without a click
    fade_out(&mut out, synth.samples_for(0.002)?);

    Ok(out)
}

fn chord_reveal(synth: &Synth, duration: f32) -> Result<Vec<f32>> {
    let sr = synth.sample_rate();

    let mut piano = synth.chord(&C_MAJOR, &PIANO_PARTIALS, duration)?;
    let decay = exp_decay(piano.len(), 2.5);
    apply_curve(&mut piano, &decay)?;
    apply_attack(&mut piano, synth.samples_for(0.02)?, 2.0);

    let mut pad = synth.chord(&C_MAJOR, &PAD_PARTIALS, duration)?;
    let rise = exp_rise(pad.len(), 3.0);
    let fall = exp_decay(pad.len(), 0.5);
    apply_curve(&mut pad, &rise)?;
    apply_curve(&mut pad, &fall)?;
    debug!(samples = piano.len(), "Chord layers ready");

    let mut out = mix(&[(&piano, 0.6), (&pad, 0.16)])?;
    feedback_delay(&mut out, synth.samples_for(0.06)?, 0.2)?;

    // Warmth
    saturate(&mut out, 0.8);
    Envelope::swell().apply(&mut out, sr);

    Ok(out)
}
