//! Render command - synthesize clips and write them to the output directory

use anyhow::{bail, Context, Result};
use clap::Args;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{error, info, warn};

use proc_sfx::{
    codec_for, Clip, ExportFormat, Exporter, FfmpegTranscoder, RenderedClip, Synth, SynthConfig,
    TranscodeSettings, SAMPLE_RATE,
};

use crate::manifest::SfxManifest;

const DEFAULT_OUTPUT_DIR: &str = "assets/sounds";

/// Arguments for the render command
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    /// Output directory [default: assets/sounds]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to an sfx.toml manifest
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Render only this clip (repeatable)
    #[arg(long = "clip", value_name = "NAME")]
    pub clips: Vec<Clip>,

    /// Base seed for the noise layers (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sample rate in Hz [default: 44100]
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Keep plain WAV files, never run the encoder
    #[arg(long)]
    pub no_transcode: bool,

    /// Encoder program [default: ffmpeg]
    #[arg(long)]
    pub encoder: Option<PathBuf>,

    /// Encoder bitrate [default: 128k]
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Render clips on all cores (export stays sequential)
    #[arg(long)]
    pub parallel: bool,
}

/// Everything a run needs, after merging flags, manifest and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub output_dir: PathBuf,
    pub sample_rate: u32,
    pub seed: Option<u64>,
    /// `None` disables transcoding
    pub encoder: Option<PathBuf>,
    pub settings: TranscodeSettings,
    pub jobs: Vec<(Clip, f32)>,
    pub parallel: bool,
}

impl RenderPlan {
    /// Merge command-line flags over the manifest
    pub fn resolve(args: &RenderArgs, manifest: &SfxManifest) -> Result<Self> {
        let sample_rate = args
            .sample_rate
            .or(manifest.render.sample_rate)
            .unwrap_or(SAMPLE_RATE);

        let clips: Vec<Clip> = if !args.clips.is_empty() {
            args.clips.clone()
        } else if !manifest.clips.is_empty() {
            manifest
                .clips
                .iter()
                .map(|entry| {
                    entry
                        .name
                        .parse::<Clip>()
                        .with_context(|| "Invalid [[clips]] entry in manifest".to_string())
                })
                .collect::<Result<_>>()?
        } else {
            Clip::ALL.to_vec()
        };

        let jobs = clips
            .into_iter()
            .map(|clip| {
                let duration = manifest
                    .duration_for(clip.name())
                    .unwrap_or_else(|| clip.default_duration());
                (clip, duration)
            })
            .collect();

        let transcode = !args.no_transcode && manifest.output.transcode.unwrap_or(true);
        let encoder = transcode.then(|| {
            args.encoder
                .clone()
                .or_else(|| manifest.encoder.program.clone())
                .unwrap_or_else(|| PathBuf::from("ffmpeg"))
        });

        let defaults = TranscodeSettings::default();
        let settings = TranscodeSettings {
            bitrate: args
                .bitrate
                .clone()
                .or_else(|| manifest.output.bitrate.clone())
                .unwrap_or(defaults.bitrate),
            sample_rate,
            extension: manifest.output.format.clone().unwrap_or(defaults.extension),
        };

        let extension = settings.extension.as_str();
        if encoder.is_some()
            && !extension.eq_ignore_ascii_case("wav")
            && codec_for(extension).is_none()
        {
            bail!("Unsupported output format '{extension}' (expected mp3, ogg, opus or wav)");
        }

        Ok(Self {
            output_dir: args
                .output
                .clone()
                .or_else(|| manifest.output.dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            sample_rate,
            seed: args.seed.or(manifest.render.seed),
            encoder,
            settings,
            jobs,
            parallel: args.parallel,
        })
    }

    /// Seed for one clip, stable no matter which clips are selected
    pub fn seed_for(&self, clip: Clip) -> Option<u64> {
        let index = Clip::ALL.iter().position(|&c| c == clip).unwrap_or(0);
        self.seed.map(|seed| seed.wrapping_add(index as u64))
    }

    fn exporter(&self) -> Exporter {
        let exporter = Exporter::new(&self.output_dir).with_settings(self.settings.clone());
        match &self.encoder {
            Some(program) => {
                let transcoder = FfmpegTranscoder::new(program);
                if !transcoder.is_available() {
                    warn!(
                        "Encoder '{}' not found, clips will be kept as WAV data",
                        program.display()
                    );
                }
                exporter.with_transcoder(transcoder)
            }
            None => exporter,
        }
    }
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<()> {
    let manifest = match &args.config {
        Some(path) => SfxManifest::load(path)?,
        None => SfxManifest::default(),
    };
    let plan = RenderPlan::resolve(&args, &manifest)?;
    run(&plan)
}

/// Render and export every clip in the plan
///
/// A failing clip does not stop the others; the run fails at the end if any
/// clip did.
pub fn run(plan: &RenderPlan) -> Result<()> {
    let synth = Synth::new(SynthConfig::new(plan.sample_rate));
    let exporter = plan.exporter();

    info!(
        dir = %plan.output_dir.display(),
        clips = plan.jobs.len(),
        sample_rate = plan.sample_rate,
        "Generating sound effects"
    );

    let render = |&(clip, duration): &(Clip, f32)| {
        synth.render(clip, duration, plan.seed_for(clip))
    };
    let rendered: Vec<proc_sfx::Result<RenderedClip>> = if plan.parallel {
        plan.jobs.par_iter().map(render).collect()
    } else {
        plan.jobs.iter().map(render).collect()
    };

    let mut failed = 0;
    for ((clip, _), result) in plan.jobs.iter().zip(rendered) {
        let outcome = result.and_then(|r| {
            info!(clip = clip.name(), seed = r.seed, "Rendered");
            exporter.export(clip.name(), &r.buffer)
        });

        match outcome {
            Ok(file) => {
                let note = match file.format {
                    ExportFormat::Compressed => "",
                    ExportFormat::Wav if file.path.extension().is_some_and(|e| e != "wav") => {
                        " (WAV data)"
                    }
                    ExportFormat::Wav => "",
                };
                println!(
                    "  {:<20} {:>8.1} KB  {}{}",
                    clip.name(),
                    file.size_kb(),
                    file.path.display(),
                    note
                );
            }
            Err(err) => {
                error!(clip = clip.name(), %err, "Failed to generate clip");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} clips failed", failed, plan.jobs.len());
    }

    println!(
        "\nGenerated {} clips in {}",
        plan.jobs.len(),
        plan.output_dir.display()
    );
    Ok(())
}
