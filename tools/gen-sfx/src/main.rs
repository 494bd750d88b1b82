//! gen-sfx - renders the intro sound effects
//!
//! # Commands
//!
//! - `gen-sfx render` - Synthesize clips and write them to the output directory
//! - `gen-sfx list` - Show the available clips
//!
//! # Usage
//!
//! ```bash
//! # Every clip into assets/sounds, encoded with ffmpeg when available
//! gen-sfx render
//!
//! # Reproducible WAV-only render of a single clip
//! gen-sfx render --clip big-bang-impact --seed 7 --no-transcode
//! ```
//!
//! # Manifest (sfx.toml)
//!
//! ```toml
//! [output]
//! dir = "assets/sounds"
//! format = "mp3"
//! bitrate = "128k"
//!
//! [render]
//! seed = 7
//!
//! [[clips]]
//! name = "big-bang-impact"
//! duration = 0.8
//! ```
//!
//! Set `RUST_LOG=debug` to trace every synthesis stage.

mod manifest;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use proc_sfx::{Clip, Level};

/// gen-sfx - procedural sound effects for the intro sequence
#[derive(Parser)]
#[command(name = "gen-sfx")]
#[command(about = "Render the intro sound effects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize clips and write them to the output directory
    Render(render::RenderArgs),

    /// List the available clips
    List,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => render::execute(args),
        Commands::List => {
            list();
            Ok(())
        }
    }
}

fn list() {
    println!(
        "{:<20} {:>8} {:>8} {:>6}  Description",
        "Name", "Length", "Peak", "Width"
    );
    for clip in Clip::ALL {
        let peak = match clip.target() {
            Level::Dbfs(db) => format!("{db} dB"),
            Level::Linear(amplitude) => format!("{amplitude:.2}"),
        };
        println!(
            "{:<20} {:>7}s {:>8} {:>6.1}  {}",
            clip.name(),
            clip.default_duration(),
            peak,
            clip.stereo_width(),
            clip.description()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::try_parse_from([
            "gen-sfx",
            "render",
            "--clip",
            "big-bang-impact",
            "--clip",
            "stellar-twinkle",
            "--seed",
            "7",
            "--no-transcode",
            "--parallel",
        ])
        .unwrap();

        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.clips, vec![Clip::ImpactBoom, Clip::StellarChime]);
        assert_eq!(args.seed, Some(7));
        assert!(args.no_transcode);
        assert!(args.parallel);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_clip() {
        assert!(Cli::try_parse_from(["gen-sfx", "render", "--clip", "laser"]).is_err());
    }
}
