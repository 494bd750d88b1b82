//! sfx.toml manifest parsing
//!
//! Every field is optional; command-line flags win over the manifest, and
//! the manifest wins over built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// sfx.toml manifest structure
#[derive(Debug, Default, Deserialize)]
pub struct SfxManifest {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub encoder: EncoderSection,
    /// Clips to render; empty means all of them
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
}

/// Where and how clips are written
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Output directory (default: assets/sounds)
    pub dir: Option<PathBuf>,
    /// Compressed file extension (default: mp3)
    pub format: Option<String>,
    /// Encoder bitrate (default: 128k)
    pub bitrate: Option<String>,
    /// Run the encoder at all (default: true)
    pub transcode: Option<bool>,
}

/// Synthesis settings
#[derive(Debug, Default, Deserialize)]
pub struct RenderSection {
    pub sample_rate: Option<u32>,
    /// Base seed for the noise layers
    pub seed: Option<u64>,
}

/// External encoder
#[derive(Debug, Default, Deserialize)]
pub struct EncoderSection {
    /// Program name or path (default: ffmpeg)
    pub program: Option<PathBuf>,
}

/// Single clip entry
#[derive(Debug, Deserialize)]
pub struct ClipEntry {
    /// Clip file stem, e.g. "big-bang-impact"
    pub name: String,
    /// Length in seconds; the clip's default when absent
    #[serde(default)]
    pub duration: Option<f32>,
}

impl SfxManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse sfx.toml")
    }

    /// Duration override for a clip, if the manifest lists one
    pub fn duration_for(&self, name: &str) -> Option<f32> {
        self.clips
            .iter()
            .find(|entry| entry.name == name)
            .and_then(|entry| entry.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_empty() {
        let manifest = SfxManifest::parse("").unwrap();
        assert!(manifest.output.dir.is_none());
        assert!(manifest.render.seed.is_none());
        assert!(manifest.clips.is_empty());
    }

    #[test]
    fn test_manifest_full() {
        let toml = r#"
[output]
dir = "public/sounds"
format = "ogg"
bitrate = "96k"
transcode = false

[render]
sample_rate = 48000
seed = 7

[encoder]
program = "/opt/ffmpeg/bin/ffmpeg"

[[clips]]
name = "big-bang-impact"
duration = 1.2

[[clips]]
name = "stellar-twinkle"
"#;

        let manifest = SfxManifest::parse(toml).unwrap();
        assert_eq!(manifest.output.dir, Some(PathBuf::from("public/sounds")));
        assert_eq!(manifest.output.format.as_deref(), Some("ogg"));
        assert_eq!(manifest.output.bitrate.as_deref(), Some("96k"));
        assert_eq!(manifest.output.transcode, Some(false));
        assert_eq!(manifest.render.sample_rate, Some(48000));
        assert_eq!(manifest.render.seed, Some(7));
        assert_eq!(
            manifest.encoder.program,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert_eq!(manifest.clips.len(), 2);
        assert_eq!(manifest.duration_for("big-bang-impact"), Some(1.2));
        assert_eq!(manifest.duration_for("stellar-twinkle"), None);
        assert_eq!(manifest.duration_for("space-ambient"), None);
    }

    #[test]
    fn test_manifest_invalid() {
        assert!(SfxManifest::parse("[render]\nsample_rate = \"fast\"").is_err());
        assert!(SfxManifest::parse("[[clips]]\nduration = 1.0").is_err());
    }

    #[test]
    fn test_manifest_load_missing_file() {
        let err = SfxManifest::load(Path::new("does/not/exist/sfx.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read manifest"));
    }
}
