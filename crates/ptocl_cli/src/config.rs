//! Render settings: defaults, an optional JSON file, then command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use ptocl_compiler::{RenderOptions, DEFAULT_ROWS_PER_BATCH};
use serde::{Deserialize, Serialize};

/// Built-in scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SceneName {
    /// Walled room with spheres, a cylinder, a cube and a small triangle group
    Reference,
    /// Tessellated height field in nested groups
    Groups,
}

/// Everything a single render needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub aperture: f64,
    pub focal_length: f64,
    pub scene: SceneName,
    pub rows_per_batch: u32,
    /// Leaf size for group subdivision, 0 leaves groups as built
    pub divide_threshold: usize,
    pub seed: Option<u64>,
    pub output: PathBuf,
    pub raw: Option<PathBuf>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            samples: 1,
            aperture: 0.0,
            focal_length: 0.0,
            scene: SceneName::Reference,
            rows_per_batch: DEFAULT_ROWS_PER_BATCH,
            divide_threshold: 0,
            seed: None,
            output: PathBuf::from("render.png"),
            raw: None,
        }
    }
}

impl RenderSettings {
    /// Read settings from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("image size must be non-zero, got {}x{}", self.width, self.height);
        }
        if self.samples == 0 {
            bail!("samples must be at least 1");
        }
        if self.aperture < 0.0 || self.focal_length < 0.0 {
            bail!("aperture and focal length must not be negative");
        }
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            samples: self.samples,
            rows_per_batch: self.rows_per_batch,
            seed: self.seed,
        }
    }
}

/// Command-line flags. Anything given here overrides the config file.
#[derive(Debug, Parser)]
#[command(name = "ptocl", version, about = "Compile a scene into flat records and render it")]
pub struct Args {
    /// JSON settings file
    #[arg(long, short)]
    pub config: Option<PathBuf>,
    /// Image width in pixels [default: 640]
    #[arg(long)]
    pub width: Option<u32>,
    /// Image height in pixels [default: 480]
    #[arg(long)]
    pub height: Option<u32>,
    /// Samples per pixel [default: 1]
    #[arg(long)]
    pub samples: Option<u32>,
    /// Camera aperture
    #[arg(long)]
    pub aperture: Option<f64>,
    /// Camera focal length
    #[arg(long)]
    pub focal_length: Option<f64>,
    /// Scene to render [default: reference]
    #[arg(long, value_enum)]
    pub scene: Option<SceneName>,
    /// Image rows per backend dispatch [default: 4]
    #[arg(long)]
    pub rows_per_batch: Option<u32>,
    /// Subdivide groups down to this many children, 0 disables
    #[arg(long)]
    pub divide_threshold: Option<usize>,
    /// Seed for reproducible renders
    #[arg(long)]
    pub seed: Option<u64>,
    /// PNG output path [default: render.png]
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Also write the raw float image here
    #[arg(long)]
    pub raw: Option<PathBuf>,
}

impl Args {
    /// Merge defaults, the config file (if any) and the flags, in that order.
    pub fn resolve(&self) -> Result<RenderSettings> {
        let mut settings = match &self.config {
            Some(path) => RenderSettings::load(path)?,
            None => RenderSettings::default(),
        };
        self.apply(&mut settings);
        settings.validate()?;
        Ok(settings)
    }

    fn apply(&self, settings: &mut RenderSettings) {
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(samples) = self.samples {
            settings.samples = samples;
        }
        if let Some(aperture) = self.aperture {
            settings.aperture = aperture;
        }
        if let Some(focal_length) = self.focal_length {
            settings.focal_length = focal_length;
        }
        if let Some(scene) = self.scene {
            settings.scene = scene;
        }
        if let Some(rows) = self.rows_per_batch {
            settings.rows_per_batch = rows;
        }
        if let Some(threshold) = self.divide_threshold {
            settings.divide_threshold = threshold;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if self.raw.is_some() {
            settings.raw = self.raw.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert_eq!((settings.width, settings.height), (640, 480));
        assert_eq!(settings.samples, 1);
        assert_eq!(settings.scene, SceneName::Reference);
        assert_eq!(settings.divide_threshold, 0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            RenderSettings::from_json(r#"{ "width": 320, "scene": "groups", "seed": 9 }"#).unwrap();
        assert_eq!(settings.width, 320);
        assert_eq!(settings.height, 480);
        assert_eq!(settings.scene, SceneName::Groups);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.output, PathBuf::from("render.png"));
    }

    #[test]
    fn test_unknown_keys_and_scenes_are_rejected() {
        assert!(RenderSettings::from_json(r#"{ "widht": 320 }"#).is_err());
        assert!(RenderSettings::from_json(r#"{ "scene": "cornell" }"#).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "width": 100, "height": 50, "samples": 8 }}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::parse_from(["ptocl", "--config", &path, "--samples", "2", "--raw", "out.raw"]);
        let settings = args.resolve().unwrap();

        assert_eq!((settings.width, settings.height), (100, 50));
        assert_eq!(settings.samples, 2);
        assert_eq!(settings.raw, Some(PathBuf::from("out.raw")));
    }

    #[test]
    fn test_invalid_settings() {
        let args = Args::parse_from(["ptocl", "--width", "0"]);
        assert!(args.resolve().is_err());

        let args = Args::parse_from(["ptocl", "--samples", "0"]);
        assert!(args.resolve().is_err());

        assert!(Args::parse_from(["ptocl", "--config", "/nonexistent/ptocl.json"])
            .resolve()
            .is_err());
    }

    #[test]
    fn test_render_options() {
        let args = Args::parse_from(["ptocl", "--rows-per-batch", "16", "--seed", "5"]);
        let options = args.resolve().unwrap().render_options();
        assert_eq!(options.rows_per_batch, 16);
        assert_eq!(options.seed, Some(5));
        assert_eq!(options.samples, 1);
    }
}
