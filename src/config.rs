// Config Module - Configuration management and command-line argument parsing
use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::animation::SceneSettings;
use crate::background::DEFAULT_PARTICLE_COLORS;
use crate::types::{parse_color_list, Rgba};

#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Animated field of rotating, breathing decorative wheels",
    long_about = "Tiles the canvas with wheel motifs in a hexagonal grid over a drifting particle background.\n\
                  Runs live in the terminal (press 'a' to pause/resume, 'q' to quit) or exports PNG frames."
)]
pub struct Args {
    /// Config name (in ~/.config/wheelfield) or path to a config file
    #[arg(long)]
    pub cfg: Option<String>,

    /// Target framerate
    #[arg(short, long)]
    pub fps: Option<f64>,

    /// Number of background particles
    #[arg(short, long)]
    pub particles: Option<usize>,

    /// How many base radii fit across the shorter canvas side
    #[arg(short, long)]
    pub density: Option<f64>,

    /// Random seed for a reproducible layout
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Raster pixels per terminal half-cell, per axis
    #[arg(long)]
    pub supersample: Option<u32>,

    /// Start with the animation paused
    #[arg(long, conflicts_with = "animate")]
    pub paused: bool,

    /// Start with the animation running, even if the config file says paused
    #[arg(long)]
    pub animate: bool,

    /// Palettes to use: "all" or a comma-separated list of names
    #[arg(long)]
    pub palettes: Option<String>,

    /// Render this many frames to PNG files instead of running in the terminal
    #[arg(short, long)]
    pub export: Option<usize>,

    /// Output directory for exported frames
    #[arg(short, long)]
    pub out: Option<String>,

    /// Export canvas width in pixels
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Export canvas height in pixels
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Print the palette names and exit
    #[arg(long)]
    pub list_palettes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    pub fps: f64,                 // Frames per second for the live view
    pub particle_count: usize,    // Background particles
    pub density: f64,             // Base radius = min(width, height) / density
    pub seed: Option<u64>,        // Fixed seed, random when absent
    pub supersample: u32,         // Raster pixels per half-cell (live view)
    pub start_animated: bool,     // Animation flag at startup
    pub palettes: String,         // "all" or comma-separated palette names
    pub background_color: String, // Hex clear color
    pub particle_colors: String,  // Comma-separated hex base colors for particles
    pub export_width: u32,
    pub export_height: u32,
    pub export_frames: usize,
    pub export_dir: String,
}

impl Default for SketchConfig {
    fn default() -> Self {
        SketchConfig {
            config_path: None,
            fps: 60.0,
            particle_count: 2580,
            density: 10.0,
            seed: None,
            supersample: 3,
            start_animated: true,
            palettes: "all".to_string(),
            background_color: "045783".to_string(),
            particle_colors: DEFAULT_PARTICLE_COLORS.to_string(),
            export_width: 1000,
            export_height: 800,
            export_frames: 120,
            export_dir: "frames".to_string(),
        }
    }
}

impl SketchConfig {
    /// Apply explicitly given command-line values. Returns true if any were set.
    pub fn merge_with_args(&mut self, args: &Args) -> bool {
        let mut args_provided = false;

        if let Some(fps) = args.fps {
            self.fps = fps;
            args_provided = true;
        }

        if let Some(particles) = args.particles {
            self.particle_count = particles;
            args_provided = true;
        }

        if let Some(density) = args.density {
            self.density = density;
            args_provided = true;
        }

        if let Some(seed) = args.seed {
            self.seed = Some(seed);
            args_provided = true;
        }

        if let Some(supersample) = args.supersample {
            self.supersample = supersample;
            args_provided = true;
        }

        if args.paused {
            self.start_animated = false;
            args_provided = true;
        }

        if args.animate {
            self.start_animated = true;
            args_provided = true;
        }

        if let Some(ref palettes) = args.palettes {
            self.palettes = palettes.clone();
            args_provided = true;
        }

        if let Some(frames) = args.export {
            self.export_frames = frames;
            args_provided = true;
        }

        if let Some(ref out) = args.out {
            self.export_dir = out.clone();
            args_provided = true;
        }

        if let Some(width) = args.width {
            self.export_width = width;
            args_provided = true;
        }

        if let Some(height) = args.height {
            self.export_height = height;
            args_provided = true;
        }

        if args_provided {
            self.sanitize();
        }
        args_provided
    }

    pub fn config_path(cfg_arg: Option<&str>) -> Result<PathBuf> {
        if let Some(cfg) = cfg_arg {
            let path = PathBuf::from(cfg);
            if path.is_absolute() || cfg.contains('/') || cfg.contains('\\') {
                return Ok(path);
            }

            // Otherwise treat as config name in the config directory
            let filename = if cfg.ends_with(".conf") {
                cfg.to_string()
            } else {
                format!("{}.conf", cfg)
            };
            Ok(Self::config_dir()?.join(filename))
        } else {
            Ok(Self::config_dir()?.join("config.conf"))
        }
    }

    fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".config").join("wheelfield"))
    }

    pub fn load_file(path: PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut parsed: Self =
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        parsed.config_path = Some(path);
        parsed.sanitize();
        Ok(parsed)
    }

    /// Load the config file if it exists, defaults otherwise. A named config that is missing is an error.
    pub fn load_or_default(cfg_arg: Option<&str>) -> Result<Self> {
        let path = Self::config_path(cfg_arg)?;
        if path.exists() {
            return Self::load_file(path);
        }
        if cfg_arg.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let mut config = Self::default();
        config.config_path = Some(path);
        Ok(config)
    }

    /// Sanitize config values to handle common formatting issues
    pub fn sanitize(&mut self) {
        self.background_color = Self::sanitize_color_string(&self.background_color);
        self.particle_colors = Self::sanitize_color_string(&self.particle_colors);
        self.palettes = self.palettes.trim().to_lowercase();
        self.export_dir = self.export_dir.trim().to_string();

        if self.background_color.is_empty() {
            self.background_color = "045783".to_string();
        }
        if self.particle_colors.is_empty() {
            self.particle_colors = DEFAULT_PARTICLE_COLORS.to_string();
        }
        if self.palettes.is_empty() {
            self.palettes = "all".to_string();
        }
        if self.export_dir.is_empty() {
            self.export_dir = "frames".to_string();
        }

        // Clamp numeric values to reasonable ranges
        if !self.fps.is_finite() {
            self.fps = 60.0;
        }
        self.fps = self.fps.clamp(1.0, 240.0);
        self.particle_count = self.particle_count.min(100_000);
        if !self.density.is_finite() {
            self.density = 10.0;
        }
        self.density = self.density.clamp(1.0, 100.0);
        self.supersample = self.supersample.clamp(1, 8);
        self.export_width = self.export_width.clamp(16, 8192);
        self.export_height = self.export_height.clamp(16, 8192);
        self.export_frames = self.export_frames.clamp(1, 100_000);
    }

    /// Sanitize a color string (hex colors or comma-separated list)
    fn sanitize_color_string(color: &str) -> String {
        color
            .trim()
            .to_uppercase()
            .split(',')
            .map(|s| s.trim().trim_start_matches('#'))
            .filter(|s| !s.is_empty())
            .filter(|s| s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn background(&self) -> Result<Rgba> {
        Rgba::from_hex(&self.background_color)
    }

    pub fn scene_settings(&self) -> Result<SceneSettings> {
        Ok(SceneSettings {
            particle_count: self.particle_count,
            particle_colors: parse_color_list(&self.particle_colors)?,
            background: self.background()?,
            density: self.density,
            animate: self.start_animated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_build_scene() {
        let config = SketchConfig::default();
        let scene = config.scene_settings().unwrap();
        assert_eq!(scene.particle_count, 2580);
        assert_eq!(scene.particle_colors.len(), 8);
        assert_eq!(scene.background, Rgba::rgb(4, 87, 131));
        assert_eq!(scene.density, 10.0);
        assert!(scene.animate);
    }

    #[test]
    fn test_load_partial_file_and_sanitize() {
        let dir = TempDir::new().unwrap();
        let path = temp_config(
            &dir,
            "partial.conf",
            "fps = 1000.0\ndensity = 8.0\nbackground_color = \" #101010 \"\nparticle_colors = \"ffffff, zz, 00ff00,\"\n",
        );
        let config = SketchConfig::load_file(path.clone()).unwrap();
        assert_eq!(config.fps, 240.0);
        assert_eq!(config.density, 8.0);
        assert_eq!(config.background_color, "101010");
        assert_eq!(config.particle_colors, "FFFFFF,00FF00");
        assert_eq!(config.particle_count, 2580);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = temp_config(&dir, "broken.conf", "fps = \"fast\"\n");
        assert!(SketchConfig::load_file(path).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = SketchConfig::default();
        assert!(!config.merge_with_args(&Args::default()));

        let args = Args::parse_from([
            "wheelfield", "--fps", "30", "--seed", "7", "--paused", "--palettes", "Lagoon,ember",
            "-W", "640", "-H", "480", "--supersample", "20",
        ]);
        assert!(config.merge_with_args(&args));
        assert_eq!(config.fps, 30.0);
        assert_eq!(config.seed, Some(7));
        assert!(!config.start_animated);
        assert_eq!(config.palettes, "lagoon,ember");
        assert_eq!((config.export_width, config.export_height), (640, 480));
        assert_eq!(config.supersample, 8);
    }

    #[test]
    fn test_animate_flag_overrides_paused_config() {
        let dir = TempDir::new().unwrap();
        let path = temp_config(&dir, "still.conf", "start_animated = false\n");
        let mut config = SketchConfig::load_file(path).unwrap();
        assert!(!config.start_animated);

        let args = Args::parse_from(["wheelfield", "--animate"]);
        assert!(config.merge_with_args(&args));
        assert!(config.start_animated);

        assert!(Args::try_parse_from(["wheelfield", "--animate", "--paused"]).is_err());
    }

    #[test]
    fn test_config_path_resolution() {
        let abs = SketchConfig::config_path(Some("/tmp/x.conf")).unwrap();
        assert_eq!(abs, PathBuf::from("/tmp/x.conf"));
        let rel = SketchConfig::config_path(Some("confs/x.conf")).unwrap();
        assert_eq!(rel, PathBuf::from("confs/x.conf"));
        if std::env::var("HOME").is_ok() {
            let named = SketchConfig::config_path(Some("night")).unwrap();
            assert!(named.ends_with(".config/wheelfield/night.conf"));
        }
    }
}
