//! Command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use blobvectors::audio::AudioMode;
use blobvectors::formation::FormationKind;
use blobvectors::frame_loop::LoopConfig;
use blobvectors::mesh::MAX_SURFACE_RESOLUTION;
use blobvectors::params::{preset, reduce, CameraSettings, SceneAction, SceneConfig};
use blobvectors::scene::SceneOptions;
use blobvectors::surface::Shape;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "blobvectors")]
#[command(about = "Procedural audio-reactive blob formations", long_about = None)]
pub struct Args {
    /// Start from a named preset (see --list)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Start from a JSON scene configuration file
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Element shape (basic solid or parametric surface name)
    #[arg(long, value_name = "NAME")]
    pub shape: Option<String>,

    /// Formation pattern name
    #[arg(long, value_name = "NAME")]
    pub formation: Option<String>,

    /// Number of elements (3-50)
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,

    /// Formation radius (1-10)
    #[arg(long, value_name = "UNITS")]
    pub radius: Option<f32>,

    /// Element size (0.1-1.0)
    #[arg(long, value_name = "SCALE")]
    pub size: Option<f32>,

    /// Audio input: microphone, synthetic (default), off
    #[arg(long, value_name = "MODE", default_value = "synthetic")]
    pub audio: String,

    /// Analyze a WAV file instead of live input (overrides --audio)
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Frame rate (frames per second)
    #[arg(long, value_name = "FPS", default_value = "60")]
    pub fps: f32,

    /// Stop after this many seconds (runs until interrupted if omitted)
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Grid resolution for parametric surfaces (1-1024)
    #[arg(
        long,
        value_name = "N",
        default_value = "24",
        value_parser = clap::value_parser!(u32).range(1..=MAX_SURFACE_RESOLUTION as i64)
    )]
    pub resolution: u32,

    /// Orbit the camera around the formation
    #[arg(long)]
    pub auto_rotate: bool,

    /// Seed for randomized element fields
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Write the element mesh as Wavefront OBJ
    #[arg(long, value_name = "PATH")]
    pub export_mesh: Option<PathBuf>,

    /// Print one JSON line per frame to stdout
    #[arg(long)]
    pub json: bool,

    /// Run frames back to back with a fixed time step instead of pacing
    #[arg(long)]
    pub offline: bool,

    /// List presets, shapes and formations, then exit
    #[arg(long)]
    pub list: bool,
}

impl Args {
    /// Parse audio mode from command-line arguments
    pub fn parse_audio_mode(&self) -> AudioMode {
        if let Some(path) = &self.wav {
            return AudioMode::Wav(path.clone());
        }

        match self.audio.to_lowercase().as_str() {
            "microphone" | "mic" => AudioMode::Microphone,
            "synthetic" => AudioMode::Synthetic,
            "off" | "none" => AudioMode::Off,
            other => {
                log::warn!("Unknown audio mode '{}', using synthetic", other);
                AudioMode::Synthetic
            }
        }
    }

    /// Base configuration (file, preset or default) with flag overrides applied
    pub fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        } else if let Some(name) = &self.preset {
            preset(name)?
        } else {
            SceneConfig::default()
        };

        for action in self.overrides() {
            config = reduce(&config, action);
        }

        Ok(config)
    }

    fn overrides(&self) -> Vec<SceneAction> {
        let mut actions = Vec::new();
        if let Some(shape) = &self.shape {
            actions.push(SceneAction::SetShape(Shape::from_name(shape)));
        }
        if let Some(formation) = &self.formation {
            actions.push(SceneAction::SetFormation(FormationKind::from_name(formation)));
        }
        if let Some(count) = self.count {
            actions.push(SceneAction::SetElementCount(count));
        }
        if let Some(radius) = self.radius {
            actions.push(SceneAction::SetFormationRadius(radius));
        }
        if let Some(size) = self.size {
            actions.push(SceneAction::SetElementSize(size));
        }
        actions
    }

    pub fn scene_options(&self) -> SceneOptions {
        SceneOptions {
            resolution: self.resolution,
            seed: self.seed,
            camera: CameraSettings {
                auto_rotate: self.auto_rotate,
                ..CameraSettings::default()
            },
        }
    }

    pub fn loop_config(&self) -> LoopConfig {
        let duration = self.duration.and_then(|secs| {
            Duration::try_from_secs_f32(secs).ok().or_else(|| {
                log::warn!("Ignoring invalid duration {}", secs);
                None
            })
        });

        LoopConfig {
            fps: self.fps,
            duration,
            realtime: !self.offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobvectors::surface::Primitive;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("blobvectors").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.parse_audio_mode(), AudioMode::Synthetic);
        assert_eq!(args.scene_config().unwrap(), SceneConfig::default());
        let loop_config = args.loop_config();
        assert_eq!(loop_config.fps, 60.0);
        assert!(loop_config.duration.is_none());
        assert!(loop_config.realtime);
    }

    #[test]
    fn test_preset_with_overrides() {
        let args = parse(&["--preset", "cubicGrid", "--count", "99", "--shape", "cone"]);
        let config = args.scene_config().unwrap();
        assert_eq!(config.formation, FormationKind::Grid);
        assert_eq!(config.element_count, 50);
        assert_eq!(config.shape, Shape::Primitive(Primitive::Cone));
    }

    #[test]
    fn test_unknown_preset_is_an_error() {
        assert!(parse(&["--preset", "nope"]).scene_config().is_err());
    }

    #[test]
    fn test_wav_overrides_audio_mode() {
        let args = parse(&["--audio", "off", "--wav", "loop.wav"]);
        assert_eq!(args.parse_audio_mode(), AudioMode::Wav(PathBuf::from("loop.wav")));
        assert_eq!(parse(&["--audio", "mic"]).parse_audio_mode(), AudioMode::Microphone);
    }

    #[test]
    fn test_config_file() {
        let path = std::env::temp_dir().join("blobvectors_cli_config_test.json");
        std::fs::write(&path, r#"{ "formation": "helix", "formationRadius": 3.5 }"#).unwrap();

        let args = parse(&["--config", path.to_str().unwrap(), "--size", "0.05"]);
        let config = args.scene_config().unwrap();
        assert_eq!(config.formation, FormationKind::Helix);
        assert_eq!(config.formation_radius, 3.5);
        assert_eq!(config.element_size, 0.1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_resolution_bounds() {
        assert_eq!(parse(&["--resolution", "1024"]).resolution, 1024);
        let too_big = ["blobvectors", "--resolution", "70000"];
        assert!(Args::try_parse_from(too_big).is_err());
        assert!(Args::try_parse_from(["blobvectors", "--resolution", "0"]).is_err());
    }

    #[test]
    fn test_negative_duration_ignored() {
        let args = parse(&["--duration=-2", "--offline"]);
        let loop_config = args.loop_config();
        assert!(loop_config.duration.is_none());
        assert!(!loop_config.realtime);
    }
}
