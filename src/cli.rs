// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::scene::{SceneFile, ScenePool};
use crate::settings::{AccumulationMode, SettingsState, ViewMode};

#[derive(Parser, Debug, Clone)]
#[command(name = "path-tracer")]
#[command(about = "Interactive WebGPU path tracer with raster preview", long_about = None)]
pub struct Cli {
    /// Disable the inspector overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// JSON scene file; the built-in scene is used when absent
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Samples per pixel
    #[arg(long)]
    pub samples: Option<u32>,

    /// Bounce limit
    #[arg(long)]
    pub bounces: Option<u32>,

    /// Temporal accumulation mode
    #[arg(long, value_enum)]
    pub accumulation: Option<AccumulationMode>,

    /// Start with the raster preview as the primary view
    #[arg(long, default_value = "false")]
    pub raster: bool,
}

impl Cli {
    /// Scene pool and settings from `--scene` (or the defaults), with overrides applied
    pub fn load_scene(&self) -> anyhow::Result<(ScenePool, SettingsState)> {
        let (scene, settings) = match &self.scene {
            Some(path) => {
                let file = SceneFile::load(path)
                    .with_context(|| format!("failed to load scene {}", path.display()))?;
                let (scene, settings) = file
                    .into_parts()
                    .with_context(|| format!("invalid scene {}", path.display()))?;
                log::info!("loaded scene {} ({} spheres)", path.display(), scene.len());
                (scene, settings.unwrap_or_default())
            }
            None => (ScenePool::default(), SettingsState::default()),
        };
        Ok((scene, self.apply_overrides(settings)))
    }

    pub fn apply_overrides(&self, mut settings: SettingsState) -> SettingsState {
        if let Some(samples) = self.samples {
            settings.set_samples(samples);
        }
        if let Some(bounces) = self.bounces {
            settings.set_bounces(bounces);
        }
        if let Some(mode) = self.accumulation {
            settings.accumulation = mode;
        }
        if self.raster {
            settings.view = ViewMode::Raster;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["path-tracer"]);
        assert!(!cli.no_ui);
        assert_eq!((cli.width, cli.height), (1280, 720));
        assert_eq!(cli.apply_overrides(SettingsState::default()), SettingsState::default());
    }

    #[test]
    fn overrides_are_clamped() {
        let cli = Cli::parse_from([
            "path-tracer",
            "--samples",
            "5000",
            "--bounces",
            "2",
            "--accumulation",
            "weighted",
            "--raster",
        ]);
        let settings = cli.apply_overrides(SettingsState::default());
        assert_eq!(settings.samples, 1000);
        assert_eq!(settings.bounces, 2);
        assert_eq!(settings.accumulation, AccumulationMode::Weighted);
        assert_eq!(settings.view, ViewMode::Raster);
    }

    #[test]
    fn missing_scene_file_is_an_error() {
        let cli = Cli::parse_from(["path-tracer", "--scene", "/nonexistent/scene.json"]);
        assert!(cli.load_scene().is_err());
    }
}
