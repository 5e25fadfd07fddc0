use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLES: u32 = 50;
pub const DEFAULT_BOUNCES: u32 = 3;
pub const SAMPLES_RANGE: (u32, u32) = (1, 1000);
pub const BOUNCES_RANGE: (u32, u32) = (0, 16);

/// Which surface fills the screen; the other one is drawn as the inset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    PathTrace,
    Raster,
}

impl ViewMode {
    pub fn flipped(self) -> Self {
        match self {
            ViewMode::PathTrace => ViewMode::Raster,
            ViewMode::Raster => ViewMode::PathTrace,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::PathTrace => "Path Trace",
            ViewMode::Raster => "Raster",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationMode {
    #[default]
    Off,
    Constant,
    Weighted,
}

impl AccumulationMode {
    pub const ALL: [AccumulationMode; 3] = [
        AccumulationMode::Off,
        AccumulationMode::Constant,
        AccumulationMode::Weighted,
    ];

    /// Off -> Constant -> Weighted -> Off
    pub fn next(self) -> Self {
        match self {
            AccumulationMode::Off => AccumulationMode::Constant,
            AccumulationMode::Constant => AccumulationMode::Weighted,
            AccumulationMode::Weighted => AccumulationMode::Off,
        }
    }

    pub fn is_active(self) -> bool {
        self != AccumulationMode::Off
    }

    pub fn label(self) -> &'static str {
        match self {
            AccumulationMode::Off => "Off",
            AccumulationMode::Constant => "Constant",
            AccumulationMode::Weighted => "Weighted",
        }
    }
}

/// Render settings. Written by the inspector and key bindings, read by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsState {
    pub view: ViewMode,
    pub accumulation: AccumulationMode,
    pub samples: u32,
    pub bounces: u32,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            view: ViewMode::PathTrace,
            accumulation: AccumulationMode::Off,
            samples: DEFAULT_SAMPLES,
            bounces: DEFAULT_BOUNCES,
        }
    }
}

impl SettingsState {
    pub fn set_samples(&mut self, samples: u32) {
        self.samples = samples.clamp(SAMPLES_RANGE.0, SAMPLES_RANGE.1);
    }

    pub fn set_bounces(&mut self, bounces: u32) {
        self.bounces = bounces.clamp(BOUNCES_RANGE.0, BOUNCES_RANGE.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_startup_state() {
        let settings = SettingsState::default();
        assert_eq!(settings.view, ViewMode::PathTrace);
        assert_eq!(settings.accumulation, AccumulationMode::Off);
        assert_eq!(settings.samples, 50);
        assert_eq!(settings.bounces, 3);
    }

    #[test]
    fn accumulation_cycles_through_all_modes() {
        let mut mode = AccumulationMode::Off;
        let mut seen = Vec::new();
        for _ in 0..3 {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![AccumulationMode::Constant, AccumulationMode::Weighted, AccumulationMode::Off]
        );
    }

    #[test]
    fn view_flips_back_and_forth() {
        assert_eq!(ViewMode::PathTrace.flipped(), ViewMode::Raster);
        assert_eq!(ViewMode::PathTrace.flipped().flipped(), ViewMode::PathTrace);
    }

    #[test]
    fn setters_clamp_to_range() {
        let mut settings = SettingsState::default();
        settings.set_samples(0);
        assert_eq!(settings.samples, 1);
        settings.set_samples(5000);
        assert_eq!(settings.samples, 1000);
        settings.set_bounces(99);
        assert_eq!(settings.bounces, 16);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: SettingsState =
            serde_json::from_str(r#"{ "accumulation": "weighted" }"#).unwrap();
        assert_eq!(settings.accumulation, AccumulationMode::Weighted);
        assert_eq!(settings.samples, DEFAULT_SAMPLES);
    }
}
