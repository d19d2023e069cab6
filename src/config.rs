use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::ColorScheme;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub visualizer: VisualizerConfig,
    pub audio: AudioConfig,
    pub shell: ShellConfig,
}

/// Engine and paint tunables. The two bar counts exist because mirrored
/// layouts read better with fewer, wider bars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Bar count for the normal bottom-up layout
    pub bars: usize,
    /// Bar count when mirroring around the horizontal centre
    pub mirror_bars: usize,
    pub mirror: bool,
    /// Smoothing rate for rising levels (0.0-1.0)
    pub attack: f32,
    /// Smoothing rate for falling levels (0.0-1.0)
    pub release: f32,
    /// Peak-cap fall rate; 0.35 means ~0.0035 of full scale per millisecond
    pub peak_fall: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    /// Gap between bars, CSS units
    pub gap: f32,
    /// Background fade per frame (0.22-0.28 keeps a visible trail)
    pub fade_alpha: f32,
    /// Supersampling density for the pixel surface, clamped to [1, 2]
    pub pixel_density: f32,
    pub color_scheme: ColorScheme,
    /// Seed for the synthetic bar profile
    pub seed: u32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            bars: 64,
            mirror_bars: 48,
            mirror: false,
            attack: 0.55,
            release: 0.14,
            peak_fall: 0.35,
            padding_x: 18.0,
            padding_y: 18.0,
            gap: 3.0,
            fade_alpha: 0.25,
            pixel_density: 1.0,
            color_scheme: ColorScheme::NeonPink,
            seed: 1,
        }
    }
}

impl VisualizerConfig {
    /// Effective bar count for the current layout mode.
    pub fn bar_count(&self) -> usize {
        if self.mirror {
            self.mirror_bars
        } else {
            self.bars
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sink whose monitor is captured (None = default sink)
    pub device: Option<String>,
    pub sample_rate: u32,
    /// Analysis window in samples; 2048 matches the bin-mapping constants
    pub window: usize,
    /// Time smoothing applied to linear magnitudes before the byte mapping
    pub smoothing: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: 44100,
            window: 2048,
            smoothing: 0.75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub fps: u32,
    /// Overlay the time-domain trace on top of the bars
    pub show_waveform: bool,
    /// Begin live capture at startup instead of waiting for the keybinding
    pub start_live: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            show_waveform: true,
            start_live: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Default XDG config path (~/.config/neonamp/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("neonamp").join("config.toml"))
    }

    /// Load from the default XDG path if it exists; parse failures fall back
    /// to defaults with a warning rather than refusing to start.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!(
                    "Warning: Failed to parse config at {}: {}\nUsing defaults.",
                    path.display(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_engine_constants() {
        let config = Config::default();
        assert_eq!(config.visualizer.bars, 64);
        assert_eq!(config.visualizer.mirror_bars, 48);
        assert!((config.visualizer.attack - 0.55).abs() < f32::EPSILON);
        assert!((config.visualizer.release - 0.14).abs() < f32::EPSILON);
        assert!((config.visualizer.peak_fall - 0.35).abs() < f32::EPSILON);
        assert_eq!(config.audio.window, 2048);
        assert!((config.audio.smoothing - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn mirror_selects_the_smaller_bar_count() {
        let mut config = VisualizerConfig::default();
        assert_eq!(config.bar_count(), 64);
        config.mirror = true;
        assert_eq!(config.bar_count(), 48);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [visualizer]
            mirror = true
            color_scheme = "Spectrum"

            [shell]
            fps = 30
            "#,
        )
        .unwrap();
        assert!(config.visualizer.mirror);
        assert_eq!(config.visualizer.color_scheme, ColorScheme::Spectrum);
        assert_eq!(config.visualizer.bars, 64);
        assert_eq!(config.shell.fps, 30);
        assert_eq!(config.audio.sample_rate, 44100);
    }
}
