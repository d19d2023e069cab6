use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Accent palette for the visualiser and chrome.
///
/// `NeonPink` is the signature look; the rest map bar position onto a hue
/// ramp so low and high frequencies read differently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub enum ColorScheme {
    #[default]
    NeonPink,
    Spectrum,
    Fire,
    Ocean,
    Monochrome,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pink" | "neon" | "neonpink" => Ok(Self::NeonPink),
            "spectrum" => Ok(Self::Spectrum),
            "fire" => Ok(Self::Fire),
            "ocean" => Ok(Self::Ocean),
            "mono" | "monochrome" => Ok(Self::Monochrome),
            _ => Err(format!("Unknown color scheme: {}", s)),
        }
    }
}

impl ColorScheme {
    /// Color for a bar at `position` (0..1 across the field) with the given
    /// `intensity` (0..1, usually the bar's level).
    pub fn get_color(&self, position: f32, intensity: f32) -> (u8, u8, u8) {
        let (h, s, l) = match self {
            ColorScheme::NeonPink => {
                // Fixed magenta-pink accent; intensity only lifts lightness.
                (330.0, 0.86, 0.42 + intensity * 0.25)
            }
            ColorScheme::Spectrum => {
                let hue = 270.0 - position * 270.0;
                (hue, 0.9, 0.4 + intensity * 0.3)
            }
            ColorScheme::Fire => {
                let hue = position * 55.0;
                (hue, 0.95, 0.32 + intensity * 0.38)
            }
            ColorScheme::Ocean => {
                let hue = 185.0 + position * 55.0;
                (hue, 0.8, 0.3 + intensity * 0.35)
            }
            ColorScheme::Monochrome => (0.0, 0.0, 0.25 + intensity * 0.6),
        };

        let rgb: Srgb = Hsl::new(h, s, l).into_color();
        (
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        )
    }

    pub fn all() -> &'static [ColorScheme] {
        &[
            ColorScheme::NeonPink,
            ColorScheme::Spectrum,
            ColorScheme::Fire,
            ColorScheme::Ocean,
            ColorScheme::Monochrome,
        ]
    }

    /// Cycle to the next scheme (shell keybinding).
    pub fn next(&self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|c| c == self).unwrap_or(0);
        all[(current + 1) % all.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorScheme::NeonPink => "neon-pink",
            ColorScheme::Spectrum => "spectrum",
            ColorScheme::Fire => "fire",
            ColorScheme::Ocean => "ocean",
            ColorScheme::Monochrome => "monochrome",
        }
    }
}
