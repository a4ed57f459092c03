//! HSL colors for element tinting.

use palette::{FromColor, Srgb};
use serde::{Deserialize, Serialize};

/// Color in hue/saturation/lightness, every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsl {
    /// Hue as a fraction of a full turn
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Convert to RGB in `[0, 1]`.
    ///
    /// Hue wraps, saturation and lightness are clamped.
    pub fn to_rgb(self) -> [f32; 3] {
        let hsl: palette::Hsl = palette::Hsl::new(
            self.h.rem_euclid(1.0) * 360.0,
            self.s.clamp(0.0, 1.0),
            self.l.clamp(0.0, 1.0),
        );
        let rgb: Srgb = Srgb::from_color(hsl);
        [rgb.red, rgb.green, rgb.blue]
    }
}
