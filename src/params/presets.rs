//! Named scene presets.

use thiserror::Error;

use super::scene::{EffectFlags, MaterialParams, SceneConfig, WaveParams};
use crate::formation::FormationKind;
use crate::surface::Shape;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("unknown preset '{0}'")]
    Unknown(String),
}

/// Row of the preset table; shape and formation are looked up by name.
struct PresetRow {
    name: &'static str,
    shape: &'static str,
    formation: &'static str,
    element_count: usize,
    element_size: f32,
    formation_radius: f32,
    /// amplitude, frequency, speed
    wave: (f32, f32, f32),
    rotation_speed: f32,
    /// metalness, roughness
    material: (f32, f32),
}

#[allow(clippy::too_many_arguments)]
const fn row(
    name: &'static str,
    shape: &'static str,
    formation: &'static str,
    element_count: usize,
    element_size: f32,
    formation_radius: f32,
    wave: (f32, f32, f32),
    rotation_speed: f32,
    material: (f32, f32),
) -> PresetRow {
    PresetRow {
        name,
        shape,
        formation,
        element_count,
        element_size,
        formation_radius,
        wave,
        rotation_speed,
        material,
    }
}

#[rustfmt::skip]
static PRESETS: [PresetRow; 22] = [
    row("classic", "icosahedron", "circle", 20, 0.25, 5.0, (2.0, 0.8, 1.0), 1.0, (0.9, 0.1)),
    row("spiralDonuts", "torus", "spiral", 30, 0.15, 4.0, (3.0, 1.5, 2.0), 2.0, (0.8, 0.3)),
    row("cubicGrid", "cube", "grid", 25, 0.3, 6.0, (1.0, 0.5, 0.5), 0.5, (1.0, 0.0)),
    row("kleinBottles", "kleinBottle", "circle", 8, 0.8, 3.0, (1.0, 0.3, 0.8), 0.8, (0.95, 0.05)),
    row("mobiusHelix", "mobiusStrip", "helix", 12, 0.6, 4.0, (2.0, 1.0, 1.2), 1.5, (0.7, 0.2)),
    row("waveCarpets", "sineWaveCarpet", "grid", 16, 0.4, 5.0, (2.5, 2.0, 1.5), 1.0, (0.8, 0.15)),
    row("matlabPeaks", "peaks", "random", 15, 0.5, 6.0, (1.5, 0.6, 0.7), 0.6, (0.9, 0.1)),
    row("fractalSurface", "mandelbrotSurface", "spiral", 20, 0.3, 4.0, (1.8, 1.2, 1.0), 1.2, (0.85, 0.25)),
    row("floatingHearts", "heartSurface", "circle", 10, 0.4, 6.0, (1.2, 0.8, 0.6), 0.8, (0.7, 0.3)),
    row("seashellSpiral", "seashell", "spiral", 15, 0.35, 5.0, (2.0, 1.5, 1.3), 1.1, (0.8, 0.2)),
    row("roseGarden", "roseSurface", "grid", 12, 0.5, 4.0, (1.5, 1.8, 1.4), 1.3, (0.6, 0.4)),
    row("twistedHelix", "twistedTorus", "helix", 18, 0.3, 5.0, (2.2, 2.0, 1.8), 2.0, (0.95, 0.05)),
    row("lissajousChaos", "lissajousSurface", "random", 25, 0.25, 7.0, (3.0, 2.5, 2.2), 1.8, (0.9, 0.1)),
    row("goldenFibonacci", "icosahedron", "fibonacci", 34, 0.2, 6.0, (1.6, 1.618, 1.0), 1.0, (0.85, 0.15)),
    row("loveAlgorithm", "heartSurface", "heart", 20, 0.3, 5.0, (2.0, 0.5, 0.8), 0.7, (0.6, 0.4)),
    row("kleinInception", "kleinBottle", "klein", 15, 0.4, 4.0, (1.8, 1.2, 1.5), 1.2, (0.95, 0.05)),
    row("dnaStructure", "torus", "doubleHelix", 28, 0.25, 5.0, (2.5, 1.8, 1.6), 1.4, (0.8, 0.2)),
    row("mathematicalGarden", "roseSurface", "rose", 25, 0.3, 6.0, (2.2, 2.0, 1.3), 1.1, (0.7, 0.3)),
    row("fractalUniverse", "mandelbrotSurface", "mandelbrot", 30, 0.2, 4.0, (1.5, 2.5, 2.0), 1.8, (0.9, 0.1)),
    // "butterfly" has no generator and resolves to the icosahedron
    row("butterflyEffect", "butterfly", "butterfly", 22, 0.35, 5.0, (2.8, 1.4, 1.2), 0.9, (0.75, 0.25)),
    row("fourDProjection", "hyperboloid", "hypercube", 16, 0.4, 4.0, (1.0, 3.0, 2.5), 2.0, (1.0, 0.0)),
    row("knotTheory", "trefoilKnot", "trefoil", 18, 0.35, 3.0, (1.2, 1.6, 1.4), 1.3, (0.88, 0.12)),
];

impl PresetRow {
    fn to_config(&self) -> SceneConfig {
        SceneConfig {
            shape: Shape::from_name(self.shape),
            formation: FormationKind::from_name(self.formation),
            element_count: self.element_count,
            element_size: self.element_size,
            formation_radius: self.formation_radius,
            wave: WaveParams {
                amplitude: self.wave.0,
                frequency: self.wave.1,
                speed: self.wave.2,
            },
            rotation_speed: self.rotation_speed,
            material: MaterialParams {
                metalness: self.material.0,
                roughness: self.material.1,
            },
            effects: EffectFlags::default(),
        }
    }
}

/// Names of all presets, in display order
pub fn preset_names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}

/// Scene configuration for the named preset (case-insensitive).
pub fn preset(name: &str) -> Result<SceneConfig, PresetError> {
    PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(PresetRow::to_config)
        .ok_or_else(|| PresetError::Unknown(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Primitive, SurfaceKind};

    #[test]
    fn test_all_presets_already_in_range() {
        for name in preset_names() {
            let config = preset(name).unwrap();
            assert_eq!(config.clamped(), config, "{} needed clamping", name);
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_preset_count_and_unique_names() {
        let names: Vec<_> = preset_names().collect();
        assert_eq!(names.len(), 22);
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }

    #[test]
    fn test_butterfly_preset_falls_back_to_icosahedron() {
        let config = preset("butterflyEffect").unwrap();
        assert_eq!(config.shape, Shape::Primitive(Primitive::Icosahedron));
        assert_eq!(config.formation, FormationKind::Butterfly);
    }

    #[test]
    fn test_presets_resolve_known_names() {
        let config = preset("knotTheory").unwrap();
        assert_eq!(config.shape, Shape::Surface(SurfaceKind::TrefoilKnot));
        assert_eq!(config.formation, FormationKind::Trefoil);

        // Every preset except butterflyEffect names a real shape and formation
        for row in PRESETS.iter().filter(|p| p.name != "butterflyEffect") {
            assert!(Shape::parse(row.shape).is_some(), "{}", row.name);
            assert!(FormationKind::parse(row.formation).is_some(), "{}", row.name);
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert_eq!(
            preset("vaporwave"),
            Err(PresetError::Unknown("vaporwave".to_string()))
        );
    }
}
