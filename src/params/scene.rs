//! Scene configuration, validation and the action reducer.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::presets;
use crate::formation::{FormationKind, LayoutKey};
use crate::surface::Shape;

/// Allowed element count
pub const ELEMENT_COUNT_RANGE: RangeInclusive<usize> = 3..=50;
/// Allowed element size (scale factor)
pub const ELEMENT_SIZE_RANGE: RangeInclusive<f32> = 0.1..=1.0;
/// Allowed formation radius (scene units)
pub const FORMATION_RADIUS_RANGE: RangeInclusive<f32> = 1.0..=10.0;
/// Allowed wave amplitude (scene units)
pub const AMPLITUDE_RANGE: RangeInclusive<f32> = 0.0..=5.0;
/// Allowed wave frequency multiplier
pub const FREQUENCY_RANGE: RangeInclusive<f32> = 0.1..=3.0;
/// Allowed wave speed multiplier
pub const SPEED_RANGE: RangeInclusive<f32> = 0.1..=3.0;
/// Allowed base rotation speed (rad/s)
pub const ROTATION_SPEED_RANGE: RangeInclusive<f32> = 0.0..=3.0;
/// Allowed metalness and roughness
pub const MATERIAL_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Vertical wave applied to every element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Peak displacement of the primary term (scene units, 0-5)
    pub amplitude: f32,

    /// Frequency multiplier (0.1-3)
    pub frequency: f32,

    /// Speed multiplier (0.1-3)
    pub speed: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude: 2.0,
            frequency: 0.8,
            speed: 1.0,
        }
    }
}

/// Surface material, passed through to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            metalness: 0.5,
            roughness: 0.3,
        }
    }
}

/// Post-processing toggles. Carried for the renderer, not interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectFlags {
    pub bloom: bool,
    pub trails: bool,
    pub chromatic: bool,
    pub crt: bool,
    pub plasma: bool,
}

/// One entry of [`EffectFlags`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Bloom,
    Trails,
    Chromatic,
    Crt,
    Plasma,
}

impl EffectFlags {
    pub fn toggle(&mut self, effect: EffectKind) {
        let flag = match effect {
            EffectKind::Bloom => &mut self.bloom,
            EffectKind::Trails => &mut self.trails,
            EffectKind::Chromatic => &mut self.chromatic,
            EffectKind::Crt => &mut self.crt,
            EffectKind::Plasma => &mut self.plasma,
        };
        *flag = !*flag;
    }
}

/// Complete scene description, replaced wholesale on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    pub shape: Shape,
    pub formation: FormationKind,

    /// Number of elements (3-50)
    pub element_count: usize,

    /// Element scale (0.1-1.0)
    pub element_size: f32,

    /// Formation radius (scene units, 1-10)
    pub formation_radius: f32,

    pub wave: WaveParams,

    /// Upper bound of per-element rotation speed (rad/s, 0-3)
    pub rotation_speed: f32,

    pub material: MaterialParams,
    pub effects: EffectFlags,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            shape: Shape::SPHERE,
            formation: FormationKind::Circle,
            element_count: 37,
            element_size: 0.5,
            formation_radius: 5.0,
            wave: WaveParams::default(),
            rotation_speed: 2.0,
            material: MaterialParams::default(),
            effects: EffectFlags::default(),
        }
    }
}

/// Errors from configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
}

impl SceneConfig {
    /// Reject values that cannot be clamped into range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("elementSize", self.element_size),
            ("formationRadius", self.formation_radius),
            ("wave.amplitude", self.wave.amplitude),
            ("wave.frequency", self.wave.frequency),
            ("wave.speed", self.wave.speed),
            ("rotationSpeed", self.rotation_speed),
            ("material.metalness", self.material.metalness),
            ("material.roughness", self.material.roughness),
        ];

        match fields.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((field, value)) => Err(ConfigError::NonFinite { field, value }),
            None => Ok(()),
        }
    }

    /// Copy with every numeric field clamped into its documented range.
    pub fn clamped(&self) -> Self {
        self.clamp_fields(false)
    }

    /// Validate, then clamp, logging a warning for each clamped field.
    pub fn sanitize(&self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self.clamp_fields(true))
    }

    /// Key of the layout this configuration produces
    pub fn layout_key(&self) -> LayoutKey {
        LayoutKey {
            formation: self.formation,
            element_count: self.element_count,
            formation_radius: self.formation_radius,
            element_size: self.element_size,
            rotation_speed: self.rotation_speed,
        }
    }

    fn clamp_fields(&self, warn: bool) -> Self {
        let clamp = |field: &str, value: f32, range: &RangeInclusive<f32>| {
            let clamped = value.clamp(*range.start(), *range.end());
            if warn && clamped != value {
                log::warn!("{} {} out of range, clamped to {}", field, value, clamped);
            }
            clamped
        };

        let element_count = self
            .element_count
            .clamp(*ELEMENT_COUNT_RANGE.start(), *ELEMENT_COUNT_RANGE.end());
        if warn && element_count != self.element_count {
            log::warn!(
                "elementCount {} out of range, clamped to {}",
                self.element_count,
                element_count
            );
        }

        Self {
            shape: self.shape,
            formation: self.formation,
            element_count,
            element_size: clamp("elementSize", self.element_size, &ELEMENT_SIZE_RANGE),
            formation_radius: clamp(
                "formationRadius",
                self.formation_radius,
                &FORMATION_RADIUS_RANGE,
            ),
            wave: WaveParams {
                amplitude: clamp("wave.amplitude", self.wave.amplitude, &AMPLITUDE_RANGE),
                frequency: clamp("wave.frequency", self.wave.frequency, &FREQUENCY_RANGE),
                speed: clamp("wave.speed", self.wave.speed, &SPEED_RANGE),
            },
            rotation_speed: clamp("rotationSpeed", self.rotation_speed, &ROTATION_SPEED_RANGE),
            material: MaterialParams {
                metalness: clamp("material.metalness", self.material.metalness, &MATERIAL_RANGE),
                roughness: clamp("material.roughness", self.material.roughness, &MATERIAL_RANGE),
            },
            effects: self.effects,
        }
    }
}

/// Single mutation entry point for [`SceneConfig`]
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAction {
    SetShape(Shape),
    SetFormation(FormationKind),
    SetElementCount(usize),
    SetElementSize(f32),
    SetFormationRadius(f32),
    SetWave(WaveParams),
    SetRotationSpeed(f32),
    SetMaterial(MaterialParams),
    ToggleEffect(EffectKind),
    ApplyPreset(String),
    Replace(SceneConfig),
}

/// Apply `action` to `config`, returning the sanitized result.
///
/// An action that cannot be applied (non-finite value, unknown preset)
/// leaves the configuration unchanged.
pub fn reduce(config: &SceneConfig, action: SceneAction) -> SceneConfig {
    let mut next = config.clone();

    match action {
        SceneAction::SetShape(shape) => next.shape = shape,
        SceneAction::SetFormation(formation) => next.formation = formation,
        SceneAction::SetElementCount(count) => next.element_count = count,
        SceneAction::SetElementSize(size) => next.element_size = size,
        SceneAction::SetFormationRadius(radius) => next.formation_radius = radius,
        SceneAction::SetWave(wave) => next.wave = wave,
        SceneAction::SetRotationSpeed(speed) => next.rotation_speed = speed,
        SceneAction::SetMaterial(material) => next.material = material,
        SceneAction::ToggleEffect(effect) => next.effects.toggle(effect),
        SceneAction::ApplyPreset(name) => match presets::preset(&name) {
            Ok(preset) => next = preset,
            Err(e) => {
                log::warn!("{}", e);
                return config.clone();
            }
        },
        SceneAction::Replace(replacement) => next = replacement,
    }

    match next.sanitize() {
        Ok(sanitized) => sanitized,
        Err(e) => {
            log::warn!("Rejected scene update: {}", e);
            config.clone()
        }
    }
}
