//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (scene units, seconds, Hz, degrees)
//! - Documented ranges and meanings
//! - Type safety where possible

mod audio;
mod camera;
pub mod presets;
mod scene;

// Re-export all types
pub use audio::AnalyzerConfig;
pub use camera::{CameraSettings, OrbitPath, CAMERA_POSITION_LIMIT, FOV_RANGE_DEGREES};
pub use presets::{preset, preset_names, PresetError};
pub use scene::{
    reduce, ConfigError, EffectFlags, EffectKind, MaterialParams, SceneAction, SceneConfig,
    WaveParams, AMPLITUDE_RANGE, ELEMENT_COUNT_RANGE, ELEMENT_SIZE_RANGE, FORMATION_RADIUS_RANGE,
    FREQUENCY_RANGE, MATERIAL_RANGE, ROTATION_SPEED_RANGE, SPEED_RANGE,
};
