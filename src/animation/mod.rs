//! Per-frame element animation.
//!
//! Turns a static [`FormationLayout`] into live transforms: a two-term
//! vertical wave, accumulated self-rotation, a slow group yaw and optional
//! audio-driven scale and tint.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Serialize;

use crate::audio::AudioSnapshot;
use crate::color::Hsl;
use crate::formation::FormationLayout;
use crate::params::WaveParams;

/// Yaw rate of the whole formation (rad/s)
pub const GROUP_YAW_RATE: f32 = 0.1;

/// Relative amplitude of the secondary wave term
const SECONDARY_WAVE_AMPLITUDE: f32 = 0.2;
/// Frequency multiplier of the secondary wave term
const SECONDARY_WAVE_RATE: f32 = 1.5;
/// How strongly base X desynchronizes the secondary wave (rad per unit)
const SECONDARY_WAVE_SPATIAL: f32 = 0.1;

/// Scale gain per unit of audio volume
const AUDIO_SCALE_GAIN: f32 = 0.5;
const AUDIO_SATURATION: f32 = 0.8;
const AUDIO_LIGHTNESS: f32 = 0.6;

/// Live state of one element for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiveTransform {
    pub id: usize,
    pub position: Vec3,
    /// Accumulated Euler angles (radians, XYZ order)
    pub rotation: Vec3,
    pub scale: f32,
    pub color: Hsl,
    /// `color` in sRGB, each channel in `[0, 1]`
    pub rgb: [f32; 3],
}

impl LiveTransform {
    /// World matrix including the formation yaw.
    pub fn model_matrix(&self, group_yaw: f32) -> Mat4 {
        let group = Mat4::from_rotation_y(group_yaw);
        let local = Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
            self.position,
        );
        group * local
    }
}

/// Everything a renderer needs for one frame of elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationFrame {
    /// Formation yaw around +Y (radians)
    pub group_yaw: f32,
    pub transforms: Vec<LiveTransform>,
}

/// Vertical displacement of an element at time `t`.
///
/// # Arguments
/// * `t` - Elapsed time (seconds)
/// * `wave` - Wave amplitude, frequency and speed
/// * `phase_offset` - Per-element phase (radians)
/// * `base_x` - Element base X, feeds the secondary term
pub fn wave_offset(t: f32, wave: &WaveParams, phase_offset: f32, base_x: f32) -> f32 {
    let rate = t * wave.speed * wave.frequency;
    let primary = (rate + phase_offset).sin() * wave.amplitude;
    let secondary = (rate * SECONDARY_WAVE_RATE + base_x * SECONDARY_WAVE_SPATIAL).sin()
        * wave.amplitude
        * SECONDARY_WAVE_AMPLITUDE;
    primary + secondary
}

/// Stateful animator holding per-element rotation accumulators.
///
/// Accumulators are indexed by element id, so a rebuilt layout keeps each
/// element's current orientation.
#[derive(Debug, Default)]
pub struct Animator {
    rotations: Vec<Vec3>,
    generation: Option<u64>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance rotations by `dt` and compute transforms at time `elapsed`.
    ///
    /// Rotation accumulators survive layout rebuilds; when the element count
    /// changes, new elements start from zero and removed ones are dropped.
    /// Negative or non-finite `dt` counts as zero.
    pub fn animate(
        &mut self,
        layout: &FormationLayout,
        elapsed: f32,
        dt: f32,
        wave: &WaveParams,
        audio: Option<&AudioSnapshot>,
    ) -> AnimationFrame {
        if self.generation != Some(layout.generation) {
            log::debug!(
                "Layout generation {} with {} elements, keeping rotations",
                layout.generation,
                layout.len()
            );
            self.generation = Some(layout.generation);
        }
        self.rotations.resize(layout.len(), Vec3::ZERO);

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let audio_scale = audio.map_or(1.0, |a| 1.0 + a.volume * AUDIO_SCALE_GAIN);
        let audio_color = audio.map(|a| {
            Hsl::new((a.bass + a.treble) * 0.5, AUDIO_SATURATION, AUDIO_LIGHTNESS)
        });

        let transforms = layout
            .elements
            .iter()
            .zip(self.rotations.iter_mut())
            .map(|(element, rotation)| {
                *rotation += element.rotation_speed * dt;

                let base = element.base_position;
                let lift = wave_offset(elapsed, wave, element.phase_offset, base.x);

                let color = audio_color.unwrap_or(element.base_color);

                LiveTransform {
                    id: element.id,
                    position: Vec3::new(base.x, base.y + lift, base.z),
                    rotation: *rotation,
                    scale: element.base_scale * audio_scale,
                    color,
                    rgb: color.to_rgb(),
                }
            })
            .collect();

        log::trace!("Animated {} elements at t={:.3}s", layout.len(), elapsed);

        AnimationFrame {
            group_yaw: elapsed * GROUP_YAW_RATE,
            transforms,
        }
    }
}
