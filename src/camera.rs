//! Camera rig: auto-rotate orbit or fixed manual placement.

use glam::{Mat4, Vec3};
use serde::Serialize;

use crate::params::{CameraSettings, OrbitPath};

/// Camera state for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraState {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
}

/// Camera rig always looking at the origin
pub struct CameraRig {
    settings: CameraSettings,
}

impl CameraRig {
    /// Create new camera rig; settings are clamped into range
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            settings: settings.clamped(),
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: CameraSettings) {
        self.settings = settings.clamped();
    }

    pub fn set_auto_rotate(&mut self, auto_rotate: bool) {
        self.settings.auto_rotate = auto_rotate;
    }

    /// Compute camera position and look-at target for given time
    ///
    /// # Arguments
    /// * `time_s` - Elapsed time in seconds
    ///
    /// # Returns
    /// Tuple of (eye_position, target_position)
    pub fn compute_position_and_target(&self, time_s: f32) -> (Vec3, Vec3) {
        let eye = if self.settings.auto_rotate {
            Self::compute_orbit_position(&self.settings.orbit, time_s)
        } else {
            self.settings.position
        };

        (eye, Vec3::ZERO)
    }

    /// Eye position on the orbit at `time_s`
    fn compute_orbit_position(p: &OrbitPath, time_s: f32) -> Vec3 {
        let phase = time_s * p.angular_rate;
        let y = (phase * p.height_rate).sin() * p.height_amplitude + p.height_base;
        Vec3::new(phase.cos() * p.radius, y, phase.sin() * p.radius)
    }

    pub fn state(&self, time_s: f32) -> CameraState {
        let (eye, target) = self.compute_position_and_target(time_s);
        CameraState {
            eye,
            target,
            fov_degrees: self.settings.fov_degrees,
        }
    }

    /// Create view-projection matrix for rendering
    ///
    /// # Returns
    /// Tuple of (view_proj_matrix, camera_position)
    pub fn create_view_proj_matrix(&self, time_s: f32) -> (Mat4, Vec3) {
        let (eye, target) = self.compute_position_and_target(time_s);

        // Y stays up (camera never rolls) unless looking straight along it
        let up = if (target - eye).cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(eye, target, up);
        let proj = Mat4::perspective_rh(
            self.settings.fov_degrees.to_radians(),
            self.settings.aspect_ratio,
            self.settings.near_plane,
            self.settings.far_plane,
        );

        (proj * view, eye)
    }
}
