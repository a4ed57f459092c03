//! Camera placement and projection parameters.

use glam::Vec3;

/// Allowed manual camera coordinate on each axis (scene units)
pub const CAMERA_POSITION_LIMIT: f32 = 20.0;
/// Allowed field of view (degrees)
pub const FOV_RANGE_DEGREES: (f32, f32) = (20.0, 120.0);

/// Auto-rotate orbit around the origin
#[derive(Debug, Clone)]
pub struct OrbitPath {
    /// Horizontal distance from the origin (scene units)
    pub radius: f32,

    /// Orbit phase rate (rad/s)
    pub angular_rate: f32,

    /// Mean eye height (scene units)
    pub height_base: f32,

    /// Eye height swing (scene units)
    pub height_amplitude: f32,

    /// Height oscillation rate relative to the orbit phase
    pub height_rate: f32,
}

impl Default for OrbitPath {
    fn default() -> Self {
        Self {
            radius: 8.0,
            angular_rate: 0.3,
            height_base: 2.0,
            height_amplitude: 2.0,
            height_rate: 0.5, // Bobs once per two laps
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Follow the orbit instead of the manual position
    pub auto_rotate: bool,

    /// Manual eye position (scene units, each axis within ±20)
    pub position: Vec3,

    /// Vertical field of view (degrees, 20-120)
    pub fov_degrees: f32,

    /// Viewport width / height
    pub aspect_ratio: f32,

    /// Near clipping plane (scene units)
    pub near_plane: f32,

    /// Far clipping plane (scene units)
    pub far_plane: f32,

    pub orbit: OrbitPath,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            auto_rotate: false,
            position: Vec3::new(0.0, 0.0, 10.0),
            fov_degrees: 60.0,
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            orbit: OrbitPath::default(),
        }
    }
}

impl CameraSettings {
    /// Copy with position and field of view clamped into range.
    pub fn clamped(&self) -> Self {
        let limit = Vec3::splat(CAMERA_POSITION_LIMIT);
        let position = if self.position.is_finite() {
            self.position.clamp(-limit, limit)
        } else {
            log::warn!("Camera position {:?} is not finite, using default", self.position);
            CameraSettings::default().position
        };

        let fov_degrees = if self.fov_degrees.is_finite() {
            self.fov_degrees
                .clamp(FOV_RANGE_DEGREES.0, FOV_RANGE_DEGREES.1)
        } else {
            CameraSettings::default().fov_degrees
        };

        Self {
            position,
            fov_degrees,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_limits_position_and_fov() {
        let settings = CameraSettings {
            position: Vec3::new(50.0, -30.0, 5.0),
            fov_degrees: 170.0,
            ..CameraSettings::default()
        }
        .clamped();

        assert_eq!(settings.position, Vec3::new(20.0, -20.0, 5.0));
        assert_eq!(settings.fov_degrees, 120.0);
    }

    #[test]
    fn test_clamped_replaces_non_finite() {
        let settings = CameraSettings {
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            fov_degrees: f32::INFINITY,
            ..CameraSettings::default()
        }
        .clamped();

        assert_eq!(settings.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(settings.fov_degrees, 60.0);
    }
}
