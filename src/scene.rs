//! Scene state: configuration, caches, animator and camera.
//!
//! Each [`Scene::tick`] resolves the memoized layout and mesh for the current
//! configuration and animates the elements for the given elapsed time.

use std::sync::Arc;

use crate::animation::{AnimationFrame, Animator};
use crate::audio::AudioSnapshot;
use crate::camera::{CameraRig, CameraState};
use crate::formation::{FormationLayout, LayoutCache};
use crate::mesh::{Mesh, MeshCache, DEFAULT_SURFACE_RESOLUTION};
use crate::params::{reduce, CameraSettings, ConfigError, SceneAction, SceneConfig};

/// Construction options that are not part of the scene configuration
#[derive(Debug, Clone)]
pub struct SceneOptions {
    /// Grid resolution for parametric surfaces
    pub resolution: u32,

    /// Seed for the randomized layout fields; `None` draws from entropy
    pub seed: Option<u64>,

    pub camera: CameraSettings,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_SURFACE_RESOLUTION,
            seed: None,
            camera: CameraSettings::default(),
        }
    }
}

/// Everything produced for one frame
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Elapsed time this frame was computed for (seconds)
    pub elapsed: f32,
    pub frame: AnimationFrame,
    /// Shared element mesh
    pub mesh: Arc<Mesh>,
    pub camera: CameraState,
}

pub struct Scene {
    config: SceneConfig,
    resolution: u32,
    layouts: LayoutCache,
    meshes: MeshCache,
    animator: Animator,
    camera: CameraRig,
    last_elapsed: Option<f32>,
}

impl Scene {
    /// Create a scene; non-finite configuration values are rejected.
    pub fn new(config: SceneConfig, options: SceneOptions) -> Result<Self, ConfigError> {
        let config = config.sanitize()?;

        log::info!(
            "Scene: {} x{} in {} formation (radius {})",
            config.shape,
            config.element_count,
            config.formation,
            config.formation_radius
        );

        Ok(Self {
            config,
            resolution: options.resolution.max(1),
            layouts: LayoutCache::new(options.seed),
            meshes: MeshCache::new(),
            animator: Animator::new(),
            camera: CameraRig::new(options.camera),
            last_elapsed: None,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Replace the configuration wholesale.
    pub fn set_config(&mut self, config: SceneConfig) {
        self.apply(SceneAction::Replace(config));
    }

    /// Apply one configuration change through the reducer.
    pub fn apply(&mut self, action: SceneAction) {
        self.config = reduce(&self.config, action);
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    /// Current layout, rebuilt only when a layout field changed
    pub fn layout(&mut self) -> Arc<FormationLayout> {
        self.layouts.get(&self.config.layout_key())
    }

    /// Current element mesh, built once per shape and resolution
    pub fn mesh(&mut self) -> Arc<Mesh> {
        self.meshes.get(self.config.shape, self.resolution)
    }

    /// Advance to `elapsed` seconds and produce the frame.
    ///
    /// The rotation step is the time since the previous tick; the first tick
    /// and any backwards jump use a step of zero.
    pub fn tick(&mut self, elapsed: f32, audio: Option<&AudioSnapshot>) -> FrameOutput {
        let dt = match self.last_elapsed {
            Some(previous) => (elapsed - previous).max(0.0),
            None => 0.0,
        };
        self.last_elapsed = Some(elapsed);

        let layout = self.layout();
        let mesh = self.mesh();
        let frame = self
            .animator
            .animate(&layout, elapsed, dt, &self.config.wave, audio);

        FrameOutput {
            elapsed,
            frame,
            mesh,
            camera: self.camera.state(elapsed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::FormationKind;
    use crate::params::WaveParams;
    use crate::surface::{Shape, SurfaceKind};
    use glam::Vec3;

    fn still_circle() -> SceneConfig {
        SceneConfig {
            shape: Shape::SPHERE,
            formation: FormationKind::Circle,
            element_count: 4,
            formation_radius: 5.0,
            wave: WaveParams {
                amplitude: 0.0,
                ..WaveParams::default()
            },
            ..SceneConfig::default()
        }
    }

    fn seeded() -> SceneOptions {
        SceneOptions {
            seed: Some(1),
            ..SceneOptions::default()
        }
    }

    #[test]
    fn test_end_to_end_first_element() {
        let config = still_circle();
        let size = config.element_size;
        let mut scene = Scene::new(config, seeded()).unwrap();

        let out = scene.tick(0.0, None);
        let first = &out.frame.transforms[0];
        assert!((first.position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(first.scale, size);
        assert_eq!(out.frame.transforms.len(), 4);
        assert_eq!(out.frame.group_yaw, 0.0);
    }

    #[test]
    fn test_layout_reused_across_ticks() {
        let mut scene = Scene::new(still_circle(), seeded()).unwrap();
        let a = scene.layout();
        scene.tick(0.5, None);
        scene.apply(SceneAction::SetWave(WaveParams::default()));
        let b = scene.layout();
        assert!(Arc::ptr_eq(&a, &b));

        scene.apply(SceneAction::SetElementCount(9));
        let c = scene.layout();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.len(), 9);
    }

    #[test]
    fn test_mesh_follows_shape() {
        let mut scene = Scene::new(still_circle(), seeded()).unwrap();
        let sphere = scene.mesh();
        scene.apply(SceneAction::SetShape(Shape::Surface(SurfaceKind::Helicoid)));
        let helicoid = scene.mesh();
        assert!(!Arc::ptr_eq(&sphere, &helicoid));
        // 24x24 grid
        assert_eq!(helicoid.vertices.len(), 25 * 25);
    }

    #[test]
    fn test_backwards_time_does_not_unwind_rotation() {
        let mut scene = Scene::new(SceneConfig::default(), seeded()).unwrap();
        scene.tick(0.0, None);
        let forward = scene.tick(1.0, None);
        let back = scene.tick(0.5, None);
        for (a, b) in forward.frame.transforms.iter().zip(back.frame.transforms.iter()) {
            assert_eq!(a.rotation, b.rotation);
        }
    }

    #[test]
    fn test_element_size_change_keeps_rotation() {
        let mut scene = Scene::new(SceneConfig::default(), seeded()).unwrap();
        scene.tick(0.0, None);
        let before = scene.tick(2.0, None);

        scene.apply(SceneAction::SetElementSize(0.6));
        let after = scene.tick(2.0, None);

        assert_eq!(after.frame.transforms[0].scale, 0.6);
        for (a, b) in before.frame.transforms.iter().zip(after.frame.transforms.iter()) {
            assert_eq!(a.rotation, b.rotation);
        }
    }

    #[test]
    fn test_new_rejects_non_finite_config() {
        let config = SceneConfig {
            element_size: f32::NAN,
            ..SceneConfig::default()
        };
        assert!(Scene::new(config, SceneOptions::default()).is_err());
    }

    #[test]
    fn test_set_config_is_sanitized() {
        let mut scene = Scene::new(SceneConfig::default(), seeded()).unwrap();
        scene.set_config(SceneConfig {
            element_count: 1000,
            ..SceneConfig::default()
        });
        assert_eq!(scene.config().element_count, 50);
    }
}
