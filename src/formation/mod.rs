//! Formation layout engine.
//!
//! Places `n` elements in space according to a named pattern. Every pattern
//! except `random` is a closed-form function of `(i, n, r)`; the per-element
//! randomized fields (rotation speed, saturation, lightness) are drawn once
//! when a layout is built and stay fixed until the layout is replaced.

use std::f32::consts::{PI, TAU};
use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::color::Hsl;
use crate::surface::functions::{klein_point, mandelbrot_escape, mobius_point};

/// Iteration cap for the mandelbrot formation.
pub const MANDELBROT_FORMATION_ITERATIONS: u32 = 10;

/// Named layout patterns.
///
/// Serialized as its name. Unknown names fall back to [`FormationKind::Random`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FormationKind {
    #[default]
    Circle,
    Spiral,
    Grid,
    Helix,
    DoubleHelix,
    Fibonacci,
    Lissajous,
    Rose,
    Trefoil,
    Torus,
    Spherical,
    Mandelbrot,
    Butterfly,
    Heart,
    Klein,
    Mobius,
    Hypercube,
    FractalTree,
    Random,
}

impl FormationKind {
    pub const ALL: [FormationKind; 19] = [
        FormationKind::Circle,
        FormationKind::Spiral,
        FormationKind::Grid,
        FormationKind::Helix,
        FormationKind::DoubleHelix,
        FormationKind::Fibonacci,
        FormationKind::Lissajous,
        FormationKind::Rose,
        FormationKind::Trefoil,
        FormationKind::Torus,
        FormationKind::Spherical,
        FormationKind::Mandelbrot,
        FormationKind::Butterfly,
        FormationKind::Heart,
        FormationKind::Klein,
        FormationKind::Mobius,
        FormationKind::Hypercube,
        FormationKind::FractalTree,
        FormationKind::Random,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormationKind::Circle => "circle",
            FormationKind::Spiral => "spiral",
            FormationKind::Grid => "grid",
            FormationKind::Helix => "helix",
            FormationKind::DoubleHelix => "doubleHelix",
            FormationKind::Fibonacci => "fibonacci",
            FormationKind::Lissajous => "lissajous",
            FormationKind::Rose => "rose",
            FormationKind::Trefoil => "trefoil",
            FormationKind::Torus => "torus",
            FormationKind::Spherical => "spherical",
            FormationKind::Mandelbrot => "mandelbrot",
            FormationKind::Butterfly => "butterfly",
            FormationKind::Heart => "heart",
            FormationKind::Klein => "klein",
            FormationKind::Mobius => "mobius",
            FormationKind::Hypercube => "hypercube",
            FormationKind::FractalTree => "fractalTree",
            FormationKind::Random => "random",
        }
    }

    /// Exact lookup by name; `None` for unknown identifiers.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Lookup with the documented fallback to `random`.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            log::warn!("Unknown formation '{}', using random", name);
            FormationKind::Random
        })
    }
}

impl fmt::Display for FormationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for FormationKind {
    fn from(name: String) -> Self {
        FormationKind::from_name(&name)
    }
}

impl From<FormationKind> for String {
    fn from(kind: FormationKind) -> Self {
        kind.name().to_string()
    }
}

/// Deterministic base position of element `i` of `n` at radius `r`.
///
/// Returns `None` only for [`FormationKind::Random`], whose positions come
/// from [`ElementJitter::scatter`]. Denominators use `max(n, 1)`.
pub fn pattern_position(kind: FormationKind, i: usize, n: usize, r: f32) -> Option<Vec3> {
    let count = n.max(1);
    let n_f = count as f32;
    let i_f = i as f32;
    let frac = i_f / n_f;

    let position = match kind {
        FormationKind::Circle => {
            let angle = frac * TAU;
            Vec3::new(angle.cos() * r, 0.0, angle.sin() * r)
        }
        FormationKind::Spiral => {
            let angle = frac * 2.0 * TAU;
            let spiral_r = r * frac;
            Vec3::new(angle.cos() * spiral_r, (frac - 0.5) * r, angle.sin() * spiral_r)
        }
        FormationKind::Grid => {
            let size = (n_f.sqrt().ceil() as usize).max(1);
            let half = size as f32 / 2.0;
            let spacing = r / size as f32 * 2.0;
            let gx = (i % size) as f32 - half;
            let gz = (i / size) as f32 - half;
            Vec3::new(gx * spacing, 0.0, gz * spacing)
        }
        FormationKind::Helix => {
            let angle = frac * 3.0 * TAU;
            Vec3::new(angle.cos() * r, (frac - 0.5) * r * 2.0, angle.sin() * r)
        }
        FormationKind::DoubleHelix => {
            // Odd elements sit on the opposite strand
            let angle = frac * 4.0 * TAU + (i % 2) as f32 * PI;
            let strand_r = r * (0.7 + 0.3 * i_f.sin());
            Vec3::new(
                angle.cos() * strand_r,
                (frac - 0.5) * r * 2.5,
                angle.sin() * strand_r,
            )
        }
        FormationKind::Fibonacci => {
            let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
            let angle = i_f * golden_angle;
            let spiral_r = frac.sqrt() * r;
            Vec3::new(
                angle.cos() * spiral_r,
                (frac - 0.5) * r * 0.5,
                angle.sin() * spiral_r,
            )
        }
        FormationKind::Lissajous => {
            let t = frac * 2.0 * TAU;
            let (a, b) = (3.0, 2.0);
            Vec3::new(
                (a * t).sin() * r,
                (b * t).cos() * r * 0.5,
                ((a + b) * t).sin() * r * 0.8,
            )
        }
        FormationKind::Rose => {
            let t = frac * 4.0 * TAU;
            let petals = 5.0;
            let rose_r = (petals * t).sin() * r;
            Vec3::new(rose_r * t.cos(), (t * 2.0).sin() * r * 0.3, rose_r * t.sin())
        }
        FormationKind::Trefoil => {
            let t = frac * TAU;
            Vec3::new(
                t.sin() + 2.0 * (2.0 * t).sin(),
                t.cos() - 2.0 * (2.0 * t).cos(),
                -(3.0 * t).sin(),
            ) * (r * 0.3)
        }
        FormationKind::Torus => {
            let u = frac * TAU;
            let v = ((i * 7) % count) as f32 / n_f * TAU;
            let (ring, tube) = (r, r * 0.3);
            let d = ring + tube * v.cos();
            Vec3::new(d * u.cos(), tube * v.sin(), d * u.sin())
        }
        FormationKind::Spherical => {
            let phi = (1.0 - 2.0 * frac).clamp(-1.0, 1.0).acos();
            let theta = PI * (1.0 + 5.0_f32.sqrt()) * i_f;
            Vec3::new(
                phi.sin() * theta.cos() * r,
                phi.sin() * theta.sin() * r,
                phi.cos() * r,
            )
        }
        FormationKind::Mandelbrot => {
            let re = ((i % 10) as f32 - 5.0) * r * 0.1;
            let im = ((i / 10) as f32 - 5.0) * r * 0.1;
            let iterations = mandelbrot_escape(re, im, MANDELBROT_FORMATION_ITERATIONS);
            let height = iterations as f32 / MANDELBROT_FORMATION_ITERATIONS as f32 - 0.5;
            Vec3::new(re * 10.0, height * r, im * 10.0)
        }
        FormationKind::Butterfly => {
            let t = frac * 6.0 * TAU;
            let curve = t.cos().exp() - 2.0 * (4.0 * t).cos() + (t / 12.0).sin().powi(5);
            Vec3::new(
                t.sin() * curve * r * 0.2,
                (t * 3.0).sin() * r * 0.3,
                t.cos() * curve * r * 0.2,
            )
        }
        FormationKind::Heart => {
            let t = frac * TAU;
            Vec3::new(
                16.0 * t.sin().powi(3) * r * 0.1,
                (13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos())
                    * r
                    * 0.1,
                (t * 4.0).sin() * r * 0.2,
            )
        }
        FormationKind::Klein => {
            let u = frac * TAU;
            let v = ((i * 3) % count) as f32 / n_f * TAU;
            klein_point(u, v) * (r * 0.05)
        }
        FormationKind::Mobius => {
            let u = frac * TAU;
            let v = (((i * 2) % count) as f32 / n_f - 0.5) * 2.0;
            let p = mobius_point(u, v) * (r * 0.5);
            // Strip lies flat in XZ
            Vec3::new(p.x, p.z, p.y)
        }
        FormationKind::Hypercube => {
            let sign = |bit: usize| ((i >> bit) % 2) as f32 * 2.0 - 1.0;
            let w = sign(0);
            let projection = 1.0 / (2.0 - w);
            Vec3::new(sign(1), sign(2), sign(3)) * (projection * r)
        }
        FormationKind::FractalTree => {
            let depth = (i + 1).ilog2();
            let level_width = 2_usize.pow(depth);
            let branch = i + 1 - level_width;
            let angle = branch as f32 / level_width as f32 * TAU;
            let branch_r = r * 0.7_f32.powi(depth as i32);
            Vec3::new(
                angle.cos() * branch_r,
                depth as f32 * r * 0.3,
                angle.sin() * branch_r,
            )
        }
        FormationKind::Random => return None,
    };

    Some(position)
}

/// Per-element random draw, taken once at layout construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementJitter {
    /// Rotation speed per axis (rad/s), each in `[-rot, rot)`
    pub rotation_speed: Vec3,
    /// Color saturation in `[0.7, 1.0)`
    pub saturation: f32,
    /// Color lightness in `[0.5, 0.8)`
    pub lightness: f32,
    /// Uniform position in the cube `[-r, r)³`, used by the random formation
    pub scatter: Vec3,
}

impl ElementJitter {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, base_rotation_speed: f32, radius: f32) -> Self {
        let mut centered = || rng.gen::<f32>() - 0.5;
        let rotation_speed =
            Vec3::new(centered(), centered(), centered()) * (base_rotation_speed * 2.0);
        let scatter = Vec3::new(centered(), centered(), centered()) * (radius * 2.0);
        let saturation = 0.7 + rng.gen::<f32>() * 0.3;
        let lightness = 0.5 + rng.gen::<f32>() * 0.3;

        Self {
            rotation_speed,
            saturation,
            lightness,
            scatter,
        }
    }
}

/// One placed element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    pub id: usize,
    pub base_position: Vec3,
    pub base_scale: f32,
    /// Rad/s per axis
    pub rotation_speed: Vec3,
    pub base_color: Hsl,
    /// Wave phase offset (radians)
    pub phase_offset: f32,
}

/// Ordered element placements for one configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormationLayout {
    pub elements: Vec<ElementSpec>,
    /// Increases each time the cache builds a new layout
    pub generation: u64,
}

impl FormationLayout {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Build a layout of `n` elements.
///
/// # Arguments
/// * `kind` - Layout pattern
/// * `n` - Element count (0 yields an empty layout)
/// * `radius` - Formation radius (scene units)
/// * `element_size` - Base scale of every element
/// * `base_rotation_speed` - Upper bound of per-axis rotation speed (rad/s)
/// * `rng` - Source for the randomized per-element fields
pub fn layout<R: Rng + ?Sized>(
    kind: FormationKind,
    n: usize,
    radius: f32,
    element_size: f32,
    base_rotation_speed: f32,
    rng: &mut R,
) -> FormationLayout {
    let denominator = n.max(1) as f32;

    let elements = (0..n)
        .map(|i| {
            let jitter = ElementJitter::draw(rng, base_rotation_speed, radius);
            let base_position = pattern_position(kind, i, n, radius).unwrap_or(jitter.scatter);
            let hue = (i as f32 / denominator + 0.2) % 1.0;

            ElementSpec {
                id: i,
                base_position,
                base_scale: element_size,
                rotation_speed: jitter.rotation_speed,
                base_color: Hsl::new(hue, jitter.saturation, jitter.lightness),
                phase_offset: i as f32 * 0.3,
            }
        })
        .collect();

    FormationLayout {
        elements,
        generation: 0,
    }
}

/// Configuration fields a layout depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutKey {
    pub formation: FormationKind,
    pub element_count: usize,
    pub formation_radius: f32,
    pub element_size: f32,
    pub rotation_speed: f32,
}

/// Holds the current layout and rebuilds it only when its key changes.
pub struct LayoutCache {
    rng: StdRng,
    current: Option<(LayoutKey, Arc<FormationLayout>)>,
    next_generation: u64,
}

impl LayoutCache {
    /// Create a cache; a seed makes the randomized fields reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rng,
            current: None,
            next_generation: 1,
        }
    }

    /// Layout for `key`, rebuilt only if `key` differs from the last request.
    pub fn get(&mut self, key: &LayoutKey) -> Arc<FormationLayout> {
        if let Some((current_key, layout)) = &self.current {
            if current_key == key {
                return Arc::clone(layout);
            }
        }

        let mut built = layout(
            key.formation,
            key.element_count,
            key.formation_radius,
            key.element_size,
            key.rotation_speed,
            &mut self.rng,
        );
        built.generation = self.next_generation;
        self.next_generation += 1;

        log::debug!(
            "Built {} layout with {} elements (generation {})",
            key.formation,
            built.len(),
            built.generation
        );

        let built = Arc::new(built);
        self.current = Some((*key, Arc::clone(&built)));
        built
    }

    /// Drop the current layout so the next `get` rebuilds.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn key(formation: FormationKind, count: usize) -> LayoutKey {
        LayoutKey {
            formation,
            element_count: count,
            formation_radius: 5.0,
            element_size: 0.5,
            rotation_speed: 2.0,
        }
    }

    #[test]
    fn test_circle_positions() {
        let expected = [
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -5.0),
        ];
        for (i, e) in expected.iter().enumerate() {
            let p = pattern_position(FormationKind::Circle, i, 4, 5.0).unwrap();
            assert!(approx(p, *e), "index {}: {:?}", i, p);
        }
    }

    #[test]
    fn test_single_element_is_finite_everywhere() {
        for kind in FormationKind::ALL {
            let mut rng = StdRng::seed_from_u64(7);
            let l = layout(kind, 1, 5.0, 0.5, 1.0, &mut rng);
            assert_eq!(l.len(), 1);
            assert!(l.elements[0].base_position.is_finite(), "{}", kind);
        }
    }

    #[test]
    fn test_all_patterns_finite_for_full_count() {
        for kind in FormationKind::ALL {
            let mut rng = StdRng::seed_from_u64(1);
            for e in layout(kind, 50, 10.0, 1.0, 3.0, &mut rng).elements {
                assert!(e.base_position.is_finite(), "{} element {}", kind, e.id);
            }
        }
    }

    #[test]
    fn test_zero_elements_gives_empty_layout() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(layout(FormationKind::Spiral, 0, 5.0, 0.5, 1.0, &mut rng).is_empty());
    }

    #[test]
    fn test_deterministic_fields() {
        let mut rng = StdRng::seed_from_u64(3);
        let l = layout(FormationKind::Helix, 5, 5.0, 0.4, 1.0, &mut rng);
        assert!((l.elements[0].base_color.h - 0.2).abs() < 1e-6);
        assert!((l.elements[2].base_color.h - 0.6).abs() < 1e-6);
        for (i, e) in l.elements.iter().enumerate() {
            assert_eq!(e.id, i);
            assert_eq!(e.base_scale, 0.4);
            assert!((e.phase_offset - 0.3 * i as f32).abs() < 1e-6);
        }
    }

    #[test]
    fn test_randomized_fields_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let l = layout(FormationKind::Random, 40, 4.0, 0.5, 1.5, &mut rng);
        for e in &l.elements {
            let c = e.base_color;
            assert!((0.7..1.0).contains(&c.s));
            assert!((0.5..0.8).contains(&c.l));
            assert!(e.rotation_speed.abs().max_element() <= 1.5);
            assert!(e.base_position.abs().max_element() <= 4.0);
        }
    }

    #[test]
    fn test_zero_rotation_speed_draws_nothing_spinning() {
        let mut rng = StdRng::seed_from_u64(5);
        let l = layout(FormationKind::Circle, 3, 5.0, 0.5, 0.0, &mut rng);
        for e in &l.elements {
            assert_eq!(e.rotation_speed, Vec3::ZERO);
        }
    }

    #[test]
    fn test_hypercube_projection() {
        // i = 0: w = -1, all coordinates -1, projection 1/3
        let p = pattern_position(FormationKind::Hypercube, 0, 16, 3.0).unwrap();
        assert!(approx(p, Vec3::new(-1.0, -1.0, -1.0)));
        // i = 1: w = +1, projection 1
        let p = pattern_position(FormationKind::Hypercube, 1, 16, 3.0).unwrap();
        assert!(approx(p, Vec3::new(-3.0, -3.0, -3.0)));
    }

    #[test]
    fn test_fractal_tree_levels() {
        let root = pattern_position(FormationKind::FractalTree, 0, 7, 10.0).unwrap();
        assert!(approx(root, Vec3::new(10.0, 0.0, 0.0)));
        // Indices 1 and 2 form depth 1 at radius 7
        let second = pattern_position(FormationKind::FractalTree, 2, 7, 10.0).unwrap();
        assert!(approx(second, Vec3::new(-7.0, 3.0, 0.0)));
    }

    #[test]
    fn test_unknown_formation_falls_back_to_random() {
        assert_eq!(FormationKind::from_name("pentagram"), FormationKind::Random);
        assert_eq!(FormationKind::parse("doublehelix"), Some(FormationKind::DoubleHelix));
        let kind: FormationKind = serde_json::from_str("\"pentagram\"").unwrap();
        assert_eq!(kind, FormationKind::Random);
    }

    #[test]
    fn test_layout_cache_reuses_unchanged_key() {
        let mut cache = LayoutCache::new(Some(42));
        let a = cache.get(&key(FormationKind::Circle, 10));
        let b = cache.get(&key(FormationKind::Circle, 10));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.generation, 1);
    }

    #[test]
    fn test_layout_cache_rebuilds_on_change() {
        let mut cache = LayoutCache::new(Some(42));
        let a = cache.get(&key(FormationKind::Circle, 10));
        let b = cache.get(&key(FormationKind::Circle, 11));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.len(), 11);
        assert!(b.generation > a.generation);

        cache.invalidate();
        let c = cache.get(&key(FormationKind::Circle, 11));
        assert!(c.generation > b.generation);
    }
}
