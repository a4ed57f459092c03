//! Shape identifiers and the parametric surface registry.
//!
//! A [`Shape`] is either one of the basic solids (built by
//! [`crate::mesh::primitives`]) or a named parametric surface whose
//! generator is looked up through [`SurfaceKind::function`].

pub mod functions;

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Pure mapping from `(u, v) ∈ [0,1]²` to a point in scene space.
pub type SurfaceFn = fn(f32, f32) -> Vec3;

/// Named parametric surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    KleinBottle,
    MobiusStrip,
    TrefoilKnot,
    HyperbolicParaboloid,
    SineWaveCarpet,
    RippleSurface,
    Helicoid,
    Catenoid,
    MonkeySaddle,
    DiniSurface,
    BoysSurface,
    TorusKnot,
    WaveInterference,
    Gaussian,
    Peaks,
    MexicanHat,
    MandelbrotSurface,
    HeartSurface,
    Seashell,
    RoseSurface,
    TwistedTorus,
    LissajousSurface,
    EggSurface,
    Hyperboloid,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 24] = [
        SurfaceKind::KleinBottle,
        SurfaceKind::MobiusStrip,
        SurfaceKind::TrefoilKnot,
        SurfaceKind::HyperbolicParaboloid,
        SurfaceKind::SineWaveCarpet,
        SurfaceKind::RippleSurface,
        SurfaceKind::Helicoid,
        SurfaceKind::Catenoid,
        SurfaceKind::MonkeySaddle,
        SurfaceKind::DiniSurface,
        SurfaceKind::BoysSurface,
        SurfaceKind::TorusKnot,
        SurfaceKind::WaveInterference,
        SurfaceKind::Gaussian,
        SurfaceKind::Peaks,
        SurfaceKind::MexicanHat,
        SurfaceKind::MandelbrotSurface,
        SurfaceKind::HeartSurface,
        SurfaceKind::Seashell,
        SurfaceKind::RoseSurface,
        SurfaceKind::TwistedTorus,
        SurfaceKind::LissajousSurface,
        SurfaceKind::EggSurface,
        SurfaceKind::Hyperboloid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SurfaceKind::KleinBottle => "kleinBottle",
            SurfaceKind::MobiusStrip => "mobiusStrip",
            SurfaceKind::TrefoilKnot => "trefoilKnot",
            SurfaceKind::HyperbolicParaboloid => "hyperbolicParaboloid",
            SurfaceKind::SineWaveCarpet => "sineWaveCarpet",
            SurfaceKind::RippleSurface => "rippleSurface",
            SurfaceKind::Helicoid => "helicoid",
            SurfaceKind::Catenoid => "catenoid",
            SurfaceKind::MonkeySaddle => "monkeySaddle",
            SurfaceKind::DiniSurface => "diniSurface",
            SurfaceKind::BoysSurface => "boysSurface",
            SurfaceKind::TorusKnot => "torusKnot",
            SurfaceKind::WaveInterference => "waveInterference",
            SurfaceKind::Gaussian => "gaussian",
            SurfaceKind::Peaks => "peaks",
            SurfaceKind::MexicanHat => "mexicanHat",
            SurfaceKind::MandelbrotSurface => "mandelbrotSurface",
            SurfaceKind::HeartSurface => "heartSurface",
            SurfaceKind::Seashell => "seashell",
            SurfaceKind::RoseSurface => "roseSurface",
            SurfaceKind::TwistedTorus => "twistedTorus",
            SurfaceKind::LissajousSurface => "lissajousSurface",
            SurfaceKind::EggSurface => "eggSurface",
            SurfaceKind::Hyperboloid => "hyperboloid",
        }
    }

    /// Generator for this surface.
    pub fn function(self) -> SurfaceFn {
        match self {
            SurfaceKind::KleinBottle => functions::klein_bottle,
            SurfaceKind::MobiusStrip => functions::mobius_strip,
            SurfaceKind::TrefoilKnot => functions::trefoil_knot,
            SurfaceKind::HyperbolicParaboloid => functions::hyperbolic_paraboloid,
            SurfaceKind::SineWaveCarpet => functions::sine_wave_carpet,
            SurfaceKind::RippleSurface => functions::ripple_surface,
            SurfaceKind::Helicoid => functions::helicoid,
            SurfaceKind::Catenoid => functions::catenoid,
            SurfaceKind::MonkeySaddle => functions::monkey_saddle,
            SurfaceKind::DiniSurface => functions::dini_surface,
            SurfaceKind::BoysSurface => functions::boys_surface,
            SurfaceKind::TorusKnot => functions::torus_knot,
            SurfaceKind::WaveInterference => functions::wave_interference,
            SurfaceKind::Gaussian => functions::gaussian,
            SurfaceKind::Peaks => functions::peaks,
            SurfaceKind::MexicanHat => functions::mexican_hat,
            SurfaceKind::MandelbrotSurface => functions::mandelbrot_surface,
            SurfaceKind::HeartSurface => functions::heart_surface,
            SurfaceKind::Seashell => functions::seashell,
            SurfaceKind::RoseSurface => functions::rose_surface,
            SurfaceKind::TwistedTorus => functions::twisted_torus,
            SurfaceKind::LissajousSurface => functions::lissajous_surface,
            SurfaceKind::EggSurface => functions::egg_surface,
            SurfaceKind::Hyperboloid => functions::hyperboloid,
        }
    }

    /// Curve-like generators trace a line; their meshes have zero area.
    pub fn is_curve(self) -> bool {
        matches!(self, SurfaceKind::TrefoilKnot)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

/// Basic solids rendered as fixed polyhedra or low-resolution grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Primitive {
    #[default]
    Icosahedron,
    Sphere,
    Cube,
    Octahedron,
    Dodecahedron,
    Torus,
    Cone,
    Cylinder,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Icosahedron,
        Primitive::Sphere,
        Primitive::Cube,
        Primitive::Octahedron,
        Primitive::Dodecahedron,
        Primitive::Torus,
        Primitive::Cone,
        Primitive::Cylinder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Icosahedron => "icosahedron",
            Primitive::Sphere => "sphere",
            Primitive::Cube => "cube",
            Primitive::Octahedron => "octahedron",
            Primitive::Dodecahedron => "dodecahedron",
            Primitive::Torus => "torus",
            Primitive::Cone => "cone",
            Primitive::Cylinder => "cylinder",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

/// Element shape: a basic solid or a parametric surface.
///
/// Serialized as its name. Unknown names fall back to the icosahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Shape {
    Primitive(Primitive),
    Surface(SurfaceKind),
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Primitive(Primitive::Icosahedron)
    }
}

impl Shape {
    pub const SPHERE: Shape = Shape::Primitive(Primitive::Sphere);

    pub fn name(self) -> &'static str {
        match self {
            Shape::Primitive(p) => p.name(),
            Shape::Surface(s) => s.name(),
        }
    }

    /// Exact lookup by name; `None` for unknown identifiers.
    pub fn parse(name: &str) -> Option<Self> {
        Primitive::from_name(name)
            .map(Shape::Primitive)
            .or_else(|| SurfaceKind::from_name(name).map(Shape::Surface))
    }

    /// Lookup with the documented fallback to the icosahedron.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            log::warn!("Unknown shape '{}', using icosahedron", name);
            Shape::default()
        })
    }

    /// Parametric generator, if this shape is a named surface.
    pub fn surface(self) -> Option<SurfaceFn> {
        match self {
            Shape::Surface(kind) => Some(kind.function()),
            Shape::Primitive(_) => None,
        }
    }

    /// Every known shape, primitives first.
    pub fn all() -> impl Iterator<Item = Shape> {
        Primitive::ALL
            .into_iter()
            .map(Shape::Primitive)
            .chain(SurfaceKind::ALL.into_iter().map(Shape::Surface))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Shape {
    fn from(name: String) -> Self {
        Shape::from_name(&name)
    }
}

impl From<Shape> for String {
    fn from(shape: Shape) -> Self {
        shape.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_surfaces_finite_on_grid() {
        let steps = 50;
        for kind in SurfaceKind::ALL {
            let f = kind.function();
            for i in 0..=steps {
                for j in 0..=steps {
                    let (u, v) = (i as f32 / steps as f32, j as f32 / steps as f32);
                    let p = f(u, v);
                    assert!(
                        p.is_finite(),
                        "{} produced {:?} at ({}, {})",
                        kind.name(),
                        p,
                        u,
                        v
                    );
                }
            }
        }
    }

    #[test]
    fn test_surface_functions_are_pure() {
        for kind in SurfaceKind::ALL {
            let f = kind.function();
            assert_eq!(f(0.37, 0.81), f(0.37, 0.81), "{}", kind.name());
        }
    }

    #[test]
    fn test_at_least_twenty_surfaces() {
        assert!(SurfaceKind::ALL.len() >= 20);
    }

    #[test]
    fn test_shape_names_round_trip() {
        for shape in Shape::all() {
            assert_eq!(Shape::parse(shape.name()), Some(shape));
        }
    }

    #[test]
    fn test_unknown_shape_falls_back_to_icosahedron() {
        assert_eq!(
            Shape::from_name("butterfly"),
            Shape::Primitive(Primitive::Icosahedron)
        );
        assert!(Shape::parse("butterfly").is_none());
    }

    #[test]
    fn test_shape_lookup_ignores_case() {
        assert_eq!(
            Shape::parse("KLEINBOTTLE"),
            Some(Shape::Surface(SurfaceKind::KleinBottle))
        );
    }

    #[test]
    fn test_shape_serde_uses_names() {
        let json = serde_json::to_string(&Shape::Surface(SurfaceKind::MexicanHat)).unwrap();
        assert_eq!(json, "\"mexicanHat\"");
        let back: Shape = serde_json::from_str("\"notAShape\"").unwrap();
        assert_eq!(back, Shape::default());
    }
}
