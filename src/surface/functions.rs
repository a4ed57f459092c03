//! Parametric surface generators.
//!
//! Every generator maps `(u, v) ∈ [0,1]²` to a point in scene space. The
//! parameters are remapped to each surface's natural domain inside the
//! function, and the output is multiplied by a per-surface scale so that all
//! shapes sit at roughly the same visual size (about one scene unit across).
//! Curve-like generators ignore `v`.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Smallest `|tan(v/2)|` fed to the logarithm in Dini's surface.
const DINI_TAN_EPSILON: f32 = 1e-3;

/// Radius below which `sin(r)/r` is replaced by its limit of 1.
const SINC_EPSILON: f32 = 1e-6;

/// Escape-iteration budget for the Mandelbrot height field.
pub const MANDELBROT_SURFACE_ITERATIONS: u32 = 20;

/// Unscaled Klein bottle immersion with `u, v` in radians.
///
/// Shared with the Klein formation path.
pub(crate) fn klein_point(u: f32, v: f32) -> Vec3 {
    let r = 2.0 * (1.0 - u.cos() / 2.0);
    let (x, z) = if u < PI {
        (
            3.0 * u.cos() * (1.0 + u.sin()) + r * u.cos() * v.cos(),
            -8.0 * u.sin() - r * u.sin() * v.cos(),
        )
    } else {
        (
            3.0 * u.cos() * (1.0 + u.sin()) + r * (v + PI).cos(),
            -8.0 * u.sin(),
        )
    };
    let y = -r * v.sin();
    Vec3::new(x, y, z)
}

/// Unscaled Möbius strip point, `u` in radians and `v` across the strip in [-1, 1].
///
/// Returns `(x, y, z)` with `z` as the strip's out-of-plane axis.
pub(crate) fn mobius_point(u: f32, v: f32) -> Vec3 {
    let ring = 1.0 + v / 2.0 * (u / 2.0).cos();
    Vec3::new(ring * u.cos(), ring * u.sin(), v / 2.0 * (u / 2.0).sin())
}

/// Klein bottle, scale 0.1.
pub fn klein_bottle(u: f32, v: f32) -> Vec3 {
    klein_point(u * TAU, v * TAU) * 0.1
}

/// Möbius strip, unit scale.
pub fn mobius_strip(u: f32, v: f32) -> Vec3 {
    mobius_point(u * TAU, (v - 0.5) * 2.0)
}

/// (2,3) trefoil knot curve, scale 0.3. Ignores `v`.
pub fn trefoil_knot(u: f32, _v: f32) -> Vec3 {
    let u = u * TAU;
    let (p, q) = (2.0, 3.0);
    let r = (q * u).cos() + 2.0;
    Vec3::new(r * (p * u).cos(), r * (p * u).sin(), -(q * u).sin()) * 0.3
}

/// Saddle `z = u² - v²` over [-2, 2]², height scaled by 0.2.
pub fn hyperbolic_paraboloid(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 4.0;
    let v = (v - 0.5) * 4.0;
    let z = u * u - v * v;
    Vec3::new(u * 0.5, z * 0.2, v * 0.5)
}

/// `sin(u)·cos(v)` carpet over [-4, 4]², scale 0.3.
pub fn sine_wave_carpet(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 8.0;
    let v = (v - 0.5) * 8.0;
    let y = u.sin() * v.cos() * 2.0;
    Vec3::new(u, y, v) * 0.3
}

/// Damped radial ripple over [-4, 4]².
pub fn ripple_surface(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 8.0;
    let v = (v - 0.5) * 8.0;
    let r = (u * u + v * v).sqrt();
    let y = (r * 2.0).sin() * (-r * 0.3).exp() * 2.0;
    Vec3::new(u * 0.3, y * 0.5, v * 0.3)
}

/// Helicoid, one full turn.
pub fn helicoid(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 4.0;
    let v = v * TAU;
    let x = u * v.cos();
    let y = u * v.sin();
    let z = v * 0.5;
    Vec3::new(x * 0.5, z * 0.3, y * 0.5)
}

/// Catenoid with waist radius 1.
pub fn catenoid(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 4.0;
    let v = v * TAU;
    let c = 1.0;
    let x = c * (u / c).cosh() * v.cos();
    let y = c * (u / c).cosh() * v.sin();
    Vec3::new(x * 0.2, u * 0.3, y * 0.2)
}

/// Monkey saddle `z = u³ - 3uv²`.
pub fn monkey_saddle(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 4.0;
    let v = (v - 0.5) * 4.0;
    let z = u * u * u - 3.0 * u * v * v;
    Vec3::new(u * 0.5, z * 0.1, v * 0.5)
}

/// Dini's surface, two twists.
///
/// `ln(tan(v/2))` is singular at `v = 0` and undefined for negative `v`, so
/// the magnitude of the tangent is clamped to [`DINI_TAN_EPSILON`].
pub fn dini_surface(u: f32, v: f32) -> Vec3 {
    let u = u * 4.0 * PI;
    let v = (v - 0.5) * 2.0;
    let (a, b) = (1.0, 0.2);
    let tan_half = (v / 2.0).tan().abs().max(DINI_TAN_EPSILON);
    let x = a * u.cos() * v.sin();
    let y = a * u.sin() * v.sin();
    let z = a * (v.cos() + tan_half.ln()) + b * u;
    Vec3::new(x * 0.3, z * 0.1, y * 0.3)
}

/// Decorative "Boy's surface": a normalized sphere patch of radius 2.
///
/// Not a true immersion of the projective plane.
pub fn boys_surface(u: f32, v: f32) -> Vec3 {
    let u = u * PI;
    let v = v * PI;
    let p = Vec3::new(u.cos() * v.sin(), u.sin() * v.sin(), v.cos());
    let r = p.length();
    if r < SINC_EPSILON {
        return Vec3::ZERO;
    }
    p / r * 2.0
}

/// (3,2) torus knot with a tube radius that swells along `v`.
pub fn torus_knot(u: f32, v: f32) -> Vec3 {
    let u = u * TAU;
    let v_scale = 0.5 + v * 0.5;
    let (p, q) = (3.0, 2.0);
    let (big_r, r) = (2.0, 0.5 * v_scale);
    let ring = big_r + r * (q * u).cos();
    Vec3::new(ring * (p * u).cos(), ring * (p * u).sin(), r * (q * u).sin()) * 0.3
}

/// Interference of two point sources at `u = ±2`.
pub fn wave_interference(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 10.0;
    let v = (v - 0.5) * 10.0;
    let r1 = ((u - 2.0) * (u - 2.0) + v * v).sqrt();
    let r2 = ((u + 2.0) * (u + 2.0) + v * v).sqrt();
    let y = (r1 * 3.0).sin() + (r2 * 3.0).sin();
    Vec3::new(u * 0.2, y * 0.5, v * 0.2)
}

/// Gaussian bump of height 3.
pub fn gaussian(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 6.0;
    let v = (v - 0.5) * 6.0;
    let y = (-(u * u + v * v) / 4.0).exp() * 3.0;
    Vec3::new(u * 0.3, y * 0.5, v * 0.3)
}

/// The classic `peaks` test function over [-3, 3]².
pub fn peaks(u: f32, v: f32) -> Vec3 {
    let x = (u - 0.5) * 6.0;
    let z = (v - 0.5) * 6.0;
    let y = 3.0 * (1.0 - x) * (1.0 - x) * (-(x * x) - (z + 1.0) * (z + 1.0)).exp()
        - 10.0 * (x / 5.0 - x * x * x - z.powi(5)) * (-x * x - z * z).exp()
        - 1.0 / 3.0 * (-(x + 1.0) * (x + 1.0) - z * z).exp();
    Vec3::new(x * 0.3, y * 0.2, z * 0.3)
}

/// Sombrero `sin(r)/r`. The removable singularity at the origin takes its limit.
pub fn mexican_hat(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 8.0;
    let v = (v - 0.5) * 8.0;
    let r = (u * u + v * v).sqrt();
    let sinc = if r < SINC_EPSILON { 1.0 } else { r.sin() / r };
    Vec3::new(u * 0.3, sinc * 2.0 * 0.5, v * 0.3)
}

/// Mandelbrot escape-time height field over [-2, 2]².
pub fn mandelbrot_surface(u: f32, v: f32) -> Vec3 {
    let c_re = (u - 0.5) * 4.0;
    let c_im = (v - 0.5) * 4.0;
    let iterations = mandelbrot_escape(c_re, c_im, MANDELBROT_SURFACE_ITERATIONS);
    let y = iterations as f32 / MANDELBROT_SURFACE_ITERATIONS as f32 * 2.0;
    Vec3::new(c_re, y, c_im) * 0.5
}

/// Number of iterations before `z² + c` leaves the radius-2 disc, capped at `max`.
pub(crate) fn mandelbrot_escape(c_re: f32, c_im: f32, max: u32) -> u32 {
    let (mut z_re, mut z_im) = (0.0_f32, 0.0_f32);
    let mut iterations = 0;
    while z_re * z_re + z_im * z_im < 4.0 && iterations < max {
        let next_re = z_re * z_re - z_im * z_im + c_re;
        z_im = 2.0 * z_re * z_im + c_im;
        z_re = next_re;
        iterations += 1;
    }
    iterations
}

/// Heart-like surface of revolution.
///
/// The radicand goes negative near the ends of the `v` range; it is clamped
/// to zero so the surface pinches closed instead of producing NaN.
pub fn heart_surface(u: f32, v: f32) -> Vec3 {
    let u = u * TAU;
    let v = (v - 0.5) * PI;
    let radius = 4.0 * (1.0 - v * v * v.abs().sin()).max(0.0).sqrt();
    Vec3::new(u.cos() * radius * 0.1, u.sin() * radius * 0.1, v * 0.3)
}

/// Conchoid seashell.
pub fn seashell(u: f32, v: f32) -> Vec3 {
    let u = u * TAU;
    let v = v * TAU;
    let (a, b, c, n) = (0.2, 1.0, 0.1, 2.0);
    let shell = a * (1.0 + (n * u).cos()) * (1.0 + v.cos());
    let x = shell * u.cos();
    let y = shell * u.sin();
    let z = b * v.sin() + c * u;
    Vec3::new(x * 2.0, y * 2.0, z * 0.5)
}

/// Three-petal rose swept over a sphere.
pub fn rose_surface(u: f32, v: f32) -> Vec3 {
    let u = u * TAU;
    let v = v * PI;
    let k = 3.0;
    let r = (k * u).sin();
    Vec3::new(r * u.cos() * v.sin(), r * u.sin() * v.sin(), v.cos() * 0.5) * 2.0
}

/// Torus whose tube cross-section twists three times per revolution.
pub fn twisted_torus(u: f32, v: f32) -> Vec3 {
    let u = u * TAU;
    let v = v * TAU;
    let (big_r, r, twist) = (2.0, 0.5, 3.0);
    let phase = v + twist * u;
    let ring = big_r + r * phase.cos();
    Vec3::new(ring * u.cos(), ring * u.sin(), r * phase.sin()) * 0.3
}

/// Lissajous surface with ratios 3:2:1.
pub fn lissajous_surface(u: f32, v: f32) -> Vec3 {
    let u = u * TAU;
    let v = v * TAU;
    let (a, b, c) = (3.0, 2.0, 1.0);
    let delta = PI / 4.0;
    Vec3::new((a * u + delta).sin(), (b * v).sin(), (c * (u + v)).sin()) * 2.0
}

/// Slightly squashed egg.
pub fn egg_surface(u: f32, v: f32) -> Vec3 {
    let u = u * TAU;
    let v = v * PI;
    let (a, b) = (1.0, 0.7);
    let x = a * u.cos() * v.sin();
    let y = b * u.sin() * v.sin();
    let z = v.cos() * (1.0 + 0.3 * v.cos());
    Vec3::new(x, y, z) * 1.5
}

/// Hyperboloid of one sheet.
pub fn hyperboloid(u: f32, v: f32) -> Vec3 {
    let u = (u - 0.5) * 4.0;
    let v = v * TAU;
    let ring = (1.0 + u * u).sqrt();
    Vec3::new(ring * v.cos(), ring * v.sin(), u) * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mexican_hat_center_uses_limit() {
        let p = mexican_hat(0.5, 0.5);
        assert!((p.y - 1.0).abs() < 1e-6);
        assert_eq!(p.x, 0.0);
    }

    #[test]
    fn test_dini_singular_row_is_finite() {
        for i in 0..=20 {
            let p = dini_surface(i as f32 / 20.0, 0.5);
            assert!(p.is_finite(), "non-finite Dini point at u={}", i);
        }
    }

    #[test]
    fn test_heart_surface_pinches_closed() {
        let top = heart_surface(0.25, 1.0);
        assert!(top.is_finite());
        assert!(top.x.abs() < 1e-6 && top.y.abs() < 1e-6);
    }

    #[test]
    fn test_mandelbrot_escape_inside_and_outside() {
        // Origin is in the set: never escapes.
        assert_eq!(mandelbrot_escape(0.0, 0.0, 20), 20);
        // Far outside escapes after the first step.
        assert_eq!(mandelbrot_escape(2.0, 2.0, 20), 1);
    }

    #[test]
    fn test_trefoil_ignores_v() {
        assert_eq!(trefoil_knot(0.3, 0.0), trefoil_knot(0.3, 1.0));
    }

    #[test]
    fn test_boys_surface_stays_on_radius_two() {
        for i in 0..=10 {
            for j in 0..=10 {
                let p = boys_surface(i as f32 / 10.0, j as f32 / 10.0);
                assert!((p.length() - 2.0).abs() < 1e-4);
            }
        }
    }
}
