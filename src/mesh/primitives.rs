//! Basic solids: flat-shaded polyhedra and lathed grids.
//!
//! Round solids reuse the tessellator with a parametric generator; the
//! platonic solids are built directly from their vertex sets. Face winding
//! is normalized so every face normal points away from the origin.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::{tessellate, tessellate_grid, Mesh};
use crate::surface::Primitive;

const SPHERE_RESOLUTION: u32 = 16;
/// Segments around the ring
const TORUS_TUBULAR_SEGMENTS: u32 = 16;
/// Segments around the tube
const TORUS_RADIAL_SEGMENTS: u32 = 8;
/// Segments around the axis of cones and cylinders
const LATHE_RADIAL_SEGMENTS: u32 = 8;

const CUBE_HALF_EXTENT: f32 = 0.75;

/// Cone of radius 0.8 and height 1.6: base disc then slanted side.
const CONE_PROFILE: [(f32, f32); 3] = [(0.0, -0.8), (0.8, -0.8), (0.0, 0.8)];

/// Cylinder of radius 0.6 and height 1.5: bottom cap, wall, top cap.
const CYLINDER_PROFILE: [(f32, f32); 4] = [(0.0, -0.75), (0.6, -0.75), (0.6, 0.75), (0.0, 0.75)];

pub fn build(primitive: Primitive) -> Mesh {
    match primitive {
        Primitive::Icosahedron => icosahedron(1),
        Primitive::Sphere => tessellate(unit_sphere, SPHERE_RESOLUTION),
        Primitive::Cube => cube(),
        Primitive::Octahedron => octahedron(),
        Primitive::Dodecahedron => dodecahedron(),
        Primitive::Torus => tessellate_grid(torus, TORUS_TUBULAR_SEGMENTS, TORUS_RADIAL_SEGMENTS),
        Primitive::Cone => lathe_mesh(cone, &CONE_PROFILE),
        Primitive::Cylinder => lathe_mesh(cylinder, &CYLINDER_PROFILE),
    }
}

fn unit_sphere(u: f32, v: f32) -> Vec3 {
    let theta = u * TAU;
    let phi = v * PI;
    Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
}

/// Torus with ring radius 0.8 and tube radius 0.3, lying in the XY plane.
fn torus(u: f32, v: f32) -> Vec3 {
    let (ring, tube) = (0.8, 0.3);
    let u = u * TAU;
    let v = v * TAU;
    let r = ring + tube * v.cos();
    Vec3::new(r * u.cos(), r * u.sin(), tube * v.sin())
}

fn cone(u: f32, v: f32) -> Vec3 {
    lathe(&CONE_PROFILE, u, v)
}

fn cylinder(u: f32, v: f32) -> Vec3 {
    lathe(&CYLINDER_PROFILE, u, v)
}

/// One grid row per profile segment, so every corner lands on a grid line.
fn lathe_mesh(surface: fn(f32, f32) -> Vec3, profile: &[(f32, f32)]) -> Mesh {
    let rows = profile.len().saturating_sub(1).max(1) as u32;
    tessellate_grid(surface, LATHE_RADIAL_SEGMENTS, rows)
}

/// Revolve a piecewise-linear `(radius, height)` profile around the Y axis.
///
/// Each profile segment gets an equal share of the `v` range.
fn lathe(profile: &[(f32, f32)], u: f32, v: f32) -> Vec3 {
    let segments = profile.len().saturating_sub(1).max(1);
    let scaled = v.clamp(0.0, 1.0) * segments as f32;
    let index = (scaled.floor() as usize).min(segments - 1);
    let t = scaled - index as f32;

    let (r0, y0) = profile[index];
    let (r1, y1) = profile[(index + 1).min(profile.len() - 1)];
    let radius = r0 + (r1 - r0) * t;
    let height = y0 + (y1 - y0) * t;

    let angle = u * TAU;
    Vec3::new(radius * angle.cos(), height, radius * angle.sin())
}

fn cube() -> Mesh {
    // Corner i has x, y, z taken from bits 0, 1, 2.
    let corners: Vec<Vec3> = (0..8)
        .map(|i| {
            let bit = |b: usize| if (i >> b) & 1 == 1 { 1.0 } else { -1.0 };
            Vec3::new(bit(0), bit(1), bit(2)) * CUBE_HALF_EXTENT
        })
        .collect();

    let faces: [&[usize]; 6] = [
        &[0, 2, 6, 4],
        &[1, 3, 7, 5],
        &[0, 1, 5, 4],
        &[2, 3, 7, 6],
        &[0, 1, 3, 2],
        &[4, 5, 7, 6],
    ];

    flat_mesh(&corners, &faces)
}

fn octahedron() -> Mesh {
    let corners = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];

    let mut faces = Vec::with_capacity(8);
    for x in [0, 1] {
        for y in [2, 3] {
            for z in [4, 5] {
                faces.push([x, y, z]);
            }
        }
    }
    let faces: Vec<&[usize]> = faces.iter().map(|f| f.as_slice()).collect();

    flat_mesh(&corners, &faces)
}

/// Unit-radius icosahedron vertices and its 20 triangular faces.
fn icosahedron_geometry() -> (Vec<Vec3>, Vec<[usize; 3]>) {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let mut raw = Vec::with_capacity(12);
    for a in [-1.0, 1.0] {
        for b in [-phi, phi] {
            raw.push(Vec3::new(0.0, a, b));
            raw.push(Vec3::new(a, b, 0.0));
            raw.push(Vec3::new(b, 0.0, a));
        }
    }

    // Unnormalized edges have length 2; faces are mutually adjacent triples.
    let adjacent = |i: usize, j: usize| (raw[i].distance(raw[j]) - 2.0).abs() < 1e-3;
    let mut faces = Vec::with_capacity(20);
    for i in 0..raw.len() {
        for j in (i + 1)..raw.len() {
            for k in (j + 1)..raw.len() {
                if adjacent(i, j) && adjacent(j, k) && adjacent(i, k) {
                    faces.push([i, j, k]);
                }
            }
        }
    }

    let vertices = raw.into_iter().map(Vec3::normalize).collect();
    (vertices, faces)
}

/// Icosahedron with `detail` rounds of 4-way subdivision projected onto the unit sphere.
fn icosahedron(detail: u32) -> Mesh {
    let (vertices, faces) = icosahedron_geometry();
    let mut triangles: Vec<[Vec3; 3]> = faces
        .iter()
        .map(|f| [vertices[f[0]], vertices[f[1]], vertices[f[2]]])
        .collect();

    for _ in 0..detail {
        triangles = triangles
            .into_iter()
            .flat_map(|[a, b, c]| {
                let ab = ((a + b) * 0.5).normalize();
                let bc = ((b + c) * 0.5).normalize();
                let ca = ((c + a) * 0.5).normalize();
                [[a, ab, ca], [ab, b, bc], [ca, bc, c], [ab, bc, ca]]
            })
            .collect();
    }

    let corners: Vec<Vec3> = triangles.iter().flatten().copied().collect();
    let faces: Vec<[usize; 3]> = (0..triangles.len())
        .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
        .collect();
    let faces: Vec<&[usize]> = faces.iter().map(|f| f.as_slice()).collect();

    flat_mesh(&corners, &faces)
}

/// Dodecahedron as the dual of the icosahedron, circumradius 1.
fn dodecahedron() -> Mesh {
    let (ico_vertices, ico_faces) = icosahedron_geometry();

    let corners: Vec<Vec3> = ico_faces
        .iter()
        .map(|f| (ico_vertices[f[0]] + ico_vertices[f[1]] + ico_vertices[f[2]]).normalize())
        .collect();

    // One pentagon per icosahedron vertex, from the faces around it in angular order.
    let pentagons: Vec<Vec<usize>> = ico_vertices
        .iter()
        .enumerate()
        .map(|(vi, &axis)| {
            let mut ring: Vec<usize> = ico_faces
                .iter()
                .enumerate()
                .filter(|(_, f)| f.contains(&vi))
                .map(|(fi, _)| fi)
                .collect();

            let reference = (corners[ring[0]] - axis * corners[ring[0]].dot(axis)).normalize();
            let bitangent = axis.cross(reference);
            let angle = |c: Vec3| c.dot(bitangent).atan2(c.dot(reference));
            ring.sort_by(|&a, &b| angle(corners[a]).total_cmp(&angle(corners[b])));
            ring
        })
        .collect();
    let faces: Vec<&[usize]> = pentagons.iter().map(|p| p.as_slice()).collect();

    flat_mesh(&corners, &faces)
}

/// Fan-triangulate convex polygons with unshared vertices so each face is flat-shaded.
fn flat_mesh(corners: &[Vec3], faces: &[&[usize]]) -> Mesh {
    let mut positions = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();

    for face in faces {
        if face.len() < 3 {
            continue;
        }

        let centroid = face.iter().map(|&i| corners[i]).sum::<Vec3>() / face.len() as f32;
        let (a, b, c) = (corners[face[0]], corners[face[1]], corners[face[2]]);
        let outward = (b - a).cross(c - a).dot(centroid) >= 0.0;

        let base = positions.len() as u32;
        for &i in face.iter() {
            positions.push(corners[i]);
            uvs.push(spherical_uv(corners[i]));
        }

        for k in 1..(face.len() as u32 - 1) {
            if outward {
                indices.extend_from_slice(&[base, base + k, base + k + 1]);
            } else {
                indices.extend_from_slice(&[base, base + k + 1, base + k]);
            }
        }
    }

    Mesh::from_positions(positions, uvs, indices)
}

fn spherical_uv(p: Vec3) -> [f32; 2] {
    let d = p.normalize_or_zero();
    let u = 0.5 + d.z.atan2(d.x) / TAU;
    let v = 0.5 - d.y.clamp(-1.0, 1.0).asin() / PI;
    [u, v]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(mesh: &Mesh, name: &str) {
        assert!(!mesh.indices.is_empty(), "{} has no triangles", name);
        assert_eq!(mesh.indices.len() % 3, 0);
        for &i in &mesh.indices {
            assert!((i as usize) < mesh.vertices.len(), "{} index out of range", name);
        }
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4, "{} has non-unit normal", name);
            assert!(Vec3::from_array(v.position).is_finite());
        }
    }

    #[test]
    fn test_all_primitives_well_formed() {
        for p in Primitive::ALL {
            assert_well_formed(&build(p), p.name());
        }
    }

    #[test]
    fn test_polyhedron_face_counts() {
        assert_eq!(cube().triangle_count(), 12);
        assert_eq!(octahedron().triangle_count(), 8);
        assert_eq!(icosahedron(0).triangle_count(), 20);
        assert_eq!(icosahedron(1).triangle_count(), 80);
        // 12 pentagons, 3 triangles each
        assert_eq!(dodecahedron().triangle_count(), 36);
    }

    #[test]
    fn test_polyhedron_normals_point_outward() {
        for mesh in [cube(), octahedron(), icosahedron(1), dodecahedron()] {
            for v in &mesh.vertices {
                let n = Vec3::from_array(v.normal);
                let p = Vec3::from_array(v.position);
                assert!(n.dot(p) > 0.0);
            }
        }
    }

    #[test]
    fn test_icosahedron_on_unit_sphere() {
        for v in &icosahedron(1).vertices {
            assert!((Vec3::from_array(v.position).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_round_solid_segment_counts() {
        // 16 x 8 cells, two triangles each
        assert_eq!(build(Primitive::Torus).triangle_count(), 16 * 8 * 2);
        // 8 radial segments; base disc + side
        assert_eq!(build(Primitive::Cone).triangle_count(), 8 * 2 * 2);
        // 8 radial segments; bottom cap + wall + top cap
        assert_eq!(build(Primitive::Cylinder).triangle_count(), 8 * 3 * 2);
        assert_eq!(build(Primitive::Sphere).triangle_count(), 16 * 16 * 2);
    }

    #[test]
    fn test_lathe_hits_profile_corners() {
        // Cylinder rim at v = 1/3 is the bottom edge of the wall.
        let p = cylinder(0.0, 1.0 / 3.0);
        assert!((p.x - 0.6).abs() < 1e-5);
        assert!((p.y + 0.75).abs() < 1e-5);
        // Cone apex at v = 1
        let apex = cone(0.3, 1.0);
        assert!(apex.x.abs() < 1e-6 && (apex.y - 0.8).abs() < 1e-6);
    }
}
