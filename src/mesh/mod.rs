//! Surface tessellation and mesh caching.
//!
//! A parametric surface is sampled on a regular `(res+1) × (res+1)` grid and
//! stitched into two triangles per cell. Normals are derived from the mesh
//! itself (area-weighted average of adjacent face normals), which is good
//! enough for shading and works for every generator, including the
//! self-intersecting ones.

pub mod primitives;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::surface::{Shape, SurfaceFn};

/// Default grid resolution for parametric surfaces.
pub const DEFAULT_SURFACE_RESOLUTION: u32 = 24;

/// Largest grid resolution; keeps every vertex index well inside `u32`
pub const MAX_SURFACE_RESOLUTION: u32 = 1024;

/// Vertex data for element meshes (position + normal + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle mesh, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Assemble a mesh from positions, UVs and indices, deriving normals.
    pub fn from_positions(positions: Vec<Vec3>, uvs: Vec<[f32; 2]>, indices: Vec<u32>) -> Self {
        let normals = compute_vertex_normals(&positions, &indices);
        let vertices = positions
            .iter()
            .zip(normals.iter())
            .zip(uvs.iter())
            .map(|((p, n), uv)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: *uv,
            })
            .collect();

        Self { vertices, indices }
    }

    /// Flat `[x, y, z, x, y, z, ...]` position buffer.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Serialize as a Wavefront OBJ document.
    pub fn to_obj(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "o {}", name);
        for v in &self.vertices {
            let _ = writeln!(out, "v {} {} {}", v.position[0], v.position[1], v.position[2]);
        }
        for v in &self.vertices {
            let _ = writeln!(out, "vt {} {}", v.uv[0], v.uv[1]);
        }
        for v in &self.vertices {
            let _ = writeln!(out, "vn {} {} {}", v.normal[0], v.normal[1], v.normal[2]);
        }
        for tri in self.indices.chunks_exact(3) {
            // OBJ indices are 1-based
            let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
            let _ = writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}");
        }
        out
    }
}

/// Sample `surface` on a regular grid and triangulate it.
///
/// Produces `(res+1)²` vertices at `u = i/res, v = j/res` with UV `(u, v)`,
/// and for each cell the triangles `(a, b, c)` and `(b, d, c)` where
/// `a = i(res+1) + j`, `b = a + res + 1`, `c = a + 1`, `d = b + 1`.
/// Resolution is clamped to `1..=MAX_SURFACE_RESOLUTION`.
pub fn tessellate(surface: SurfaceFn, resolution: u32) -> Mesh {
    tessellate_grid(surface, resolution, resolution)
}

/// [`tessellate`] with separate segment counts along `u` and `v`.
pub fn tessellate_grid(surface: SurfaceFn, u_segments: u32, v_segments: u32) -> Mesh {
    let clamp = |segments: u32| {
        if segments > MAX_SURFACE_RESOLUTION {
            log::warn!(
                "Resolution {} too large, using {}",
                segments,
                MAX_SURFACE_RESOLUTION
            );
        }
        segments.clamp(1, MAX_SURFACE_RESOLUTION) as usize
    };
    let (us, vs) = (clamp(u_segments), clamp(v_segments));
    let stride = vs + 1;
    let count = (us + 1) * stride;

    let mut positions = Vec::with_capacity(count);
    let mut uvs = Vec::with_capacity(count);

    for i in 0..=us {
        for j in 0..=vs {
            let u = i as f32 / us as f32;
            let v = j as f32 / vs as f32;

            let mut p = surface(u, v);
            if !p.is_finite() {
                log::warn!("Surface produced non-finite point at ({}, {}), zeroing", u, v);
                p = Vec3::ZERO;
            }

            positions.push(p);
            uvs.push([u, v]);
        }
    }

    let mut indices = Vec::with_capacity(us * vs * 6);
    for i in 0..us {
        for j in 0..vs {
            let a = (i * stride + j) as u32;
            let b = a + stride as u32;
            let c = a + 1;
            let d = b + 1;

            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    Mesh::from_positions(positions, uvs, indices)
}

/// Area-weighted vertex normals from triangle topology.
///
/// Vertices touched only by zero-area triangles get `+Y`.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
            continue;
        }

        // Magnitude = 2 * triangle area
        let face_normal = (positions[i1] - positions[i0]).cross(positions[i2] - positions[i0]);

        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    normals
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                Vec3::Y
            } else {
                n
            }
        })
        .collect()
}

/// Memoizes meshes by `(shape, resolution)`.
///
/// Tessellation is O(resolution²); a scene asks for the same mesh every
/// frame, so it is built once and shared.
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<(Shape, u32), Arc<Mesh>>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh for `shape`; primitives ignore `resolution` beyond the cache key.
    pub fn get(&mut self, shape: Shape, resolution: u32) -> Arc<Mesh> {
        Arc::clone(self.meshes.entry((shape, resolution)).or_insert_with(|| {
            log::debug!("Building mesh for {} at resolution {}", shape, resolution);
            Arc::new(build_mesh(shape, resolution))
        }))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

/// Build a mesh for any shape without caching.
pub fn build_mesh(shape: Shape, resolution: u32) -> Mesh {
    match shape {
        Shape::Surface(kind) => tessellate(kind.function(), resolution),
        Shape::Primitive(primitive) => primitives::build(primitive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Primitive, SurfaceKind};

    fn plane(u: f32, v: f32) -> Vec3 {
        Vec3::new(u, 0.0, v)
    }

    #[test]
    fn test_buffer_lengths() {
        for res in [1u32, 2, 7, 24] {
            let mesh = tessellate(SurfaceKind::KleinBottle.function(), res);
            let r = res as usize;
            assert_eq!(mesh.indices.len(), r * r * 6);
            assert_eq!(mesh.positions_flat().len(), (r + 1) * (r + 1) * 3);
        }
    }

    #[test]
    fn test_tessellation_is_deterministic() {
        let f = SurfaceKind::Peaks.function();
        let a = tessellate(f, 16);
        let b = tessellate(f, 16);
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn test_grid_uv_and_winding() {
        let mesh = tessellate(plane, 2);
        // Vertex (i=1, j=2) is index 1*3 + 2 = 5
        assert_eq!(mesh.vertices[5].uv, [0.5, 1.0]);
        // First cell: a=0, b=3, c=1, d=4
        assert_eq!(&mesh.indices[..6], &[0, 3, 1, 3, 4, 1]);
    }

    #[test]
    fn test_plane_normals_are_unit_and_consistent() {
        let mesh = tessellate(plane, 4);
        let first = Vec3::from_array(mesh.vertices[0].normal);
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((n - first).length() < 1e-5);
        }
        // Flat plane in XZ: normal is along the Y axis
        assert!(first.y.abs() > 0.999);
    }

    #[test]
    fn test_curve_surface_gets_fallback_normals() {
        let mesh = tessellate(SurfaceKind::TrefoilKnot.function(), 8);
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_zero_resolution_treated_as_one() {
        let mesh = tessellate(plane, 0);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn test_resolution_capped() {
        let mesh = tessellate(plane, u32::MAX);
        let side = MAX_SURFACE_RESOLUTION as usize + 1;
        assert_eq!(mesh.vertices.len(), side * side);
        let last = *mesh.indices.iter().max().unwrap() as usize;
        assert_eq!(last, side * side - 1);
    }

    #[test]
    fn test_rectangular_grid() {
        let mesh = tessellate_grid(plane, 3, 1);
        assert_eq!(mesh.vertices.len(), 4 * 2);
        assert_eq!(mesh.triangle_count(), 6);
        // Stride is v_segments + 1
        assert_eq!(&mesh.indices[..6], &[0, 2, 1, 2, 3, 1]);
        assert_eq!(mesh.vertices[7].uv, [1.0, 1.0]);
    }

    #[test]
    fn test_mesh_cache_memoizes() {
        let mut cache = MeshCache::new();
        let shape = Shape::Surface(SurfaceKind::Catenoid);
        let a = cache.get(shape, 12);
        let b = cache.get(shape, 12);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.get(shape, 13);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);

        cache.get(Shape::Primitive(Primitive::Cube), 12);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_obj_export_counts() {
        let mesh = tessellate(plane, 1);
        let obj = mesh.to_obj("plane");
        assert!(obj.starts_with("o plane\n"));
        assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 2);
        assert!(obj.contains("f 1/1/1 3/3/3 2/2/2"));
    }
}
