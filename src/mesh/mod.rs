// src/mesh/mod.rs
// Mesh containers and shared repair primitives for terrain editing
// Exists to centralize buffers, welding, and validation used by the edit and proposal paths
// RELEVANT FILES:src/mesh/weld.rs,src/mesh/validate.rs,src/deform.rs,src/proposal.rs

mod validate;
mod vertex;
mod weld;

pub use validate::{validate_mesh, MeshStats, MeshValidationIssue, MeshValidationReport};
pub use vertex::{interleave, PackedVertex};
pub use weld::{weld_mesh, weld_triangle_soup, WeldOptions, WeldResult};

use glam::Vec3;

use crate::error::{SculptError, SculptResult};

/// Shared mesh container used across the crate.
///
/// Positions are in terrain-local coordinates with Z up; the ground plane is
/// XY. `normals` and `uvs` are either empty or exactly as long as
/// `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_capacity),
            normals: Vec::with_capacity(vertex_capacity),
            uvs: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }
}

/// Axis-aligned bounds of a position buffer.
pub fn compute_bounds(positions: &[[f32; 3]]) -> Option<(Vec3, Vec3)> {
    if positions.is_empty() {
        return None;
    }

    let mut min = Vec3::from_array(positions[0]);
    let mut max = min;

    for p in positions.iter().copied().skip(1) {
        let v = Vec3::from_array(p);
        min = min.min(v);
        max = max.max(v);
    }

    Some((min, max))
}

/// Recompute vertex normals by accumulating face normals.
///
/// Area weighting falls out of the unnormalized cross products. Vertices with
/// no well-formed incident triangle get the +Z fallback so downstream normal
/// displacement stays finite.
pub fn recompute_normals(mesh: &mut MeshBuffers) {
    mesh.normals.clear();
    mesh.normals.resize(mesh.positions.len(), [0.0, 0.0, 0.0]);

    for tri in mesh.indices.chunks_exact(3) {
        let p0 = Vec3::from_array(mesh.positions[tri[0] as usize]);
        let p1 = Vec3::from_array(mesh.positions[tri[1] as usize]);
        let p2 = Vec3::from_array(mesh.positions[tri[2] as usize]);
        let face = (p1 - p0).cross(p2 - p0);
        if face.length_squared() <= 1e-12 {
            continue;
        }
        for &vid in tri {
            let n = &mut mesh.normals[vid as usize];
            n[0] += face.x;
            n[1] += face.y;
            n[2] += face.z;
        }
    }

    for normal in &mut mesh.normals {
        let v = Vec3::from_array(*normal);
        let len = v.length();
        *normal = if len > 1e-6 {
            (v / len).to_array()
        } else {
            [0.0, 0.0, 1.0]
        };
    }
}

/// Build an indexed mesh from the host's flat triangle soup.
///
/// The host hands terrain over as a position-only Float32 triangle list;
/// welding collapses shared corners so edits move a vertex once instead of
/// once per incident triangle.
pub fn from_triangle_soup(soup: &[f32]) -> SculptResult<MeshBuffers> {
    if soup.len() % 9 != 0 {
        return Err(SculptError::geometry(format!(
            "triangle soup length {} is not a multiple of 9",
            soup.len()
        )));
    }
    if soup.is_empty() {
        return Err(SculptError::geometry("triangle soup is empty"));
    }

    Ok(weld_triangle_soup(soup, WeldOptions::default()).mesh)
}
