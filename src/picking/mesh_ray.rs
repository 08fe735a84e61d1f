// src/picking/mesh_ray.rs
// Ray/triangle intersection and snap-radius vertex picking
// Exists to find the vertex a pointer grab should drag
// RELEVANT FILES:src/picking/ray.rs,src/picking/drag.rs,src/region.rs

use glam::Vec3;

use super::ray::Ray;
use crate::mesh::MeshBuffers;
use crate::region::RegionMask;

const EPSILON: f32 = 1e-7;

/// Nearest intersection between a ray and a mesh.
#[derive(Debug, Clone, Copy)]
pub struct MeshHit {
    /// World position of the hit.
    pub position: Vec3,
    /// Distance along the ray.
    pub t: f32,
    /// Index of the hit triangle.
    pub triangle: usize,
    /// Barycentric weights of the hit within the triangle.
    pub barycentric: [f32; 3],
}

/// A vertex grabbed for dragging.
#[derive(Debug, Clone, Copy)]
pub struct VertexPick {
    pub vertex: u32,
    pub position: Vec3,
    /// Distance from the surface hit to the picked vertex.
    pub distance: f32,
}

/// Scan all triangles for the nearest front-face intersection.
///
/// Moller-Trumbore with backface culling; terrain is viewed from above, so
/// a backface grab would drag a vertex the user cannot see.
pub fn intersect_mesh(mesh: &MeshBuffers, ray: &Ray) -> Option<MeshHit> {
    let mut nearest: Option<MeshHit> = None;

    for (triangle, tri) in mesh.indices.chunks_exact(3).enumerate() {
        let a = Vec3::from_array(mesh.positions[tri[0] as usize]);
        let b = Vec3::from_array(mesh.positions[tri[1] as usize]);
        let c = Vec3::from_array(mesh.positions[tri[2] as usize]);

        let edge1 = b - a;
        let edge2 = c - a;
        let pvec = ray.direction.cross(edge2);
        let det = edge1.dot(pvec);
        // det <= 0 is a backface or a parallel ray.
        if det < EPSILON {
            continue;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin - a;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            continue;
        }
        let qvec = tvec.cross(edge1);
        let v = ray.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            continue;
        }
        let t = edge2.dot(qvec) * inv_det;
        if t <= EPSILON {
            continue;
        }

        if nearest.map_or(true, |hit| t < hit.t) {
            nearest = Some(MeshHit {
                position: ray.point_at(t),
                t,
                triangle,
                barycentric: [1.0 - u - v, u, v],
            });
        }
    }

    nearest
}

/// Pick the draggable vertex nearest to where a ray hits the mesh.
///
/// Only corners of the hit triangle are candidates, restricted to `mask`
/// when given, and the winner must lie within `snap_radius` of the hit.
pub fn pick_vertex(
    mesh: &MeshBuffers,
    ray: &Ray,
    mask: Option<&RegionMask>,
    snap_radius: f32,
) -> Option<VertexPick> {
    let hit = intersect_mesh(mesh, ray)?;
    let corners = &mesh.indices[hit.triangle * 3..hit.triangle * 3 + 3];

    let mut best: Option<VertexPick> = None;
    for &vertex in corners {
        if let Some(mask) = mask {
            if !mask.contains_vertex(vertex) {
                continue;
            }
        }
        let position = Vec3::from_array(mesh.positions[vertex as usize]);
        let distance = position.distance(hit.position);
        if distance > snap_radius {
            continue;
        }
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(VertexPick {
                vertex,
                position,
                distance,
            });
        }
    }

    best
}
