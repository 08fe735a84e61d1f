// src/deform.rs
// Polygon-masked elevation editing with absolute, re-appliable parameters
// Exists to keep slider scrubbing and vertex drags from accumulating error
// RELEVANT FILES:src/region.rs,src/mesh/mod.rs,src/picking/drag.rs,src/proposal.rs

use std::collections::BTreeMap;

use glam::{Mat3, Vec2, Vec3};
use log::debug;

use crate::error::{SculptError, SculptResult};
use crate::mesh::{recompute_normals, MeshBuffers};
use crate::region::{Polygon2, RegionMask};

/// Target elevation surface interpolated over a selected region.
///
/// `Plane` fits one least-squares plane through the boundary points.
/// `Fan` triangulates the boundary around its centroid and interpolates
/// barycentrically inside each triangle; points no fan triangle covers
/// (concave boundaries) fall back to the fitted plane.
#[derive(Debug, Clone)]
pub struct TargetSurface {
    plane: [f32; 3],
    fan: Vec<FanTriangle>,
}

#[derive(Debug, Clone, Copy)]
struct FanTriangle {
    corners: [Vec2; 3],
    elevations: [f32; 3],
}

impl TargetSurface {
    /// Least-squares plane `z = a*x + b*y + c` through the boundary points.
    pub fn plane_fit(polygon: &Polygon2) -> Self {
        Self {
            plane: fit_plane(polygon.points(), polygon.elevations()),
            fan: Vec::new(),
        }
    }

    /// Centroid-fan triangulation of the boundary with barycentric heights.
    pub fn fan(polygon: &Polygon2) -> Self {
        let (centroid, centroid_z) = polygon.centroid();
        let points = polygon.points();
        let elevations = polygon.elevations();
        let n = points.len();

        let mut fan = Vec::with_capacity(n);
        for i in 0..n {
            let j = (i + 1) % n;
            fan.push(FanTriangle {
                corners: [centroid, points[i], points[j]],
                elevations: [centroid_z, elevations[i], elevations[j]],
            });
        }

        Self {
            plane: fit_plane(points, elevations),
            fan,
        }
    }

    /// Interpolated target elevation at a ground-plane point.
    pub fn height_at(&self, point: Vec2) -> f32 {
        for tri in &self.fan {
            if let Some([w0, w1, w2]) = barycentric(point, tri.corners) {
                return w0 * tri.elevations[0]
                    + w1 * tri.elevations[1]
                    + w2 * tri.elevations[2];
            }
        }
        let [a, b, c] = self.plane;
        a * point.x + b * point.y + c
    }
}

fn fit_plane(points: &[Vec2], elevations: &[f32]) -> [f32; 3] {
    let mut sxx = 0.0f32;
    let mut sxy = 0.0f32;
    let mut syy = 0.0f32;
    let mut sx = 0.0f32;
    let mut sy = 0.0f32;
    let mut sxz = 0.0f32;
    let mut syz = 0.0f32;
    let mut sz = 0.0f32;
    let n = points.len() as f32;

    for (p, &z) in points.iter().zip(elevations) {
        sxx += p.x * p.x;
        sxy += p.x * p.y;
        syy += p.y * p.y;
        sx += p.x;
        sy += p.y;
        sxz += p.x * z;
        syz += p.y * z;
        sz += z;
    }

    // Normal equations for z = a*x + b*y + c; symmetric system.
    let m = Mat3::from_cols(
        Vec3::new(sxx, sxy, sx),
        Vec3::new(sxy, syy, sy),
        Vec3::new(sx, sy, n),
    );

    if m.determinant().abs() < 1e-6 {
        // Collinear boundary: horizontal plane at the mean elevation.
        return [0.0, 0.0, sz / n.max(1.0)];
    }

    let solution = m.inverse() * Vec3::new(sxz, syz, sz);
    [solution.x, solution.y, solution.z]
}

fn barycentric(p: Vec2, [a, b, c]: [Vec2; 3]) -> Option<[f32; 3]> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let den = v0.x * v1.y - v1.x * v0.y;
    if den.abs() < 1e-10 {
        return None;
    }
    let w1 = (v2.x * v1.y - v1.x * v2.y) / den;
    let w2 = (v0.x * v2.y - v2.x * v0.y) / den;
    let w0 = 1.0 - w1 - w2;
    let eps = -1e-5;
    if w0 >= eps && w1 >= eps && w2 >= eps {
        Some([w0, w1, w2])
    } else {
        None
    }
}

/// Absolute deformation parameters, mirroring the panel's sliders.
///
/// Values are targets, not deltas: re-applying the same parameters yields
/// the same mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeformParams {
    /// Uniform elevation offset added across the region.
    pub height_offset: f32,
    /// Displacement along the pristine vertex normals.
    pub normal_amount: f32,
    /// How far to pull region elevations toward the target surface, 0..=1.
    pub flatten_strength: f32,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            height_offset: 0.0,
            normal_amount: 0.0,
            flatten_strength: 0.0,
        }
    }
}

/// A non-accumulating edit over one selected region of a terrain mesh.
///
/// The pristine mesh is snapshotted on construction and every `apply` starts
/// from it, so parameter changes replace each other instead of stacking.
/// Dragged vertices keep their elevation through re-application via
/// per-vertex overrides.
#[derive(Debug, Clone)]
pub struct EditSession {
    base: MeshBuffers,
    current: MeshBuffers,
    mask: RegionMask,
    surface: TargetSurface,
    params: DeformParams,
    overrides: BTreeMap<u32, f32>,
}

impl EditSession {
    pub fn new(
        mesh: MeshBuffers,
        mask: RegionMask,
        surface: TargetSurface,
    ) -> SculptResult<Self> {
        if mask.vertex_count() != mesh.vertex_count() {
            return Err(SculptError::geometry(format!(
                "mask was built for {} vertices, mesh has {}",
                mask.vertex_count(),
                mesh.vertex_count()
            )));
        }
        let mut base = mesh;
        if base.normals.len() != base.positions.len() {
            recompute_normals(&mut base);
        }
        let current = base.clone();
        Ok(Self {
            base,
            current,
            mask,
            surface,
            params: DeformParams::default(),
            overrides: BTreeMap::new(),
        })
    }

    /// The pristine mesh the session was opened with.
    pub fn base(&self) -> &MeshBuffers {
        &self.base
    }

    /// The mesh as of the last `apply`.
    pub fn mesh(&self) -> &MeshBuffers {
        &self.current
    }

    pub fn mask(&self) -> &RegionMask {
        &self.mask
    }

    pub fn params(&self) -> DeformParams {
        self.params
    }

    pub fn set_params(&mut self, params: DeformParams) {
        self.params = params;
    }

    /// Pin a masked vertex to an absolute elevation (vertex dragging).
    pub fn set_override(&mut self, vertex: u32, elevation: f32) -> SculptResult<()> {
        if !self.mask.contains_vertex(vertex) {
            return Err(SculptError::region(format!(
                "vertex {} is outside the selected region",
                vertex
            )));
        }
        if !elevation.is_finite() {
            return Err(SculptError::geometry("override elevation must be finite"));
        }
        self.overrides.insert(vertex, elevation);
        Ok(())
    }

    pub fn clear_override(&mut self, vertex: u32) {
        self.overrides.remove(&vertex);
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    /// Recompute the current mesh from the pristine snapshot.
    ///
    /// Per masked vertex: flatten lerps the base elevation toward the target
    /// surface, the height offset is added, then normal displacement; a drag
    /// override replaces the result, keeping the base ground position.
    /// Vertices outside the mask are left bit-identical to the base.
    pub fn apply(&mut self) -> &MeshBuffers {
        self.current.positions.clone_from(&self.base.positions);
        self.current.uvs.clone_from(&self.base.uvs);
        self.current.indices.clone_from(&self.base.indices);

        let flatten = self.params.flatten_strength.clamp(0.0, 1.0);

        for &idx in self.mask.indices() {
            let i = idx as usize;
            let base = self.base.positions[i];
            let mut z = base[2];

            if flatten > 0.0 {
                let target = self.surface.height_at(Vec2::new(base[0], base[1]));
                z += (target - z) * flatten;
            }
            z += self.params.height_offset;

            let mut pos = [base[0], base[1], z];
            if self.params.normal_amount != 0.0 {
                let n = self.base.normals[i];
                pos[0] += n[0] * self.params.normal_amount;
                pos[1] += n[1] * self.params.normal_amount;
                pos[2] += n[2] * self.params.normal_amount;
            }

            if let Some(&pinned) = self.overrides.get(&idx) {
                pos = [base[0], base[1], pinned];
            }

            self.current.positions[i] = pos;
        }

        recompute_normals(&mut self.current);
        debug!(
            "deform applied: {} masked vertices, {} overrides",
            self.mask.len(),
            self.overrides.len()
        );
        &self.current
    }
}
