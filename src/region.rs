// src/region.rs
// Polygon region selection and vertex masking over terrain meshes
// Exists to decide which vertices an edit may touch
// RELEVANT FILES:src/deform.rs,src/picking/mod.rs,src/repair.rs

use glam::Vec2;
use log::debug;

use crate::error::{SculptError, SculptResult};
use crate::mesh::MeshBuffers;

/// Closed polygon in the terrain's ground plane.
///
/// Built from the host design tool's 3D polyline; the per-point elevations
/// are kept so a target surface can be fitted through the selection boundary.
#[derive(Debug, Clone)]
pub struct Polygon2 {
    points: Vec<Vec2>,
    elevations: Vec<f32>,
    bbox_min: Vec2,
    bbox_max: Vec2,
}

impl Polygon2 {
    /// Build from world-space polyline points (Z up).
    ///
    /// A trailing point that repeats the first is dropped, as are consecutive
    /// duplicates. At least 3 distinct points must remain.
    pub fn from_world_points(world: &[[f32; 3]]) -> SculptResult<Self> {
        let mut points: Vec<Vec2> = Vec::with_capacity(world.len());
        let mut elevations: Vec<f32> = Vec::with_capacity(world.len());

        for p in world {
            let xy = Vec2::new(p[0], p[1]);
            if let Some(&last) = points.last() {
                if last.abs_diff_eq(xy, 1e-6) {
                    continue;
                }
            }
            points.push(xy);
            elevations.push(p[2]);
        }

        if points.len() > 1 && points[0].abs_diff_eq(points[points.len() - 1], 1e-6) {
            points.pop();
            elevations.pop();
        }

        if points.len() < 3 {
            return Err(SculptError::region(format!(
                "polygon needs at least 3 distinct points, got {}",
                points.len()
            )));
        }

        let (bbox_min, bbox_max) = bbox_of(&points);
        Ok(Self {
            points,
            elevations,
            bbox_min,
            bbox_max,
        })
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn elevations(&self) -> &[f32] {
        &self.elevations
    }

    pub fn bbox(&self) -> (Vec2, Vec2) {
        (self.bbox_min, self.bbox_max)
    }

    /// Signed area via the shoelace formula; positive for CCW rings.
    pub fn signed_area(&self) -> f32 {
        let n = self.points.len();
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum * 0.5
    }

    /// Boundary centroid and mean boundary elevation.
    pub fn centroid(&self) -> (Vec2, f32) {
        let n = self.points.len() as f32;
        let xy = self.points.iter().copied().sum::<Vec2>() / n;
        let z = self.elevations.iter().copied().sum::<f32>() / n;
        (xy, z)
    }

    /// Even-odd point-in-polygon test (ray casting).
    pub fn contains(&self, point: Vec2) -> bool {
        if point.x < self.bbox_min.x
            || point.x > self.bbox_max.x
            || point.y < self.bbox_min.y
            || point.y > self.bbox_max.y
        {
            return false;
        }

        let n = self.points.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            if ((pi.y > point.y) != (pj.y > point.y))
                && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Douglas-Peucker simplification of an oversampled boundary.
    ///
    /// Elevations travel with their points. The ring is split at its first
    /// point for the recursion, which is exact enough for host polylines.
    pub fn simplified(&self, epsilon: f32) -> Self {
        if self.points.len() <= 4 || epsilon <= 0.0 {
            return self.clone();
        }

        let order: Vec<usize> = (0..self.points.len()).collect();
        let kept = douglas_peucker(&self.points, &order, epsilon);
        if kept.len() < 3 {
            return self.clone();
        }

        let points: Vec<Vec2> = kept.iter().map(|&i| self.points[i]).collect();
        let elevations: Vec<f32> = kept.iter().map(|&i| self.elevations[i]).collect();
        let (bbox_min, bbox_max) = bbox_of(&points);
        Self {
            points,
            elevations,
            bbox_min,
            bbox_max,
        }
    }
}

fn bbox_of(points: &[Vec2]) -> (Vec2, Vec2) {
    let mut min = points[0];
    let mut max = points[0];
    for &p in points.iter().skip(1) {
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

fn douglas_peucker(points: &[Vec2], order: &[usize], epsilon: f32) -> Vec<usize> {
    if order.len() < 3 {
        return order.to_vec();
    }

    let first = points[order[0]];
    let last = points[order[order.len() - 1]];

    let mut max_dist = 0.0f32;
    let mut max_at = 0usize;
    for (k, &idx) in order.iter().enumerate().skip(1).take(order.len() - 2) {
        let dist = perpendicular_distance(points[idx], first, last);
        if dist > max_dist {
            max_dist = dist;
            max_at = k;
        }
    }

    if max_dist > epsilon {
        let mut left = douglas_peucker(points, &order[..=max_at], epsilon);
        let right = douglas_peucker(points, &order[max_at..], epsilon);
        left.pop();
        left.extend(right);
        left
    } else {
        vec![order[0], order[order.len() - 1]]
    }
}

fn perpendicular_distance(point: Vec2, line_start: Vec2, line_end: Vec2) -> f32 {
    let d = line_end - line_start;
    let len_sq = d.length_squared();
    if len_sq < 1e-10 {
        return (point - line_start).length();
    }
    (d.y * point.x - d.x * point.y + line_end.x * line_start.y - line_end.y * line_start.x).abs()
        / len_sq.sqrt()
}

/// Vertices of a mesh that fall inside a polygon region.
#[derive(Debug, Clone)]
pub struct RegionMask {
    indices: Vec<u32>,
    vertex_count: usize,
}

impl RegionMask {
    /// Test every vertex's XY projection against the polygon.
    pub fn build(mesh: &MeshBuffers, polygon: &Polygon2) -> Self {
        let indices: Vec<u32> = mesh
            .positions
            .iter()
            .enumerate()
            .filter(|(_, p)| polygon.contains(Vec2::new(p[0], p[1])))
            .map(|(i, _)| i as u32)
            .collect();

        debug!(
            "region mask: {} of {} vertices selected",
            indices.len(),
            mesh.vertex_count()
        );

        Self {
            indices,
            vertex_count: mesh.vertex_count(),
        }
    }

    /// Masked vertex indices in ascending order.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex count of the mesh the mask was built against.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains_vertex(&self, vertex: u32) -> bool {
        self.indices.binary_search(&vertex).is_ok()
    }
}
