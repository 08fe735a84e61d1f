// src/picking/drag.rs
// Vertex drag sessions mapping pointer rays to absolute elevations
// Exists to drive per-vertex overrides in an edit session
// RELEVANT FILES:src/picking/mesh_ray.rs,src/deform.rs,src/region.rs

use glam::Vec2;
use log::debug;

use super::mesh_ray::pick_vertex;
use super::ray::Ray;
use crate::deform::EditSession;
use crate::error::SculptResult;

/// Limits for a drag interaction.
#[derive(Debug, Clone, Copy)]
pub struct DragConfig {
    /// How close (world units) the surface hit must be to a vertex to grab it.
    pub snap_radius: f32,
    /// Lowest elevation a drag may produce.
    pub min_elevation: f32,
    /// Highest elevation a drag may produce.
    pub max_elevation: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            snap_radius: 2.0,
            min_elevation: -500.0,
            max_elevation: 500.0,
        }
    }
}

/// An in-progress vertical drag of one terrain vertex.
///
/// The grabbed vertex keeps its ground position; every pointer update solves
/// the closest point between the new cursor ray and the vertical axis
/// through the vertex, which becomes the vertex's absolute elevation.
#[derive(Debug, Clone, Copy)]
pub struct DragSession {
    vertex: u32,
    axis_origin: Vec2,
    elevation: f32,
    config: DragConfig,
}

impl DragSession {
    /// Grab the vertex under the cursor, if any.
    ///
    /// Picking is restricted to the session's region mask; terrain outside
    /// the selection is not draggable.
    pub fn begin(session: &EditSession, ray: &Ray, config: DragConfig) -> Option<Self> {
        let pick = pick_vertex(session.mesh(), ray, Some(session.mask()), config.snap_radius)?;
        debug!(
            "drag begin: vertex {} at ({}, {}, {})",
            pick.vertex, pick.position.x, pick.position.y, pick.position.z
        );
        Some(Self {
            vertex: pick.vertex,
            axis_origin: Vec2::new(pick.position.x, pick.position.y),
            elevation: pick.position.z,
            config,
        })
    }

    pub fn vertex(&self) -> u32 {
        self.vertex
    }

    /// Elevation as of the last update.
    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Re-solve the elevation for a new cursor ray.
    ///
    /// Closest point between the ray and the vertical axis through the
    /// grabbed vertex. A ray parallel to the axis keeps the previous
    /// elevation.
    pub fn update(&mut self, ray: &Ray) -> f32 {
        // Line 1: the ray. Line 2: the axis, origin (x, y, 0), direction +Z.
        let w0 = glam::Vec3::new(
            ray.origin.x - self.axis_origin.x,
            ray.origin.y - self.axis_origin.y,
            ray.origin.z,
        );
        let b = ray.direction.z;
        let denom = 1.0 - b * b;
        if denom.abs() < 1e-8 {
            return self.elevation;
        }

        let d = ray.direction.dot(w0);
        let e = w0.z;
        let axis_t = (e - b * d) / denom;

        self.elevation = axis_t.clamp(self.config.min_elevation, self.config.max_elevation);
        self.elevation
    }

    /// Write the current elevation into the edit session as an override.
    pub fn commit(&self, session: &mut EditSession) -> SculptResult<()> {
        session.set_override(self.vertex, self.elevation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deform::{EditSession, TargetSurface};
    use crate::heightfield::Heightfield;
    use crate::region::{Polygon2, RegionMask};
    use glam::Vec3;

    fn make_session() -> EditSession {
        let hf = Heightfield::new(5, 5, vec![0.0; 25]).unwrap();
        let mesh = hf.to_mesh(40.0, 40.0).unwrap();
        let polygon = Polygon2::from_world_points(&[
            [-15.0, -15.0, 0.0],
            [15.0, -15.0, 0.0],
            [15.0, 15.0, 0.0],
            [-15.0, 15.0, 0.0],
        ])
        .unwrap();
        let mask = RegionMask::build(&mesh, &polygon);
        EditSession::new(mesh, mask, TargetSurface::plane_fit(&polygon)).unwrap()
    }

    #[test]
    fn grab_update_commit_moves_the_vertex() {
        let mut session = make_session();
        let grab = Ray::new(Vec3::new(10.2, 10.2, 50.0), Vec3::NEG_Z);
        let mut drag = DragSession::begin(&session, &grab, DragConfig::default()).unwrap();
        assert_eq!(drag.elevation(), 0.0);

        // A ray passing horizontally through (10, 10, 7) pins z = 7.
        let update = Ray::new(Vec3::new(-100.0, 10.0, 7.0), Vec3::X);
        let z = drag.update(&update);
        assert!((z - 7.0).abs() < 1e-3);

        drag.commit(&mut session).unwrap();
        session.apply();
        let moved = session.mesh().positions[drag.vertex() as usize];
        assert_eq!(moved[0], 10.0);
        assert_eq!(moved[1], 10.0);
        assert!((moved[2] - 7.0).abs() < 1e-3);
    }

    #[test]
    fn axis_parallel_ray_keeps_previous_elevation() {
        let session = make_session();
        let grab = Ray::new(Vec3::new(0.1, 0.1, 50.0), Vec3::NEG_Z);
        let mut drag = DragSession::begin(&session, &grab, DragConfig::default()).unwrap();

        let before = drag.elevation();
        let vertical = Ray::new(Vec3::new(3.0, 3.0, 50.0), Vec3::NEG_Z);
        assert_eq!(drag.update(&vertical), before);
    }

    #[test]
    fn elevation_is_clamped_to_config() {
        let session = make_session();
        let grab = Ray::new(Vec3::new(0.1, 0.1, 50.0), Vec3::NEG_Z);
        let config = DragConfig {
            max_elevation: 5.0,
            ..Default::default()
        };
        let mut drag = DragSession::begin(&session, &grab, config).unwrap();

        let update = Ray::new(Vec3::new(-100.0, 0.0, 80.0), Vec3::X);
        assert!((drag.update(&update) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn grab_outside_region_fails() {
        let session = make_session();
        // (20, 20) is a corner of the terrain but outside the polygon.
        let ray = Ray::new(Vec3::new(19.9, 19.9, 50.0), Vec3::NEG_Z);
        assert!(DragSession::begin(&session, &ray, DragConfig::default()).is_none());
    }
}
