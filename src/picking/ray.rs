// src/picking/ray.rs
// Ray unprojection utilities for cursor picking
// Exists to turn pointer positions into world-space rays
// RELEVANT FILES:src/picking/mesh_ray.rs,src/picking/drag.rs

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

/// A ray in 3D space defined by an origin and a unit direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point along the ray at parameter `t`.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Unproject a screen coordinate to a world-space ray.
///
/// `screen_x`/`screen_y` are pixels with the origin at the top-left;
/// `view_proj` is the camera's combined view-projection matrix. Returns
/// `None` for a singular matrix or a degenerate viewport.
pub fn unproject_cursor(
    screen_x: f32,
    screen_y: f32,
    screen_width: f32,
    screen_height: f32,
    view_proj: Mat4,
) -> Option<Ray> {
    if screen_width <= 0.0 || screen_height <= 0.0 {
        return None;
    }
    if view_proj.determinant().abs() < 1e-12 {
        return None;
    }
    let inv = view_proj.inverse();

    let ndc_x = 2.0 * screen_x / screen_width - 1.0;
    let ndc_y = 1.0 - 2.0 * screen_y / screen_height; // Y is flipped

    let near = project_through(inv, Vec4::new(ndc_x, ndc_y, 0.0, 1.0))?;
    let far = project_through(inv, Vec4::new(ndc_x, ndc_y, 1.0, 1.0))?;

    let direction = far - near;
    if direction.length_squared() < 1e-12 {
        return None;
    }
    Some(Ray::new(near, direction))
}

fn project_through(inv: Mat4, ndc: Vec4) -> Option<Vec3> {
    let world = inv * ndc;
    if world.w.abs() < 1e-10 {
        return None;
    }
    Some(world.xyz() / world.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_point_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let point = ray.point_at(5.0);
        assert!((point.x - 5.0).abs() < 1e-6);
        assert!(point.y.abs() < 1e-6);
        assert!(point.z.abs() < 1e-6);
    }

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn center_pixel_unprojects_down_the_view_axis() {
        // Camera at +100 Z looking straight down at the ground plane.
        let view = Mat4::look_at_rh(
            Vec3::new(0.0, 0.0, 100.0),
            Vec3::ZERO,
            Vec3::Y,
        );
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 1000.0);
        let ray = unproject_cursor(400.0, 300.0, 800.0, 600.0, proj * view).unwrap();

        assert!(ray.direction.z < -0.99);
        assert!(ray.origin.x.abs() < 1e-2 && ray.origin.y.abs() < 1e-2);
    }

    #[test]
    fn degenerate_viewport_is_rejected() {
        assert!(unproject_cursor(0.0, 0.0, 0.0, 600.0, Mat4::IDENTITY).is_none());
    }
}
