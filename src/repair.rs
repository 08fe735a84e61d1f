// src/repair.rs
// UV remapping against a ground-plane bounding box
// Exists to rebuild texture coordinates after terrain geometry is replaced
// RELEVANT FILES:src/proposal.rs,src/mesh/mod.rs,src/region.rs

use glam::Vec2;

use crate::error::{SculptError, SculptResult};
use crate::mesh::MeshBuffers;

/// Recalculate planar UVs for positions local to a reference point.
///
/// The host stores terrain textures mapped over a world-space bounding box.
/// With `offset = ref_point - bbox_min` and the bbox extents as the texture
/// span, each vertex maps to `u = (x + offset_x) / width` and
/// `v = 1 - (y + offset_y) / height`; V flips because texture rows run
/// top-down.
pub fn recalculate_uvs(
    positions: &[[f32; 3]],
    ref_point: Vec2,
    bbox_min: Vec2,
    bbox_max: Vec2,
) -> SculptResult<Vec<[f32; 2]>> {
    let offset = ref_point - bbox_min;
    let extent = bbox_max - bbox_min;
    if extent.x <= 1e-8 || extent.y <= 1e-8 {
        return Err(SculptError::geometry(format!(
            "degenerate UV bounding box: {} x {}",
            extent.x, extent.y
        )));
    }

    Ok(positions
        .iter()
        .map(|p| {
            [
                (p[0] + offset.x) / extent.x,
                1.0 - (p[1] + offset.y) / extent.y,
            ]
        })
        .collect())
}

/// Rewrite a mesh's UV channel in place.
pub fn repair_mesh_uvs(
    mesh: &mut MeshBuffers,
    ref_point: Vec2,
    bbox_min: Vec2,
    bbox_max: Vec2,
) -> SculptResult<()> {
    mesh.uvs = recalculate_uvs(&mesh.positions, ref_point, bbox_min, bbox_max)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_to_uv_corners() {
        // Positions local to the bbox center of a 100x50 box.
        let ref_point = Vec2::new(50.0, 25.0);
        let bbox_min = Vec2::new(0.0, 0.0);
        let bbox_max = Vec2::new(100.0, 50.0);
        let positions = vec![
            [-50.0, -25.0, 0.0],
            [50.0, -25.0, 0.0],
            [50.0, 25.0, 3.0],
            [-50.0, 25.0, 3.0],
        ];

        let uvs = recalculate_uvs(&positions, ref_point, bbox_min, bbox_max).unwrap();
        assert_eq!(uvs[0], [0.0, 1.0]);
        assert_eq!(uvs[1], [1.0, 1.0]);
        assert_eq!(uvs[2], [1.0, 0.0]);
        assert_eq!(uvs[3], [0.0, 0.0]);
    }

    #[test]
    fn elevation_does_not_affect_uvs() {
        let uvs = recalculate_uvs(
            &[[10.0, 10.0, 0.0], [10.0, 10.0, 99.0]],
            Vec2::ZERO,
            Vec2::new(-20.0, -20.0),
            Vec2::new(20.0, 20.0),
        )
        .unwrap();
        assert_eq!(uvs[0], uvs[1]);
    }

    #[test]
    fn positions_outside_bbox_leave_unit_range() {
        let uvs = recalculate_uvs(
            &[[30.0, 0.0, 0.0]],
            Vec2::ZERO,
            Vec2::new(-20.0, -20.0),
            Vec2::new(20.0, 20.0),
        )
        .unwrap();
        assert!(uvs[0][0] > 1.0);
    }

    #[test]
    fn degenerate_bbox_is_an_error() {
        let result = recalculate_uvs(
            &[[0.0; 3]],
            Vec2::ZERO,
            Vec2::new(5.0, 0.0),
            Vec2::new(5.0, 10.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn repair_rewrites_the_uv_channel() {
        let mut mesh = MeshBuffers {
            positions: vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]],
            normals: vec![],
            uvs: vec![[9.0, 9.0]; 3],
            indices: vec![0, 1, 2],
        };
        repair_mesh_uvs(
            &mut mesh,
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 20.0),
        )
        .unwrap();
        assert_eq!(mesh.uvs[0], [0.5, 0.5]);
        assert_eq!(mesh.uvs[1], [1.0, 0.5]);
        assert_eq!(mesh.uvs[2], [0.5, 0.0]);
    }
}
