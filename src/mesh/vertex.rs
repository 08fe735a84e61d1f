//! Interleaved vertex layout for preview buffer upload.
//!
//! The embedding layer re-uploads the edited mesh to its scene every time a
//! slider moves, so the layout is fixed here once instead of being rebuilt
//! from separate attribute arrays at every upload.

use bytemuck::{Pod, Zeroable};

use super::MeshBuffers;

/// Interleaved position/normal/uv vertex, tightly packed for direct upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PackedVertex {
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
    pub uv: [f32; 2],
}

/// Interleave a mesh into `PackedVertex` records.
///
/// Missing normals default to +Z and missing UVs to the origin, so a mesh is
/// uploadable at any point of the edit pipeline.
pub fn interleave(mesh: &MeshBuffers) -> Vec<PackedVertex> {
    let has_normals = mesh.normals.len() == mesh.positions.len();
    let has_uvs = mesh.uvs.len() == mesh.positions.len();

    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &pos)| PackedVertex {
            pos,
            nrm: if has_normals {
                mesh.normals[i]
            } else {
                [0.0, 0.0, 1.0]
            },
            uv: if has_uvs { mesh.uvs[i] } else { [0.0, 0.0] },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<PackedVertex>(), 8 * 4);
    }

    #[test]
    fn interleave_fills_missing_attributes() {
        let mesh = MeshBuffers {
            positions: vec![[1.0, 2.0, 3.0]],
            normals: vec![],
            uvs: vec![],
            indices: vec![],
        };
        let packed = interleave(&mesh);
        assert_eq!(packed.len(), 1);
        assert_eq!(packed[0].pos, [1.0, 2.0, 3.0]);
        assert_eq!(packed[0].nrm, [0.0, 0.0, 1.0]);
        assert_eq!(packed[0].uv, [0.0, 0.0]);
    }
}
