// src/mesh/weld.rs
// Vertex welding for host triangle soups and indexed meshes
// Exists to guarantee shared topology before editing and proposal submission
// RELEVANT FILES:src/mesh/mod.rs,src/mesh/validate.rs,src/proposal.rs

use std::collections::BTreeMap;

use log::debug;

use super::{recompute_normals, MeshBuffers};

/// Options controlling the weld process.
#[derive(Debug, Clone, Copy)]
pub struct WeldOptions {
    pub position_epsilon: f32,
    pub uv_epsilon: f32,
}

impl Default for WeldOptions {
    fn default() -> Self {
        Self {
            position_epsilon: 1e-5,
            uv_epsilon: 1e-4,
        }
    }
}

/// Result from a weld operation including remapping information.
#[derive(Debug, Clone)]
pub struct WeldResult {
    pub mesh: MeshBuffers,
    /// Old vertex index -> new vertex index.
    pub remap: Vec<u32>,
    /// How many input vertices were merged away.
    pub collapsed: usize,
}

/// Weld a position-only triangle soup into an indexed mesh.
///
/// The input is a flat `[x0, y0, z0, x1, ...]` triangle list, three corners
/// per triangle. Trailing floats that do not form a full triangle are
/// ignored.
pub fn weld_triangle_soup(soup: &[f32], options: WeldOptions) -> WeldResult {
    let corner_count = soup.len() / 9 * 3;
    let mut expanded = MeshBuffers::with_capacity(corner_count, corner_count);
    for corner in soup.chunks_exact(3).take(corner_count) {
        expanded.positions.push([corner[0], corner[1], corner[2]]);
    }
    expanded.indices = (0..corner_count as u32).collect();
    weld_mesh(&expanded, options)
}

/// Weld an indexed mesh based on positional tolerance.
///
/// Vertices whose quantized positions coincide are merged; matching UVs are
/// averaged. Triangles that collapse under the merge are dropped, and vertex
/// normals are recomputed for the welded topology.
pub fn weld_mesh(mesh: &MeshBuffers, options: WeldOptions) -> WeldResult {
    if mesh.positions.is_empty() {
        return WeldResult {
            mesh: MeshBuffers::default(),
            remap: Vec::new(),
            collapsed: 0,
        };
    }

    let vertex_count = mesh.vertex_count();
    let has_uvs = mesh.uvs.len() == vertex_count;

    let mut key_map: BTreeMap<(i64, i64, i64), Vec<usize>> = BTreeMap::new();
    let mut welded = MeshBuffers::with_capacity(vertex_count, mesh.indices.len());
    let mut remap = vec![0u32; vertex_count];
    let mut accum_uv: Vec<[f32; 2]> = Vec::new();
    let mut counts: Vec<f32> = Vec::new();

    for (idx, position) in mesh.positions.iter().enumerate() {
        let key = quantize_position(*position, options.position_epsilon);
        let uv_value = if has_uvs { Some(mesh.uvs[idx]) } else { None };

        let candidates = key_map.entry(key).or_default();
        let mut matched: Option<usize> = None;
        if has_uvs {
            if let Some(uv) = uv_value {
                for &candidate in candidates.iter() {
                    let ref_uv = welded.uvs[candidate];
                    if (ref_uv[0] - uv[0]).abs() <= options.uv_epsilon
                        && (ref_uv[1] - uv[1]).abs() <= options.uv_epsilon
                    {
                        matched = Some(candidate);
                        break;
                    }
                }
            }
        } else {
            matched = candidates.first().copied();
        }

        match matched {
            Some(existing) => {
                remap[idx] = existing as u32;
                if let Some(uv) = uv_value {
                    accum_uv[existing][0] += uv[0];
                    accum_uv[existing][1] += uv[1];
                }
                counts[existing] += 1.0;
            }
            None => {
                let new_index = welded.positions.len();
                welded.positions.push(*position);
                let uv_record = uv_value.unwrap_or([0.0, 0.0]);
                welded.uvs.push(uv_record);
                candidates.push(new_index);
                remap[idx] = new_index as u32;
                accum_uv.push(uv_record);
                counts.push(1.0);
            }
        }
    }

    for (i, uv) in welded.uvs.iter_mut().enumerate() {
        if counts[i] > 0.0 {
            uv[0] = accum_uv[i][0] / counts[i];
            uv[1] = accum_uv[i][1] / counts[i];
        }
    }
    if !has_uvs {
        welded.uvs.clear();
    }

    let mut remapped_indices = Vec::with_capacity(mesh.indices.len());
    for tri in mesh.indices.chunks_exact(3) {
        let a = remap[tri[0] as usize];
        let b = remap[tri[1] as usize];
        let c = remap[tri[2] as usize];
        if a == b || b == c || a == c {
            continue;
        }
        remapped_indices.extend_from_slice(&[a, b, c]);
    }
    welded.indices = remapped_indices;

    recompute_normals(&mut welded);

    let collapsed = vertex_count.saturating_sub(welded.vertex_count());
    debug!(
        "weld: {} -> {} vertices ({} collapsed), {} triangles",
        vertex_count,
        welded.vertex_count(),
        collapsed,
        welded.triangle_count()
    );

    WeldResult {
        mesh: welded,
        remap,
        collapsed,
    }
}

fn quantize_position(position: [f32; 3], eps: f32) -> (i64, i64, i64) {
    (
        quantize_scalar(position[0], eps),
        quantize_scalar(position[1], eps),
        quantize_scalar(position[2], eps),
    )
}

fn quantize_scalar(value: f32, eps: f32) -> i64 {
    (value / eps).round() as i64
}
