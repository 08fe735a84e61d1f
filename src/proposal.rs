// src/proposal.rs
// Replacement-proposal assembly and the host SDK seam
// Exists to move terrain meshes across the embedded-panel boundary
// RELEVANT FILES:src/repair.rs,src/mesh/validate.rs,src/mesh/weld.rs,src/deform.rs

use glam::Vec2;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{SculptError, SculptResult};
use crate::mesh::{self, validate_mesh, MeshBuffers, MeshValidationReport};
use crate::repair::repair_mesh_uvs;

/// Boundary to the embedding host SDK.
///
/// The GUI adapter implements this against the real plugin runtime; the
/// crate only ever talks through it, so everything here stays testable with
/// an in-memory host.
pub trait TerrainHost {
    /// Current terrain geometry as a flat position-only triangle list.
    fn fetch_terrain(&self) -> SculptResult<Vec<f32>>;

    /// Offer a replacement terrain mesh to the host.
    fn submit_proposal(&self, proposal: &ReplacementProposal) -> SculptResult<()>;
}

/// Serializable replacement-terrain payload.
///
/// Flat arrays mirror the host's buffer-attribute layout: positions and
/// normals are xyz triples, UVs are uv pairs, indices are a triangle list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementProposal {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
    pub ref_point: [f32; 2],
    pub bbox_min: [f32; 2],
    pub bbox_max: [f32; 2],
}

impl ReplacementProposal {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Fetch and index the host's terrain.
pub fn import_terrain(host: &dyn TerrainHost) -> SculptResult<MeshBuffers> {
    let soup = host.fetch_terrain()?;
    let mesh = mesh::from_triangle_soup(&soup)?;
    info!(
        "terrain imported: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Assembles replacement proposals from edited meshes.
///
/// Anchored by the terrain's reference point and ground bounding box, both
/// provided by the host alongside the original terrain; UVs are repaired
/// against them so the host's texture survives the geometry swap.
#[derive(Debug, Clone, Copy)]
pub struct ProposalBuilder {
    ref_point: Vec2,
    bbox_min: Vec2,
    bbox_max: Vec2,
}

impl ProposalBuilder {
    pub fn new(ref_point: Vec2, bbox_min: Vec2, bbox_max: Vec2) -> Self {
        Self {
            ref_point,
            bbox_min,
            bbox_max,
        }
    }

    /// Repair UVs, validate, and flatten the mesh into a payload.
    ///
    /// Out-of-bounds indices abort: the host would reject or crash on them.
    /// Degenerate triangles and duplicate vertices are logged and tolerated;
    /// host terrain soups routinely contain both.
    pub fn build(&self, mesh: &MeshBuffers) -> SculptResult<ReplacementProposal> {
        if mesh.is_empty() {
            return Err(SculptError::proposal("refusing to propose an empty mesh"));
        }

        let mut repaired = mesh.clone();
        repair_mesh_uvs(&mut repaired, self.ref_point, self.bbox_min, self.bbox_max)?;

        let report = validate_mesh(&repaired);
        if report.has_fatal_issues() {
            return Err(SculptError::proposal(format!(
                "mesh failed validation: {} issues, first fatal: {:?}",
                report.issues.len(),
                report
                    .issues
                    .iter()
                    .find(|i| matches!(
                        i,
                        crate::mesh::MeshValidationIssue::IndexOutOfBounds { .. }
                    ))
            )));
        }
        log_non_fatal_issues(&report);

        Ok(ReplacementProposal {
            positions: flatten3(&repaired.positions),
            normals: flatten3(&repaired.normals),
            uvs: flatten2(&repaired.uvs),
            indices: repaired.indices.clone(),
            ref_point: self.ref_point.to_array(),
            bbox_min: self.bbox_min.to_array(),
            bbox_max: self.bbox_max.to_array(),
        })
    }

    /// Build and hand the proposal to the host.
    pub fn submit(&self, host: &dyn TerrainHost, mesh: &MeshBuffers) -> SculptResult<()> {
        let proposal = self.build(mesh)?;
        info!(
            "submitting replacement proposal: {} vertices, {} triangles",
            proposal.vertex_count(),
            proposal.triangle_count()
        );
        host.submit_proposal(&proposal)
    }
}

fn log_non_fatal_issues(report: &MeshValidationReport) {
    if !report.issues.is_empty() {
        warn!(
            "proposal mesh has {} non-fatal validation issues",
            report.issues.len()
        );
    }
}

fn flatten3(values: &[[f32; 3]]) -> Vec<f32> {
    values.iter().flat_map(|v| v.iter().copied()).collect()
}

fn flatten2(values: &[[f32; 2]]) -> Vec<f32> {
    values.iter().flat_map(|v| v.iter().copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct MockHost {
        soup: Vec<f32>,
        submitted: RefCell<Vec<ReplacementProposal>>,
    }

    impl MockHost {
        fn new(soup: Vec<f32>) -> Self {
            Self {
                soup,
                submitted: RefCell::new(Vec::new()),
            }
        }
    }

    impl TerrainHost for MockHost {
        fn fetch_terrain(&self) -> SculptResult<Vec<f32>> {
            Ok(self.soup.clone())
        }

        fn submit_proposal(&self, proposal: &ReplacementProposal) -> SculptResult<()> {
            self.submitted.borrow_mut().push(proposal.clone());
            Ok(())
        }
    }

    fn quad_soup() -> Vec<f32> {
        vec![
            0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 10.0, 0.0, //
            10.0, 0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0, 0.0,
        ]
    }

    #[test]
    fn import_welds_host_soup() {
        let host = MockHost::new(quad_soup());
        let mesh = import_terrain(&host).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn build_repairs_uvs_and_flattens() {
        let host = MockHost::new(quad_soup());
        let mesh = import_terrain(&host).unwrap();

        let builder = ProposalBuilder::new(
            Vec2::ZERO,
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
        );
        let proposal = builder.build(&mesh).unwrap();

        assert_eq!(proposal.vertex_count(), 4);
        assert_eq!(proposal.uvs.len(), 8);
        assert_eq!(proposal.normals.len(), 12);

        // Vertex at the bbox min corner maps to (0, 1).
        let origin = mesh
            .positions
            .iter()
            .position(|p| p[0] == 0.0 && p[1] == 0.0)
            .unwrap();
        assert_eq!(proposal.uvs[origin * 2], 0.0);
        assert_eq!(proposal.uvs[origin * 2 + 1], 1.0);
    }

    #[test]
    fn fatal_validation_aborts_build() {
        let mesh = MeshBuffers {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![],
            uvs: vec![],
            indices: vec![0, 1, 9],
        };
        let builder = ProposalBuilder::new(
            Vec2::ZERO,
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
        );
        assert!(builder.build(&mesh).is_err());
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let builder = ProposalBuilder::new(
            Vec2::ZERO,
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
        );
        assert!(builder.build(&MeshBuffers::default()).is_err());
    }

    #[test]
    fn submit_round_trips_through_the_host() {
        let host = MockHost::new(quad_soup());
        let mesh = import_terrain(&host).unwrap();
        let builder = ProposalBuilder::new(
            Vec2::ZERO,
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
        );
        builder.submit(&host, &mesh).unwrap();

        let submitted = host.submitted.borrow();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].triangle_count(), 2);

        // Payload survives the host's JSON transport.
        let json = serde_json::to_string(&submitted[0]).unwrap();
        let back: ReplacementProposal = serde_json::from_str(&json).unwrap();
        assert_eq!(back.positions, submitted[0].positions);
        assert_eq!(back.ref_point, [0.0, 0.0]);
    }
}
