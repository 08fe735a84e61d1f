//! Wavefront OBJ writer for inspecting proposal meshes outside the host.
//!
//! Emits a minimal OBJ with v/vt/vn/f records.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SculptResult;
use crate::mesh::MeshBuffers;

pub fn export_obj_to_path<P: AsRef<Path>>(path: P, mesh: &MeshBuffers) -> SculptResult<()> {
    let file = File::create(path.as_ref())?;
    let mut w = BufWriter::new(file);

    for p in &mesh.positions {
        writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
    }

    if !mesh.uvs.is_empty() {
        for t in &mesh.uvs {
            writeln!(w, "vt {} {}", t[0], t[1])?;
        }
    }

    if !mesh.normals.is_empty() {
        for n in &mesh.normals {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
        }
    }

    let has_uv = !mesh.uvs.is_empty();
    let has_n = !mesh.normals.is_empty();

    for tri in mesh.indices.chunks_exact(3) {
        let to_one = |i: u32| (i + 1) as usize; // 1-based
        let v0 = to_one(tri[0]);
        let v1 = to_one(tri[1]);
        let v2 = to_one(tri[2]);

        let face = if has_uv && has_n {
            format!(
                "f {}/{}/{} {}/{}/{} {}/{}/{}",
                v0, v0, v0, v1, v1, v1, v2, v2, v2
            )
        } else if has_uv {
            format!("f {}/{} {}/{} {}/{}", v0, v0, v1, v1, v2, v2)
        } else if has_n {
            format!("f {}//{} {}//{} {}//{}", v0, v0, v1, v1, v2, v2)
        } else {
            format!("f {} {} {}", v0, v1, v2)
        };

        writeln!(w, "{}", face)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_positions_uvs_normals_and_faces() {
        let mesh = MeshBuffers {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            indices: vec![0, 1, 2],
        };

        let dir = std::env::temp_dir();
        let path = dir.join("terrasculpt_obj_write_test.obj");
        export_obj_to_path(&path, &mesh).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 3);
        assert!(text.contains("f 1/1/1 2/2/2 3/3/3"));
    }
}
