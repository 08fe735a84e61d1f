// src/heightfield.rs
// Raster elevation sources and grid mesh generation
// Exists to turn heightmap images into editable terrain meshes
// RELEVANT FILES:src/mesh/mod.rs,src/deform.rs,src/proposal.rs

use log::debug;

use crate::error::{SculptError, SculptResult};
use crate::mesh::{recompute_normals, MeshBuffers};

/// Row-major grid of elevation samples.
///
/// Row 0 is the top edge of the source raster; `to_mesh` maps rows to
/// decreasing Y so the image reads upright on the terrain.
#[derive(Debug, Clone)]
pub struct Heightfield {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl Heightfield {
    /// Wrap raw samples. Non-finite samples are zeroed.
    pub fn new(width: usize, height: usize, mut samples: Vec<f32>) -> SculptResult<Self> {
        if width < 2 || height < 2 {
            return Err(SculptError::heightmap(format!(
                "heightfield must be at least 2x2, got {}x{}",
                width, height
            )));
        }
        if samples.len() != width * height {
            return Err(SculptError::heightmap(format!(
                "expected {} samples for {}x{}, got {}",
                width * height,
                width,
                height,
                samples.len()
            )));
        }
        for s in &mut samples {
            if !s.is_finite() {
                *s = 0.0;
            }
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Decode RGBA8 pixels into elevations.
    ///
    /// Elevation is `(900 - (r + g + b)) * 0.02`: dark pixels are high
    /// ground, white is slightly below zero.
    pub fn from_rgba8(pixels: &[u8], width: usize, height: usize) -> SculptResult<Self> {
        if pixels.len() != width * height * 4 {
            return Err(SculptError::heightmap(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                width * height * 4,
                width,
                height,
                pixels.len()
            )));
        }
        let samples = pixels
            .chunks_exact(4)
            .map(|px| {
                let sum = px[0] as f32 + px[1] as f32 + px[2] as f32;
                (900.0 - sum) * 0.02
            })
            .collect();
        Self::new(width, height, samples)
    }

    /// Decode an encoded PNG/JPEG heightmap.
    pub fn from_image_bytes(bytes: &[u8]) -> SculptResult<Self> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| SculptError::heightmap(format!("image decode failed: {}", e)))?;
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();
        debug!("heightmap image decoded: {}x{}", w, h);
        Self::from_rgba8(rgba.as_raw(), w as usize, h as usize)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at integer coordinates, clamped to the grid.
    pub fn sample(&self, col: usize, row: usize) -> f32 {
        let c = col.min(self.width - 1);
        let r = row.min(self.height - 1);
        self.samples[r * self.width + c]
    }

    /// Bilinear sample with `u`/`v` in [0, 1], clamped at the edges.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> f32 {
        let uu = u.clamp(0.0, 1.0) * (self.width - 1) as f32;
        let vv = v.clamp(0.0, 1.0) * (self.height - 1) as f32;
        let x0 = uu.floor() as usize;
        let y0 = vv.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = uu - x0 as f32;
        let ty = vv - y0 as f32;
        let h00 = self.samples[y0 * self.width + x0];
        let h10 = self.samples[y0 * self.width + x1];
        let h01 = self.samples[y1 * self.width + x0];
        let h11 = self.samples[y1 * self.width + x1];
        let a = h00 * (1.0 - tx) + h10 * tx;
        let b = h01 * (1.0 - tx) + h11 * tx;
        a * (1.0 - ty) + b * ty
    }

    /// Tessellate into a centered grid mesh, one vertex per sample.
    ///
    /// The grid spans `[-extent_x/2, extent_x/2] x [-extent_y/2, extent_y/2]`
    /// with Z taken from the samples. Winding is CCW viewed from +Z; UVs run
    /// `u` left-to-right and `v` top-down like the source raster.
    pub fn to_mesh(&self, extent_x: f32, extent_y: f32) -> SculptResult<MeshBuffers> {
        if !(extent_x > 0.0) || !(extent_y > 0.0) {
            return Err(SculptError::heightmap("mesh extents must be positive"));
        }

        let nx = self.width;
        let ny = self.height;
        let vertex_count = nx * ny;
        let index_count = (nx - 1) * (ny - 1) * 6;
        let mut mesh = MeshBuffers::with_capacity(vertex_count, index_count);

        for row in 0..ny {
            let v = row as f32 / (ny - 1) as f32;
            // Top raster row lands at +Y.
            let y = (0.5 - v) * extent_y;
            for col in 0..nx {
                let u = col as f32 / (nx - 1) as f32;
                let x = (u - 0.5) * extent_x;
                mesh.positions.push([x, y, self.sample(col, row)]);
                mesh.uvs.push([u, v]);
            }
        }

        for row in 0..ny - 1 {
            for col in 0..nx - 1 {
                let a = (row * nx + col) as u32;
                let b = a + 1;
                let c = a + nx as u32;
                let d = c + 1;
                // Rows advance toward -Y, so (a, c, b)/(b, c, d) is CCW from +Z.
                mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        recompute_normals(&mut mesh);
        Ok(mesh)
    }
}
