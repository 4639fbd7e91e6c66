//! Terrain surface mesh: a regular grid displaced by the heightfield.

use glam::Vec3;

use crate::heightfield::Heightfield;

/// Largest grid whose `(n + 1)²` vertices are addressable by `u32` indices.
pub const MAX_SUBDIVISIONS: u32 = 65_534;

/// Indexed triangle mesh of the terrain surface, ready for GPU upload.
///
/// Vertices are laid out row-major with `z` as the outer loop and `x` as the
/// inner loop, both running from `-size/2` to `+size/2`.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    subdivisions: u32,
    size: f64,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl TerrainMesh {
    /// Build a `subdivisions × subdivisions` cell grid spanning `size` units
    /// and lift every vertex to the heightfield.
    ///
    /// # Panics
    ///
    /// Panics if `subdivisions` is zero or above [`MAX_SUBDIVISIONS`], or
    /// `size` is not positive and finite.
    pub fn build(heightfield: &Heightfield, size: f64, subdivisions: u32) -> Self {
        assert!(subdivisions > 0, "subdivisions must be positive");
        assert!(
            subdivisions <= MAX_SUBDIVISIONS,
            "subdivisions must be at most {MAX_SUBDIVISIONS}, got {subdivisions}"
        );
        assert!(
            size > 0.0 && size.is_finite(),
            "size must be positive and finite, got {size}"
        );

        let row = subdivisions as usize + 1;
        let half = size / 2.0;
        let step = size / f64::from(subdivisions);

        let mut positions = Vec::with_capacity(row * row);
        for iz in 0..row {
            let z = iz as f64 * step - half;
            for ix in 0..row {
                let x = ix as f64 * step - half;
                let y = heightfield.height(x, z);
                positions.push([x as f32, y as f32, z as f32]);
            }
        }

        let cells = subdivisions as usize;
        let mut indices = Vec::with_capacity(cells * cells * 6);
        let stride = row as u32;
        for iz in 0..subdivisions {
            for ix in 0..subdivisions {
                let a = iz * stride + ix;
                let b = (iz + 1) * stride + ix;
                let c = (iz + 1) * stride + ix + 1;
                let d = iz * stride + ix + 1;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let normals = vertex_normals(&positions, &indices);

        Self {
            subdivisions,
            size,
            positions,
            normals,
            indices,
        }
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Per-vertex unit normals, parallel to [`positions`](Self::positions).
    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    /// Triangle list indices, three per triangle.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Positions as raw bytes for vertex buffer upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Normals as raw bytes for vertex buffer upload.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Indices as raw bytes for index buffer upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Cells per side.
    pub fn subdivisions(&self) -> u32 {
        self.subdivisions
    }

    /// Side length in world units.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Lowest and highest vertex heights.
    pub fn height_range(&self) -> (f32, f32) {
        self.positions
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[1]), hi.max(p[1]))
            })
    }
}

/// Area-weighted vertex normals: unnormalised face cross products are summed
/// per vertex, so larger triangles pull harder, then normalised.
fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [ia, ib, ic] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let a = Vec3::from(positions[ia]);
        let b = Vec3::from(positions[ib]);
        let c = Vec3::from(positions[ic]);
        let face = (b - a).cross(c - a);
        acc[ia] += face;
        acc[ib] += face;
        acc[ic] += face;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}
