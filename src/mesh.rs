//! Fixed-topology tile mesh.
//!
//! Every tile is rendered (and collided against) as an 11×11 vertex grid at
//! integer local coordinates. The triangulation splits each 2×2-unit block
//! into eight triangles and never changes after creation; refreshing a tile
//! only rewrites vertex heights and normals.

use crate::direction::TileCoord;

/// Vertices per row/column.
pub const GRID_RESOLUTION: usize = 11;
pub const VERTEX_COUNT: usize = GRID_RESOLUTION * GRID_RESOLUTION;
pub const TRIANGLE_COUNT: usize = 200;

/// 2×2-unit blocks per row/column.
const BLOCKS: usize = 5;
const INDICES_PER_BLOCK: usize = 24;

#[derive(Clone, Debug, PartialEq)]
pub struct TileMesh {
    vertices: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    triangles: Vec<u32>,
}

impl TileMesh {
    /// Level mesh at height zero with the full triangulation and UVs.
    pub fn flat() -> Self {
        let mut vertices = vec![[0.0f32; 3]; VERTEX_COUNT];
        let mut uvs = vec![[0.0f32; 2]; VERTEX_COUNT];
        for i in -5..=5 {
            for j in -5..=5 {
                let idx = Self::vertex_index(i, j);
                vertices[idx] = [i as f32, 0.0, j as f32];
                uvs[idx] = [(i + 5) as f32 / 10.0, (j + 5) as f32 / 10.0];
            }
        }

        let mut mesh = Self {
            vertices,
            normals: vec![[0.0, 1.0, 0.0]; VERTEX_COUNT],
            uvs,
            triangles: build_triangles(),
        };
        mesh.recalculate_normals();
        mesh
    }

    /// Index of the vertex at local integer position `(i, j)`, `i` along x and
    /// `j` along z, both in `[-5, 5]`.
    #[inline]
    pub fn vertex_index(i: i32, j: i32) -> usize {
        ((i + 5) * GRID_RESOLUTION as i32 + (j + 5)) as usize
    }

    /// Resample every vertex height from `elevation(x, z)` and rebuild normals.
    pub fn refresh<F>(&mut self, elevation: F)
    where
        F: Fn(f32, f32) -> f32,
    {
        for i in -5..=5 {
            for j in -5..=5 {
                let (x, z) = (i as f32, j as f32);
                self.vertices[Self::vertex_index(i, j)] = [x, elevation(x, z), z];
            }
        }
        self.recalculate_normals();
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    /// Vertex positions translated to world space for the tile at `coord`.
    pub fn world_vertices(&self, coord: TileCoord) -> impl Iterator<Item = [f32; 3]> + '_ {
        let [ox, oy, oz] = coord.world_offset();
        self.vertices.iter().map(move |v| [v[0] + ox, v[1] + oy, v[2] + oz])
    }

    /// Area-weighted vertex normals.
    fn recalculate_normals(&mut self) {
        let mut accum = vec![[0.0f32; 3]; self.vertices.len()];

        for tri in self.triangles.chunks_exact(3) {
            let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let a = self.vertices[ia];
            let b = self.vertices[ib];
            let c = self.vertices[ic];
            let n = cross(sub(b, a), sub(c, a));
            for idx in [ia, ib, ic] {
                accum[idx][0] += n[0];
                accum[idx][1] += n[1];
                accum[idx][2] += n[2];
            }
        }

        for (normal, sum) in self.normals.iter_mut().zip(accum) {
            let len = (sum[0] * sum[0] + sum[1] * sum[1] + sum[2] * sum[2]).sqrt();
            *normal = if len > 1e-6 {
                [sum[0] / len, sum[1] / len, sum[2] / len]
            } else {
                [0.0, 1.0, 0.0]
            };
        }
    }
}

impl Default for TileMesh {
    fn default() -> Self {
        Self::flat()
    }
}

/// Eight triangles per 2×2 block, 25 blocks.
fn build_triangles() -> Vec<u32> {
    let mut triangles = vec![0u32; BLOCKS * BLOCKS * INDICES_PER_BLOCK];
    for i in 0..BLOCKS {
        for j in 0..BLOCKS {
            let location = (i * BLOCKS + j) * INDICES_PER_BLOCK;
            let v = (i * 22 + j * 2) as u32;
            let block: [u32; INDICES_PER_BLOCK] = [
                v, v + 1, v + 11,
                v + 1, v + 12, v + 11,
                v + 11, v + 12, v + 23,
                v + 11, v + 23, v + 22,
                v + 1, v + 2, v + 13,
                v + 1, v + 13, v + 12,
                v + 12, v + 13, v + 23,
                v + 13, v + 24, v + 23,
            ];
            triangles[location..location + INDICES_PER_BLOCK].copy_from_slice(&block);
        }
    }
    triangles
}

#[inline]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
