//! Terrain tiles: vertex-grid meshes sampled from the noise field and the
//! lifecycle wrapper the streamer hands to presenters.
#![forbid(unsafe_code)]

use std::sync::Arc;

use strata_geom::{Aabb, Vec3};
use strata_world::{NoiseField, NormalSource, StreamConfig, TileCoord};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshVertex {
    /// Position relative to the tile origin; `y` is the absolute height.
    pub position: Vec3,
    pub normal: Vec3,
}

/// Square vertex grid centred on a tile origin.
///
/// Vertex `(i, j)` sits at local `(-size/2 + i * spacing, h, -size/2 + j * spacing)`
/// and is stored row-major along x at `j * grid_size + i`.
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    pub grid_size: usize,
    pub chunk_size: f64,
    pub vertices: Vec<MeshVertex>,
    /// Two triangles per grid cell, counter-clockwise seen from above.
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl ChunkMesh {
    /// Samples `field` at every grid vertex of the tile centred on `origin`.
    /// `grid_size` must be at least 2.
    pub fn build(
        field: &NoiseField,
        origin: (f64, f64),
        chunk_size: f64,
        grid_size: usize,
        normals: NormalSource,
    ) -> Self {
        let n = grid_size;
        let half = chunk_size * 0.5;
        let spacing = chunk_size / (n - 1) as f64;
        let (ox, oz) = origin;

        let mut vertices = Vec::with_capacity(n * n);
        for j in 0..n {
            let lz = -half + j as f64 * spacing;
            for i in 0..n {
                let lx = -half + i as f64 * spacing;
                let h = field.height(ox + lx, oz + lz);
                let normal = match normals {
                    NormalSource::Mesh => Vec3::ZERO,
                    NormalSource::Field => field.normal(ox + lx, oz + lz),
                };
                vertices.push(MeshVertex {
                    position: Vec3::new(lx, h, lz),
                    normal,
                });
            }
        }

        let indices = grid_indices(n);
        if normals == NormalSource::Mesh {
            accumulate_face_normals(&mut vertices, &indices);
        }
        let bounds = Aabb::from_points(vertices.iter().map(|v| v.position))
            .unwrap_or(Aabb::point(Vec3::ZERO));

        ChunkMesh {
            grid_size: n,
            chunk_size,
            vertices,
            indices,
            bounds,
        }
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        j * self.grid_size + i
    }

    #[inline]
    pub fn vertex(&self, i: usize, j: usize) -> &MeshVertex {
        &self.vertices[self.idx(i, j)]
    }

    #[inline]
    pub fn spacing(&self) -> f64 {
        self.chunk_size / (self.grid_size - 1) as f64
    }

    /// Local offset of grid line `i` from the tile origin, along either axis.
    #[inline]
    pub fn local_offset(&self, i: usize) -> f64 {
        -self.chunk_size * 0.5 + i as f64 * self.spacing()
    }

    #[inline]
    pub fn contains_local(&self, lx: f64, lz: f64) -> bool {
        let half = self.chunk_size * 0.5;
        (-half..=half).contains(&lx) && (-half..=half).contains(&lz)
    }

    /// Bilinear height inside the tile footprint, from the sampled grid.
    pub fn height_at_local(&self, lx: f64, lz: f64) -> Option<f64> {
        if !self.contains_local(lx, lz) {
            return None;
        }
        let half = self.chunk_size * 0.5;
        let spacing = self.spacing();
        let last = self.grid_size - 2;
        let fx = (lx + half) / spacing;
        let fz = (lz + half) / spacing;
        let i = (fx.floor() as usize).min(last);
        let j = (fz.floor() as usize).min(last);
        let tx = fx - i as f64;
        let tz = fz - j as f64;
        let h00 = self.vertex(i, j).position.y;
        let h10 = self.vertex(i + 1, j).position.y;
        let h01 = self.vertex(i, j + 1).position.y;
        let h11 = self.vertex(i + 1, j + 1).position.y;
        let near = h00 + (h10 - h00) * tx;
        let far = h01 + (h11 - h01) * tx;
        Some(near + (far - near) * tz)
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Single-precision positions in local space, for upload.
    pub fn positions_f32(&self) -> Vec<[f32; 3]> {
        self.vertices
            .iter()
            .map(|v| v.position.to_f32_array())
            .collect()
    }

    pub fn normals_f32(&self) -> Vec<[f32; 3]> {
        self.vertices
            .iter()
            .map(|v| v.normal.to_f32_array())
            .collect()
    }
}

fn grid_indices(n: usize) -> Vec<u32> {
    let cells = n - 1;
    let mut indices = Vec::with_capacity(cells * cells * 6);
    for j in 0..cells {
        for i in 0..cells {
            let a = (j * n + i) as u32;
            let b = a + 1;
            let c = a + n as u32;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    indices
}

// Unnormalized cross products weight each face by its area.
fn accumulate_face_normals(vertices: &mut [MeshVertex], indices: &[u32]) {
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let pa = vertices[a].position;
        let face = (vertices[b].position - pa).cross(vertices[c].position - pa);
        vertices[a].normal += face;
        vertices[b].normal += face;
        vertices[c].normal += face;
    }
    for v in vertices.iter_mut() {
        v.normal = v.normal.normalized();
    }
}

/// Unique per instance; a tile regenerated after eviction gets a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u64);

/// `Pending -> Presented -> Released`; no state is skipped or revisited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Pending,
    Presented,
    Released,
}

#[derive(Clone, Debug)]
pub struct Chunk {
    id: ChunkId,
    coord: TileCoord,
    origin_x: f64,
    origin_z: f64,
    mesh: Arc<ChunkMesh>,
    state: ChunkState,
}

impl Chunk {
    pub fn new(id: ChunkId, coord: TileCoord, chunk_size: f64, mesh: ChunkMesh) -> Self {
        let (origin_x, origin_z) = coord.origin(chunk_size);
        Self {
            id,
            coord,
            origin_x,
            origin_z,
            mesh: Arc::new(mesh),
            state: ChunkState::Pending,
        }
    }

    /// Builds the tile `coord` synchronously from `field`.
    pub fn generate(id: ChunkId, coord: TileCoord, field: &NoiseField, cfg: &StreamConfig) -> Self {
        let mesh = ChunkMesh::build(
            field,
            coord.origin(cfg.chunk_size),
            cfg.chunk_size,
            cfg.grid_size,
            cfg.normals,
        );
        Self::new(id, coord, cfg.chunk_size, mesh)
    }

    #[inline]
    pub fn id(&self) -> ChunkId {
        self.id
    }

    #[inline]
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    #[inline]
    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_z)
    }

    #[inline]
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// Shared handle to the geometry, for presenters that outlive the borrow.
    #[inline]
    pub fn mesh_handle(&self) -> Arc<ChunkMesh> {
        Arc::clone(&self.mesh)
    }

    #[inline]
    pub fn state(&self) -> ChunkState {
        self.state
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.state == ChunkState::Pending
    }

    #[inline]
    pub fn distance_sq_to(&self, x: f64, z: f64) -> f64 {
        let dx = self.origin_x - x;
        let dz = self.origin_z - z;
        dx * dx + dz * dz
    }

    #[inline]
    pub fn world_position(&self, v: &MeshVertex) -> Vec3 {
        Vec3::new(
            self.origin_x + v.position.x,
            v.position.y,
            self.origin_z + v.position.z,
        )
    }

    /// Interpolated mesh height at a world position inside this tile.
    pub fn height_at(&self, wx: f64, wz: f64) -> Option<f64> {
        self.mesh
            .height_at_local(wx - self.origin_x, wz - self.origin_z)
    }

    pub fn mark_presented(&mut self) {
        debug_assert_eq!(self.state, ChunkState::Pending, "chunk {:?}", self.id);
        self.state = ChunkState::Presented;
    }

    pub fn into_released(mut self) -> Chunk {
        debug_assert_ne!(self.state, ChunkState::Released, "chunk {:?}", self.id);
        self.state = ChunkState::Released;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_world::NoiseConfig;

    fn flat_field(offset: f64) -> NoiseField {
        let cfg = NoiseConfig {
            octaves: Vec::new(),
            offset,
            ..NoiseConfig::default()
        };
        NoiseField::from_config(0, &cfg).unwrap()
    }

    #[test]
    fn triangles_face_up_on_flat_ground() {
        let mesh = ChunkMesh::build(&flat_field(3.0), (0.0, 0.0), 10.0, 4, NormalSource::Mesh);
        for tri in mesh.indices.chunks_exact(3) {
            let p0 = mesh.vertices[tri[0] as usize].position;
            let p1 = mesh.vertices[tri[1] as usize].position;
            let p2 = mesh.vertices[tri[2] as usize].position;
            assert!((p1 - p0).cross(p2 - p0).y > 0.0);
        }
        for v in &mesh.vertices {
            assert_eq!(v.normal, Vec3::UP);
            assert_eq!(v.position.y, 3.0);
        }
        assert_eq!(mesh.bounds.min.y, 3.0);
        assert_eq!(mesh.bounds.max.y, 3.0);
    }

    #[test]
    fn grid_spans_the_tile_edges_exactly() {
        let mesh = ChunkMesh::build(&flat_field(0.0), (0.0, 0.0), 100.0, 21, NormalSource::Mesh);
        assert_eq!(mesh.local_offset(0), -50.0);
        assert_eq!(mesh.local_offset(20), 50.0);
        assert_eq!(mesh.vertex(20, 0).position.x, 50.0);
        assert_eq!(mesh.vertex(0, 20).position.z, 50.0);
        assert_eq!(mesh.triangle_count(), 20 * 20 * 2);
    }

    #[test]
    fn state_moves_forward() {
        let field = flat_field(0.0);
        let cfg = StreamConfig::default();
        let mut chunk = Chunk::generate(ChunkId(7), TileCoord::new(1, -2), &field, &cfg);
        assert!(chunk.is_pending());
        assert_eq!(chunk.origin(), (100.0, -200.0));
        chunk.mark_presented();
        assert_eq!(chunk.state(), ChunkState::Presented);
        let released = chunk.into_released();
        assert_eq!(released.state(), ChunkState::Released);
        assert_eq!(released.id(), ChunkId(7));
    }

    #[test]
    fn height_at_outside_footprint_is_none() {
        let field = flat_field(1.0);
        let cfg = StreamConfig::default();
        let chunk = Chunk::generate(ChunkId(0), TileCoord::new(0, 0), &field, &cfg);
        assert_eq!(chunk.height_at(0.0, 0.0), Some(1.0));
        assert_eq!(chunk.height_at(50.0, -50.0), Some(1.0));
        assert_eq!(chunk.height_at(50.5, 0.0), None);
    }
}
