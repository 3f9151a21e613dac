//! Tile streaming around a moving observer.
#![forbid(unsafe_code)]

mod scan;

use std::sync::Arc;
use std::time::Instant;

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use strata_chunk::{Chunk, ChunkId, ChunkMesh, ChunkState};
use strata_world::{ConfigError, NoiseField, StreamConfig, TerrainConfig, TileCoord};

/// Receives the output of a tick. Implemented by whatever owns the scene.
pub trait Presenter {
    fn present(&mut self, chunk: &Chunk);
    fn release(&mut self, chunk: Chunk);
}

/// Work produced by one [`ChunkStreamer::update`].
#[derive(Debug, Default)]
pub struct ChunkChanges {
    /// New chunks in admission order, still marked `Pending`.
    pub ready: Vec<Chunk>,
    /// Evicted chunks in residency order, marked `Released`.
    pub released: Vec<Chunk>,
}

impl ChunkChanges {
    pub fn is_empty(&self) -> bool {
        self.ready.is_empty() && self.released.is_empty()
    }

    /// Releases first, then presents.
    pub fn apply<P: Presenter + ?Sized>(self, presenter: &mut P) {
        for chunk in self.released {
            presenter.release(chunk);
        }
        for chunk in &self.ready {
            presenter.present(chunk);
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamerStats {
    pub ticks: u64,
    pub admitted: u64,
    pub evicted: u64,
    pub resident: usize,
    pub last_tick_us: u64,
}

pub struct ChunkStreamer {
    field: Arc<NoiseField>,
    cfg: StreamConfig,
    steps: Vec<(f64, f64)>,
    entries: HashMap<TileCoord, Chunk>,
    order: Vec<TileCoord>,
    next_id: u64,
    ticks: u64,
    admitted: u64,
    evicted: u64,
    last_tick_us: u64,
}

impl ChunkStreamer {
    pub fn new(field: Arc<NoiseField>, cfg: StreamConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let steps = scan::admission_steps(cfg.chunk_size, cfg.load_radius);
        let reach = scan::max_reach(&steps) + cfg.rounding_slack();
        if reach >= cfg.unload_radius {
            log::warn!(
                target: "stream",
                "admitted tiles can land {:.1} from the observer, beyond unload radius {:.1}; tiles near the edge will reload every tick",
                reach,
                cfg.unload_radius
            );
        }
        Ok(Self {
            field,
            cfg,
            steps,
            entries: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
            ticks: 0,
            admitted: 0,
            evicted: 0,
            last_tick_us: 0,
        })
    }

    pub fn from_config(cfg: &TerrainConfig) -> Result<Self, ConfigError> {
        let field = NoiseField::from_config(cfg.seed, &cfg.noise)?;
        Self::new(Arc::new(field), cfg.streaming.clone())
    }

    #[inline]
    pub fn field(&self) -> &Arc<NoiseField> {
        &self.field
    }

    #[inline]
    pub fn config(&self) -> &StreamConfig {
        &self.cfg
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.entries.contains_key(&coord)
    }

    #[inline]
    pub fn get(&self, coord: TileCoord) -> Option<&Chunk> {
        self.entries.get(&coord)
    }

    /// Resident chunks in insertion order.
    pub fn resident(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.order.iter().filter_map(|c| self.entries.get(c))
    }

    #[inline]
    pub fn tile_coord_of(&self, x: f64, z: f64) -> TileCoord {
        TileCoord::containing(x, z, self.cfg.chunk_size)
    }

    pub fn stats(&self) -> StreamerStats {
        StreamerStats {
            ticks: self.ticks,
            admitted: self.admitted,
            evicted: self.evicted,
            resident: self.order.len(),
            last_tick_us: self.last_tick_us,
        }
    }

    /// Evicts tiles beyond the unload radius, then admits every tile the
    /// scan around `(x, z)` reaches that is not already resident.
    pub fn update(&mut self, x: f64, z: f64) -> ChunkChanges {
        let t0 = Instant::now();
        self.ticks += 1;

        let released = self.evict_beyond(x, z);

        let mut queued: Vec<TileCoord> = Vec::new();
        let mut seen: HashSet<TileCoord> = HashSet::new();
        for &(dx, dz) in &self.steps {
            for (px, pz) in scan::reflections(x, z, dx, dz) {
                let coord = self.tile_coord_of(px, pz);
                if !self.entries.contains_key(&coord) && seen.insert(coord) {
                    queued.push(coord);
                }
            }
        }

        let mut ready: Vec<Chunk> = self
            .order
            .iter()
            .filter_map(|c| self.entries.get(c))
            .filter(|c| c.is_pending())
            .cloned()
            .collect();
        for chunk in &ready {
            self.mark_presented(chunk.coord());
        }

        let meshes = self.build_meshes(&queued);
        for (coord, mesh) in queued.into_iter().zip(meshes) {
            let chunk = self.insert_new(coord, mesh);
            ready.push(chunk.clone());
            self.mark_presented(coord);
        }

        self.last_tick_us = t0.elapsed().as_micros().min(u128::from(u64::MAX)) as u64;
        if !ready.is_empty() || !released.is_empty() {
            log::debug!(
                target: "stream",
                "[tick {}] observer=({:.1}, {:.1}) ready={} released={} resident={} in {}us",
                self.ticks,
                x,
                z,
                ready.len(),
                released.len(),
                self.order.len(),
                self.last_tick_us
            );
        }
        ChunkChanges { ready, released }
    }

    /// Admits the tile covering `(x, z)` now. Returns `None` if it was
    /// already resident. The new chunk is reported by the next `update`.
    pub fn ensure_loaded(&mut self, x: f64, z: f64) -> Option<&Chunk> {
        let coord = self.tile_coord_of(x, z);
        if self.entries.contains_key(&coord) {
            return None;
        }
        let mesh = self.build_mesh(coord);
        Some(self.insert_new(coord, mesh))
    }

    /// Drops every resident chunk, returning those already presented.
    pub fn clear(&mut self) -> Vec<Chunk> {
        let mut released = Vec::with_capacity(self.order.len());
        for coord in std::mem::take(&mut self.order) {
            if let Some(chunk) = self.entries.remove(&coord) {
                self.retire(chunk, &mut released);
            }
        }
        self.entries.clear();
        log::debug!(target: "stream", "cleared, released {}", released.len());
        released
    }

    fn evict_beyond(&mut self, x: f64, z: f64) -> Vec<Chunk> {
        let limit_sq = self.cfg.unload_radius_sq();
        let far: Vec<TileCoord> = self
            .order
            .iter()
            .copied()
            .filter(|c| {
                self.entries
                    .get(c)
                    .is_some_and(|chunk| chunk.distance_sq_to(x, z) > limit_sq)
            })
            .collect();
        if far.is_empty() {
            return Vec::new();
        }
        let mut released = Vec::with_capacity(far.len());
        for coord in &far {
            if let Some(chunk) = self.entries.remove(coord) {
                self.retire(chunk, &mut released);
            }
        }
        let entries = &self.entries;
        self.order.retain(|c| entries.contains_key(c));
        released
    }

    // Pending chunks were never handed out, so they have nothing to release.
    fn retire(&mut self, chunk: Chunk, released: &mut Vec<Chunk>) {
        self.evicted += 1;
        match chunk.state() {
            ChunkState::Presented => {
                log::trace!(target: "stream", "release {:?} {:?}", chunk.coord(), chunk.id());
                released.push(chunk.into_released());
            }
            ChunkState::Pending => {
                log::trace!(target: "stream", "drop unpresented {:?} {:?}", chunk.coord(), chunk.id());
            }
            ChunkState::Released => {}
        }
    }

    fn build_mesh(&self, coord: TileCoord) -> ChunkMesh {
        ChunkMesh::build(
            &self.field,
            coord.origin(self.cfg.chunk_size),
            self.cfg.chunk_size,
            self.cfg.grid_size,
            self.cfg.normals,
        )
    }

    fn build_meshes(&self, coords: &[TileCoord]) -> Vec<ChunkMesh> {
        if self.cfg.parallel_meshing && coords.len() > 1 {
            coords.par_iter().map(|&c| self.build_mesh(c)).collect()
        } else {
            coords.iter().map(|&c| self.build_mesh(c)).collect()
        }
    }

    fn insert_new(&mut self, coord: TileCoord, mesh: ChunkMesh) -> &Chunk {
        assert!(
            !self.entries.contains_key(&coord),
            "tile {coord:?} admitted while already resident"
        );
        let id = ChunkId(self.next_id);
        self.next_id += 1;
        self.admitted += 1;
        log::trace!(target: "stream", "admit {:?} {:?}", coord, id);
        self.order.push(coord);
        self.entries
            .entry(coord)
            .or_insert(Chunk::new(id, coord, self.cfg.chunk_size, mesh))
    }

    fn mark_presented(&mut self, coord: TileCoord) {
        if let Some(chunk) = self.entries.get_mut(&coord) {
            chunk.mark_presented();
        }
    }
}
