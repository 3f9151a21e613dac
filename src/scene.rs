use hashbrown::HashMap;
use strata_chunk::{Chunk, ChunkId};
use strata_runtime::Presenter;
use strata_world::TileCoord;

#[derive(Clone, Copy, Debug, Default)]
pub struct SceneStats {
    pub presented: u64,
    pub released: u64,
    pub vertices_uploaded: u64,
    pub triangles_uploaded: u64,
    /// Release calls for chunks this scene never presented.
    pub unknown_releases: u64,
}

/// Headless stand-in for a renderer: tracks which tiles would be on screen.
#[derive(Default)]
pub struct HeadlessScene {
    live: HashMap<ChunkId, TileCoord>,
    pub stats: SceneStats,
}

impl HeadlessScene {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: ChunkId) -> bool {
        self.live.contains_key(&id)
    }
}

impl Presenter for HeadlessScene {
    fn present(&mut self, chunk: &Chunk) {
        let mesh = chunk.mesh();
        // A real backend would upload `positions_f32` / `normals_f32` here.
        self.stats.vertices_uploaded += mesh.vertices.len() as u64;
        self.stats.triangles_uploaded += mesh.triangle_count() as u64;
        self.stats.presented += 1;
        if self.live.insert(chunk.id(), chunk.coord()).is_some() {
            log::warn!(target: "scene", "chunk {:?} presented twice", chunk.id());
        }
    }

    fn release(&mut self, chunk: Chunk) {
        self.stats.released += 1;
        if self.live.remove(&chunk.id()).is_none() {
            self.stats.unknown_releases += 1;
            log::warn!(target: "scene", "release of unknown chunk {:?} at {:?}", chunk.id(), chunk.coord());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_runtime::ChunkStreamer;
    use strata_world::{NoiseField, StreamConfig};

    #[test]
    fn scene_mirrors_the_streamer() {
        let mut streamer =
            ChunkStreamer::new(Arc::new(NoiseField::new(-100)), StreamConfig::default()).unwrap();
        let mut scene = HeadlessScene::default();
        streamer.update(0.0, 0.0).apply(&mut scene);
        assert_eq!(scene.live_count(), 21);
        assert_eq!(scene.stats.vertices_uploaded, 21 * 21 * 21);
        streamer.update(5_000.0, 0.0).apply(&mut scene);
        assert_eq!(scene.live_count(), 21);
        assert_eq!(scene.stats.released, 21);
        assert_eq!(scene.stats.unknown_releases, 0);
        assert!(streamer.resident().all(|c| scene.is_live(c.id())));
    }
}
