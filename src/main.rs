mod scene;
mod walker;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use strata_runtime::{ChunkStreamer, Presenter};
use strata_world::TerrainConfig;
use strata_world::worldgen::load_config_from_path;

use crate::scene::HeadlessScene;
use crate::walker::{PathKind, Walker};

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Streams procedural terrain around a scripted walker")]
struct Args {
    /// TOML file with `seed`, `[noise]` and `[streaming]` sections.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the seed from the config file.
    #[arg(long, allow_hyphen_values = true)]
    seed: Option<i32>,
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    #[arg(long, value_enum, default_value_t = PathKind::Line)]
    path: PathKind,
    /// Walking speed in world units per second.
    #[arg(long, default_value_t = 40.0)]
    speed: f64,
    /// Filter for env_logger, e.g. `info` or `stream=trace`. Falls back to RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

const TICK_SECONDS: f64 = 1.0 / 60.0;
const CAMERA_BEHIND: f64 = 5.0;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = &args.log_level {
        logger.parse_filters(filter);
    }
    logger.init();

    let mut cfg = match &args.config {
        Some(path) => {
            log::info!("loading terrain config from {}", path.display());
            load_config_from_path(path)?
        }
        None => TerrainConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    cfg.validate()?;
    log::info!(
        "seed={} octaves={} chunk_size={} grid={} load={} unload={} normals={:?}",
        cfg.seed,
        cfg.noise.octaves.len(),
        cfg.streaming.chunk_size,
        cfg.streaming.grid_size,
        cfg.streaming.load_radius,
        cfg.streaming.unload_radius,
        cfg.streaming.normals
    );

    let mut streamer = ChunkStreamer::from_config(&cfg)?;
    let field = streamer.field().clone();
    let mut scene = HeadlessScene::default();
    let mut walker = Walker::new(0.0, 0.0, args.speed, args.path);
    walker.settle(&field);

    for tick in 0..args.ticks {
        let teleported = walker.advance(tick, TICK_SECONDS);
        walker.settle(&field);
        if teleported {
            log::info!(target: "events", "[tick {}] teleport to ({:.1}, {:.1})", tick, walker.pos.x, walker.pos.z);
        }
        let changes = streamer.update(walker.pos.x, walker.pos.z);
        if !changes.is_empty() {
            log::info!(
                target: "events",
                "[tick {}] pos=({:.1}, {:.1}, {:.1}) slope={:.1}deg cam_y={:.1} +{} -{} resident={}",
                tick,
                walker.pos.x,
                walker.pos.y,
                walker.pos.z,
                walker.slope_degrees(),
                walker.chase_camera_height(&field, CAMERA_BEHIND),
                changes.ready.len(),
                changes.released.len(),
                streamer.len()
            );
        }
        changes.apply(&mut scene);
        if scene.live_count() != streamer.len() {
            return Err(format!(
                "tick {tick}: scene shows {} chunks but {} are resident",
                scene.live_count(),
                streamer.len()
            )
            .into());
        }
    }

    for chunk in streamer.clear() {
        scene.release(chunk);
    }
    let st = streamer.stats();
    log::info!(
        "done: ticks={} admitted={} evicted={} last_tick={}us presented={} released={} vertices={} triangles={}",
        st.ticks,
        st.admitted,
        st.evicted,
        st.last_tick_us,
        scene.stats.presented,
        scene.stats.released,
        scene.stats.vertices_uploaded,
        scene.stats.triangles_uploaded
    );
    if scene.live_count() != 0 || scene.stats.unknown_releases != 0 {
        return Err(format!(
            "unbalanced scene: {} still live, {} unknown releases",
            scene.live_count(),
            scene.stats.unknown_releases
        )
        .into());
    }
    Ok(())
}
