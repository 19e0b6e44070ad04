//! Offline scenery baking tool.
//!
//! Reads a `scenery_bake.ron` manifest (path from the first argument, default
//! `./scenery_bake.ron`), loads the referenced world data, runs terrain
//! assembly and scenery placement over the configured tile range, and writes
//! the placements to a bincode `BakedSceneryDb` for runtime use.

use std::path::{Path, PathBuf};

use bevy::app::AppExit;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use serde::Deserialize;

use landscape::{
    BakedSceneryDb, LandscapeConfig, LandscapeError, LandscapeView, StaticMeshCache, WorldDataset,
};

const MANIFEST_VERSION: u32 = 1;

// -----------------------------------------------------------------------------
// Manifest types
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct BakeManifest {
    version: u32,
    /// World dataset (RON), relative to the manifest.
    world_path: PathBuf,
    /// Output database (bincode), relative to the manifest.
    output_path: PathBuf,
    landscape: LandscapeConfig,
}

// -----------------------------------------------------------------------------
// Bake state
// -----------------------------------------------------------------------------

#[derive(Resource)]
struct BakeConfig {
    manifest_path: PathBuf,
}

struct BakeSummary {
    output_path: PathBuf,
    bytes: usize,
    tiles: usize,
    placements: usize,
    models: usize,
}

fn main() {
    let manifest_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("scenery_bake.ron"));

    let mut app = App::new();

    // Headless: no window, no renderer, only the schedule runner and logging.
    app.add_plugins((MinimalPlugins, LogPlugin::default()));
    app.insert_resource(BakeConfig { manifest_path });
    app.add_systems(Startup, run_bake);

    app.run();
}

fn run_bake(config: Res<BakeConfig>, mut app_exit: MessageWriter<AppExit>) {
    info!("Baking scenery from manifest {:?}", config.manifest_path);

    match bake(&config.manifest_path) {
        Ok(summary) => {
            info!(
                "Wrote baked scenery to {:?} ({} bytes, {} tiles, {} placements, {} models)",
                summary.output_path,
                summary.bytes,
                summary.tiles,
                summary.placements,
                summary.models
            );
            app_exit.write(AppExit::Success);
        }
        Err(err) => {
            error!("Scenery bake failed: {err}");
            app_exit.write(AppExit::error());
        }
    }
}

fn bake(manifest_path: &Path) -> Result<BakeSummary, LandscapeError> {
    let manifest = load_manifest(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let world = WorldDataset::load(base_dir.join(&manifest.world_path))?;
    let cache = StaticMeshCache::new(&world);

    let view = LandscapeView::load(&world, &cache, &manifest.landscape)?;
    let expected = view.range.tiles().count();
    if view.landblocks.len() < expected {
        warn!(
            "{} of {} tiles were skipped; see warnings above",
            expected - view.landblocks.len(),
            expected
        );
    }

    let db = BakedSceneryDb::from_view(&view);
    let output_path = base_dir.join(&manifest.output_path);
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = db.save(&output_path)?;

    Ok(BakeSummary {
        output_path,
        bytes,
        tiles: db.tiles.len(),
        placements: db.placement_count(),
        models: cache.len(),
    })
}

fn load_manifest(path: &Path) -> Result<BakeManifest, LandscapeError> {
    let text = std::fs::read_to_string(path)?;
    let manifest: BakeManifest = ron::from_str(&text)?;
    if manifest.version != MANIFEST_VERSION {
        return Err(LandscapeError::UnsupportedVersion {
            found: manifest.version,
            expected: MANIFEST_VERSION,
        });
    }
    Ok(manifest)
}
